//! Outbound call policy shared by the extraction and chat clients.
//!
//! Every remote call carries an explicit timeout and an explicit retry policy.
//! The default policy is a single attempt.

use std::time::Duration;

use reqwest::StatusCode;

/// Timeout + retry settings for one remote collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct CallPolicy {
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Never below 1.
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

impl RetryPolicy {
    /// One attempt, no retry.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::from_millis(1000),
        }
    }

    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::none()
        }
    }

    /// Exponential backoff before `attempt` (0-based): 0, base, 2*base, 4*base...
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        self.base_delay
            .saturating_mul(1u32.checked_shl(attempt - 1).unwrap_or(u32::MAX))
    }

    pub fn has_attempts_after(&self, attempt: u32) -> bool {
        attempt + 1 < self.max_attempts
    }

    /// Rate limiting and server errors are worth another attempt; other
    /// statuses are final.
    pub fn is_retryable_status(status: StatusCode) -> bool {
        status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
    }

    /// Waits out the backoff for `attempt`, logging why.
    pub async fn backoff(&self, attempt: u32, target: &str) {
        let delay = self.delay_before(attempt);
        if delay.is_zero() {
            return;
        }
        tracing::warn!(
            "{} call attempt {} failed, retrying after {}ms...",
            target,
            attempt,
            delay.as_millis()
        );
        tokio::time::sleep(delay).await;
    }
}
