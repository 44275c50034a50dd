//! Pitch Generator — serializes both records into the coaching prompt and asks
//! the chat model for a paragraph. The returned text is opaque.

use thiserror::Error;
use tracing::info;

use crate::extraction::embedded_json::ExtractedRecord;
use crate::llm_client::prompts::CAREER_COACH_SYSTEM;
use crate::llm_client::{ChatCompletion, LlmError};
use crate::pitch::prompts::pitch_prompt;

/// Generated cover-letter paragraph.
pub type PitchText = String;

#[derive(Debug, Error)]
pub enum PitchError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Failed to serialize record for prompt: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Builds the prompt embedding both records verbatim as compact JSON.
pub fn build_pitch_prompt(
    profile: &ExtractedRecord,
    job: &ExtractedRecord,
) -> Result<String, serde_json::Error> {
    let profile_json = serde_json::to_string(profile)?;
    let job_json = serde_json::to_string(job)?;

    Ok(pitch_prompt(&profile_json, &job_json))
}

/// One chat call, no retry beyond what the client's policy allows, no
/// token budgeting.
pub async fn generate_pitch(
    chat: &dyn ChatCompletion,
    profile: &ExtractedRecord,
    job: &ExtractedRecord,
) -> Result<PitchText, PitchError> {
    let prompt = build_pitch_prompt(profile, job)?;
    info!("Requesting pitch ({} prompt chars)", prompt.len());

    Ok(chat.complete(CAREER_COACH_SYSTEM, &prompt).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    struct RecordingChat {
        reply: Result<String, u16>,
        calls: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl ChatCompletion for RecordingChat {
        async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
            self.calls
                .lock()
                .unwrap()
                .push((system.to_string(), prompt.to_string()));
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(status) => Err(LlmError::Api {
                    status: *status,
                    message: "model overloaded".to_string(),
                }),
            }
        }
    }

    fn record(value: Value) -> ExtractedRecord {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("fixture must be an object"),
        }
    }

    #[test]
    fn test_prompt_embeds_both_records_verbatim() {
        let profile = record(json!({"Summary": "Data engineer", "Skills": ["Python"]}));
        let job = record(json!({"Job Title": "Engineer", "Required Skills": ["Python"]}));

        let prompt = build_pitch_prompt(&profile, &job).unwrap();

        assert!(prompt.contains(r#"{"Summary":"Data engineer","Skills":["Python"]}"#));
        assert!(prompt.contains(r#"{"Job Title":"Engineer","Required Skills":["Python"]}"#));
        assert!(prompt.contains("one-paragraph personalized pitch"));
    }

    #[test]
    fn test_placeholder_text_inside_records_is_left_alone() {
        let profile = record(json!({"Summary": "literal {job_json} token"}));
        let job = record(json!({"Job Title": "Engineer", "Note": "see {profile_json}"}));

        let prompt = build_pitch_prompt(&profile, &job).unwrap();

        assert!(prompt.contains(r#"{"Summary":"literal {job_json} token"}"#));
        assert!(prompt.contains(r#"{"Job Title":"Engineer","Note":"see {profile_json}"}"#));
        assert_eq!(prompt.matches("Engineer").count(), 1);
    }

    #[tokio::test]
    async fn test_generate_pitch_returns_model_text_unchanged() {
        let chat = RecordingChat {
            reply: Ok("  I would love to bring my Python skills...  ".to_string()),
            calls: Mutex::new(Vec::new()),
        };
        let profile = record(json!({"Skills": ["Python"]}));
        let job = record(json!({"Job Title": "Engineer"}));

        let pitch = generate_pitch(&chat, &profile, &job).await.unwrap();

        assert_eq!(pitch, "  I would love to bring my Python skills...  ");
        let calls = chat.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "You are a helpful career coach.");
    }

    #[tokio::test]
    async fn test_generate_pitch_propagates_llm_error() {
        let chat = RecordingChat {
            reply: Err(503),
            calls: Mutex::new(Vec::new()),
        };
        let empty = ExtractedRecord::new();

        let err = generate_pitch(&chat, &empty, &empty).await.unwrap_err();
        assert!(matches!(err, PitchError::Llm(LlmError::Api { status: 503, .. })));
        assert_eq!(chat.calls.lock().unwrap().len(), 1);
    }
}
