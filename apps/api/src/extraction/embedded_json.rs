//! Locates and decodes a JSON object embedded in the free-text `content`
//! field of an extraction response.

use std::str::FromStr;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

/// A decoded JSON object. Field names and shape are whatever the upstream
/// extraction produced.
pub type ExtractedRecord = Map<String, Value>;

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("no JSON object found in content")]
    NoObject,

    #[error("embedded JSON is not a valid object")]
    InvalidJson,
}

#[derive(Debug, Error)]
#[error("unknown JSON scan mode '{0}' (expected 'first_to_last' or 'first_complete')")]
pub struct UnknownScanMode(String);

/// How the embedded object is located inside the content text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScanMode {
    /// Slice from the first `{` to the last `}` inclusive. Spans across
    /// several objects when the text contains more than one.
    #[default]
    FirstToLast,
    /// First syntactically complete, brace-balanced object.
    FirstComplete,
}

impl FromStr for ScanMode {
    type Err = UnknownScanMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first_to_last" => Ok(ScanMode::FirstToLast),
            "first_complete" => Ok(ScanMode::FirstComplete),
            other => Err(UnknownScanMode(other.to_string())),
        }
    }
}

/// Reads `raw["content"]` (empty when absent or not a string) and decodes the
/// object found there.
pub fn extract_embedded_json(raw: &Value, mode: ScanMode) -> Result<ExtractedRecord, ParseError> {
    let content = raw.get("content").and_then(Value::as_str).unwrap_or("");
    decode_object(content, mode)
}

/// Locates an object in `text` per `mode` and decodes it.
pub fn decode_object(text: &str, mode: ScanMode) -> Result<ExtractedRecord, ParseError> {
    let slice = match mode {
        ScanMode::FirstToLast => first_to_last(text),
        ScanMode::FirstComplete => first_complete(text),
    }
    .ok_or(ParseError::NoObject)?;

    serde_json::from_str::<ExtractedRecord>(slice).map_err(|e| {
        debug!("embedded JSON decode failed: {e}");
        ParseError::InvalidJson
    })
}

fn first_to_last(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Single forward pass keeping a stack of open braces. Braces inside string
/// literals are skipped once an object is open. When a top-level group closes
/// (or input ends) its balanced spans are tried in start order, so an outer
/// object wins over its children and a broken outer falls back to them.
fn first_complete(text: &str) -> Option<&str> {
    let mut open: Vec<usize> = Vec::new();
    let mut closed: Vec<(usize, usize)> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (i, b) in text.bytes().enumerate() {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' if !open.is_empty() => in_string = true,
            b'{' => open.push(i),
            b'}' => {
                let Some(start) = open.pop() else {
                    continue;
                };
                closed.push((start, i));
                if open.is_empty() {
                    if let Some(found) = first_decodable(text, &mut closed) {
                        return Some(found);
                    }
                }
            }
            _ => {}
        }
    }

    first_decodable(text, &mut closed)
}

/// Tries `spans` by ascending start and clears them. Each span is decoded at
/// most once.
fn first_decodable<'a>(text: &'a str, spans: &mut Vec<(usize, usize)>) -> Option<&'a str> {
    spans.sort_unstable_by_key(|&(start, _)| start);
    let found = spans
        .iter()
        .map(|&(start, end)| &text[start..=end])
        .find(|candidate| serde_json::from_str::<Value>(candidate).is_ok());
    spans.clear();
    found
}
