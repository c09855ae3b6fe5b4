//! Recovers an embedded JSON object from free-form model output.

use serde_json::Value;
use tracing::debug;

/// The outcome of scanning a reply for a structured payload.
///
/// Absence of a payload is a normal result, not an error: most replies to
/// general questions are plain conversation.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Payload(Value),
    NoPayload,
}

impl Extraction {
    pub fn into_payload(self) -> Option<Value> {
        match self {
            Extraction::Payload(value) => Some(value),
            Extraction::NoPayload => None,
        }
    }
}

/// Returns the slice from the first `{` through the last `}`, inclusive.
///
/// Several independent fragments in one reply are not told apart: the span
/// covers all of them.
pub fn payload_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(&text[start..=end])
}

/// Parses the candidate span of `text` as JSON.
pub fn extract_payload(text: &str) -> Extraction {
    let Some(span) = payload_span(text) else {
        return Extraction::NoPayload;
    };
    match serde_json::from_str::<Value>(span) {
        Ok(value) => Extraction::Payload(value),
        Err(e) => {
            debug!(error = %e, "Candidate payload is not valid JSON");
            Extraction::NoPayload
        }
    }
}
