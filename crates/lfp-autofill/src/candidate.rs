//! Candidate extraction.
//!
//! Completion services are loose about response framing. Accepted forms:
//!
//! - a JSON object: used as is;
//! - `{"output": <object or string>}`: the inner value is unwrapped;
//! - a JSON string holding an object, optionally wrapped in a Markdown
//!   code fence (```` ```json ... ``` ````).
//!
//! Everything else is a [`TransportError::MalformedResponse`]. Whether the
//! object's keys make sense for the form is the engine's call, not ours.

use lfp_core::TransportError;
use serde_json::Value;

/// Reduce a response body to a candidate JSON object.
pub fn extract_candidate(body: Value) -> Result<Value, TransportError> {
    match body {
        Value::Object(mut map) => {
            if map.len() == 1 && matches!(map.get("output"), Some(Value::Object(_) | Value::String(_))) {
                match map.remove("output") {
                    Some(inner) => extract_candidate(inner),
                    None => Err(malformed("missing output")),
                }
            } else {
                Ok(Value::Object(map))
            }
        }
        Value::String(text) => {
            let parsed: Value = serde_json::from_str(strip_fence(&text))
                .map_err(|e| malformed(&format!("embedded text is not JSON: {e}")))?;
            if parsed.is_object() {
                Ok(parsed)
            } else {
                Err(malformed(&format!("embedded JSON is {}", kind(&parsed))))
            }
        }
        other => Err(malformed(&format!("response is {}", kind(&other)))),
    }
}

fn strip_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an optional language tag on the opening line.
    let body = match rest.find('\n') {
        Some(i) => &rest[i + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn malformed(reason: &str) -> TransportError {
    TransportError::MalformedResponse(reason.to_string())
}
