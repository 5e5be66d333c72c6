//! Unwrapping of double-encoded JSON fields carried in the host envelope.
//!
//! The host hands bound values over as JSON text inside a JSON string, so a
//! field has to be decoded once to reach the text and once more to reach the
//! payload. Every step here treats a failed decode as an absent value.

use serde_json::{Map, Value};

pub const SEMANTIC_SEARCH_INPUT: &str = "SemanticSearchInput";
pub const RESPONSE_FIELD: &str = "Response";
pub const TITLE_FIELD: &str = "title";

/// Decodes `raw` as a single JSON string literal.
pub fn decode_json_string(raw: &str) -> Option<String> {
    serde_json::from_str::<String>(raw).ok()
}

/// Pulls `Response` out of the semantic search result bound under
/// `SemanticSearchInput`. Returns an empty string when any layer is missing.
pub fn extract_response(data: &Map<String, Value>) -> String {
    let raw = data
        .get(SEMANTIC_SEARCH_INPUT)
        .and_then(Value::as_str)
        .unwrap_or_default();
    let inner = decode_json_string(raw).unwrap_or_default();
    serde_json::from_str::<Map<String, Value>>(&inner)
        .ok()
        .and_then(|obj| obj.get(RESPONSE_FIELD)?.as_str().map(str::to_owned))
        .unwrap_or_default()
}

/// Resolves the document title from ingest metadata.
///
/// The title normally arrives JSON-encoded (`"\"Doc A\""`). When it does not
/// decode to a non-empty string the raw value is used as is.
pub fn extract_title(metadata: &Map<String, Value>) -> String {
    let Some(raw) = metadata.get(TITLE_FIELD).and_then(Value::as_str) else {
        return String::new();
    };
    match decode_json_string(raw) {
        Some(title) if !title.is_empty() => title,
        _ => raw.to_string(),
    }
}
