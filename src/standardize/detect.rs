// src/standardize/detect.rs

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use super::envelope::{DetectedFormat, RawPayload};

lazy_static! {
    static ref HEADER_RE: Regex = Regex::new(r"(?m)^#{1,6}\s+\S").unwrap();
    static ref BULLET_RE: Regex = Regex::new(r"(?m)^\s*[-*•]\s+\S").unwrap();
    static ref TABLE_RE: Regex = Regex::new(r"(?m)^\|.+\|.+\|\s*$").unwrap();
    static ref FENCED_JSON_RE: Regex = Regex::new(r"(?s)```json\s*\n(.+?)\n\s*```").unwrap();
}

/// Upper bound on inline `{` / `[` candidates tried per payload.
const MAX_INLINE_CANDIDATES: usize = 64;

/// Classify a raw payload. Never fails; anything unrecognised is `Text`.
pub fn detect(raw: &RawPayload) -> DetectedFormat {
    let text = match raw {
        RawPayload::Structured(_) => return DetectedFormat::Json,
        RawPayload::Text(text) => text,
    };

    if serde_json::from_str::<Value>(text).is_ok() {
        return DetectedFormat::Json;
    }

    if has_markdown_signals(text) {
        if extract_embedded_json(text).is_some() {
            DetectedFormat::Mixed
        } else {
            DetectedFormat::Markdown
        }
    } else {
        DetectedFormat::Text
    }
}

pub fn has_markdown_signals(text: &str) -> bool {
    HEADER_RE.is_match(text)
        || BULLET_RE.is_match(text)
        || TABLE_RE.is_match(text)
        || text.contains("```")
}

/// Find the first JSON object or array embedded in a text body.
///
/// Fenced ```json blocks win; otherwise each inline `{` or `[` is tried as the
/// start of a JSON document and the first non-empty container is returned.
pub fn extract_embedded_json(text: &str) -> Option<Value> {
    if let Some(value) = extract_fenced_json(text) {
        return Some(value);
    }

    text.char_indices()
        .filter(|(_, c)| *c == '{' || *c == '[')
        .take(MAX_INLINE_CANDIDATES)
        .find_map(|(idx, _)| {
            let mut stream = serde_json::Deserializer::from_str(&text[idx..]).into_iter::<Value>();
            match stream.next() {
                Some(Ok(value)) if is_non_empty_container(&value) => Some(value),
                _ => None,
            }
        })
}

/// First ```json fenced block that parses.
pub fn extract_fenced_json(text: &str) -> Option<Value> {
    FENCED_JSON_RE
        .captures_iter(text)
        .find_map(|caps| serde_json::from_str::<Value>(caps[1].trim()).ok())
}

fn is_non_empty_container(value: &Value) -> bool {
    match value {
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_structured_payload_is_json() {
        let raw = RawPayload::Structured(json!({"height": 1}));
        assert_eq!(detect(&raw), DetectedFormat::Json);
    }

    #[test]
    fn test_json_string_is_json() {
        let raw = RawPayload::from("[{\"id\": \"abc\"}]");
        assert_eq!(detect(&raw), DetectedFormat::Json);
    }

    #[test]
    fn test_balance_text_is_markdown() {
        let raw = RawPayload::from("Balance for 9f...:\n• 5.000000000 ERG\n\nNo tokens found.");
        assert_eq!(detect(&raw), DetectedFormat::Markdown);
    }

    #[test]
    fn test_markdown_with_json_block_is_mixed() {
        let raw = RawPayload::from("## Pools\n- best pool\n```json\n{\"poolId\": \"p1\"}\n```\n");
        assert_eq!(detect(&raw), DetectedFormat::Mixed);

        let inline = RawPayload::from("# Summary\nraw: {\"items\": [1, 2]} trailing words");
        assert_eq!(detect(&inline), DetectedFormat::Mixed);
    }

    #[test]
    fn test_malformed_json_degrades_to_text() {
        let raw = RawPayload::from("{\"address\": \"9f\", \"balance\": 5");
        assert_eq!(detect(&raw), DetectedFormat::Text);
    }

    #[test]
    fn test_plain_sentence_is_text() {
        let raw = RawPayload::from("Ergo Network Status:\nHeight: 1000");
        assert_eq!(detect(&raw), DetectedFormat::Text);
    }

    #[test]
    fn test_extract_skips_empty_containers() {
        let text = "list [] then {} then {\"a\": 1}";
        assert_eq!(extract_embedded_json(text), Some(json!({"a": 1})));
        assert_eq!(extract_embedded_json("nothing here"), None);
    }
}
