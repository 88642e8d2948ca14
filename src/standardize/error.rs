// src/standardize/error.rs

use serde_json::{json, Value};
use thiserror::Error;

/// Generic code used when a failure has no upstream status attached.
pub const INTERNAL_ERROR_CODE: u16 = 500;
/// Code reported when content was recognised but could not be structured.
pub const PARSE_ERROR_CODE: u16 = 422;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StandardizeError {
    #[error("upstream returned {code}: {message}")]
    Upstream { code: u16, message: String },
    #[error("failed to parse {parser} content: {excerpt}")]
    Parse { parser: &'static str, excerpt: String },
    #[error("internal error: {0}")]
    Internal(String),
}

impl StandardizeError {
    pub fn parse(parser: &'static str, text: &str, max_chars: usize) -> Self {
        StandardizeError::Parse {
            parser,
            excerpt: excerpt(text, max_chars),
        }
    }

    pub fn code(&self) -> u16 {
        match self {
            StandardizeError::Upstream { code, .. } => *code,
            StandardizeError::Parse { .. } => PARSE_ERROR_CODE,
            StandardizeError::Internal(_) => INTERNAL_ERROR_CODE,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            StandardizeError::Upstream { .. } => "upstream_error",
            StandardizeError::Parse { .. } => "parse_error",
            StandardizeError::Internal(_) => "internal_error",
        }
    }

    /// Message surfaced in `error.message`.
    pub fn public_message(&self) -> String {
        match self {
            StandardizeError::Upstream { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn details(&self) -> Value {
        match self {
            StandardizeError::Upstream { .. } => json!({ "kind": self.kind() }),
            StandardizeError::Parse { parser, excerpt } => json!({
                "kind": self.kind(),
                "parser": parser,
                "excerpt": excerpt,
            }),
            StandardizeError::Internal(_) => json!({ "kind": self.kind() }),
        }
    }
}

impl From<serde_json::Error> for StandardizeError {
    fn from(err: serde_json::Error) -> Self {
        StandardizeError::Internal(err.to_string())
    }
}

/// Cut `text` to at most `max_chars` characters, marking the cut with an ellipsis.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_is_char_safe() {
        let text = "• ünïcödé bullets everywhere";
        let cut = excerpt(text, 5);
        assert_eq!(cut, "• ünï...");
        assert_eq!(excerpt("short", 10), "short");
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(StandardizeError::parse("box", "junk", 10).code(), 422);
        assert_eq!(StandardizeError::Internal("boom".into()).code(), 500);
        let upstream = StandardizeError::Upstream {
            code: 404,
            message: "Not found".into(),
        };
        assert_eq!(upstream.code(), 404);
        assert_eq!(upstream.public_message(), "Not found");
    }
}
