// src/standardize/envelope.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome of a standardized call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Success => "success",
            Status::Error => "error",
        }
    }
}

/// How the raw payload was classified before parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectedFormat {
    Json,
    Markdown,
    Text,
    Mixed,
}

/// Output shape requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    Json,
    #[default]
    Markdown,
}

impl ResponseFormat {
    /// Lenient parse used for tool arguments and env settings.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "json" => Some(ResponseFormat::Json),
            "markdown" | "md" | "text" => Some(ResponseFormat::Markdown),
            _ => None,
        }
    }
}

/// A payload handed over by a tool: either already-decoded JSON or a text body.
#[derive(Debug, Clone, PartialEq)]
pub enum RawPayload {
    Structured(Value),
    Text(String),
}

impl RawPayload {
    /// Decode a response body, keeping it as text when it is not JSON.
    pub fn from_body(body: String) -> Self {
        match serde_json::from_str::<Value>(&body) {
            Ok(value) => RawPayload::Structured(value),
            Err(_) => RawPayload::Text(body),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            RawPayload::Text(text) => Some(text),
            RawPayload::Structured(_) => None,
        }
    }

    /// Serialized form used for sizing and error excerpts.
    pub fn to_display_string(&self) -> String {
        match self {
            RawPayload::Text(text) => text.clone(),
            RawPayload::Structured(value) => value.to_string(),
        }
    }
}

impl From<String> for RawPayload {
    fn from(text: String) -> Self {
        RawPayload::Text(text)
    }
}

impl From<&str> for RawPayload {
    fn from(text: &str) -> Self {
        RawPayload::Text(text.to_string())
    }
}

impl From<Value> for RawPayload {
    fn from(value: Value) -> Self {
        RawPayload::Structured(value)
    }
}

/// Per-section token counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TokenBreakdown {
    pub data: usize,
    pub metadata: usize,
    pub status: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub execution_time_ms: f64,
    pub result_size_bytes: usize,
    pub is_truncated: bool,
    pub original_count: Option<usize>,
    pub result_count: Option<usize>,
    pub token_estimate: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_breakdown: Option<TokenBreakdown>,
    pub format: DetectedFormat,
    pub endpoint: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// The standardized response returned for every tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub status: Status,
    pub data: Option<Value>,
    pub metadata: Metadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Envelope {
    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}

/// Envelope plus the text rendered for the requested format.
#[derive(Debug, Clone)]
pub struct Standardized {
    pub envelope: Envelope,
    pub format: ResponseFormat,
    pub text: String,
}
