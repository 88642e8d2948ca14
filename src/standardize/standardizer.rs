// src/standardize/standardizer.rs

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Instant;

use serde_json::{Map, Value};
use tracing::{debug, error, warn};

use super::detect::{detect, extract_embedded_json, extract_fenced_json};
use super::envelope::{
    DetectedFormat, Envelope, ErrorInfo, RawPayload, ResponseFormat, Standardized, Status,
};
use super::error::{excerpt, StandardizeError};
use super::limiter::{limit_value, LimitInfo};
use super::metadata::{
    should_truncate, MetadataComputer, MetadataInput, TokenEstimator, TokenUsageTier,
};
use super::parsers::{parse_section, select_kind, SectionKind};
use super::render::{render_data, render_error, truncation_note};
use crate::config::ResponseConfig;

/// One payload handed to the standardizer.
#[derive(Debug, Clone)]
pub struct StandardizeRequest {
    pub endpoint: String,
    pub payload: RawPayload,
    pub status_code: u16,
    pub format: Option<ResponseFormat>,
    pub model: Option<String>,
    pub limit: Option<i64>,
    pub category: Option<String>,
    pub started_at: Instant,
}

impl StandardizeRequest {
    pub fn new(endpoint: impl Into<String>, payload: impl Into<RawPayload>, status_code: u16) -> Self {
        StandardizeRequest {
            endpoint: endpoint.into(),
            payload: payload.into(),
            status_code,
            format: None,
            model: None,
            limit: None,
            category: None,
            started_at: Instant::now(),
        }
    }

    pub fn format(mut self, format: Option<ResponseFormat>) -> Self {
        self.format = format;
        self
    }

    pub fn model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }

    pub fn limit(mut self, limit: Option<i64>) -> Self {
        self.limit = limit;
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn started_at(mut self, started_at: Instant) -> Self {
        self.started_at = started_at;
        self
    }
}

/// Wraps tool payloads into [`Envelope`]s. Stateless; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct ResponseStandardizer {
    config: ResponseConfig,
    metadata: MetadataComputer,
}

impl ResponseStandardizer {
    pub fn new(config: ResponseConfig) -> Self {
        let estimator = TokenEstimator::new(&config.token_profiles, &config.default_model);
        let metadata = MetadataComputer::new(estimator, config.include_token_breakdown);
        ResponseStandardizer { config, metadata }
    }

    pub fn config(&self) -> &ResponseConfig {
        &self.config
    }

    pub fn estimator(&self) -> &TokenEstimator {
        self.metadata.estimator()
    }

    /// Never fails: every outcome, panics included, becomes an envelope.
    pub fn standardize(&self, request: StandardizeRequest) -> Standardized {
        self.guarded(request, |request| self.run(request))
    }

    fn guarded<F>(&self, request: StandardizeRequest, run: F) -> Standardized
    where
        F: FnOnce(&StandardizeRequest) -> Standardized,
    {
        match catch_unwind(AssertUnwindSafe(|| run(&request))) {
            Ok(standardized) => standardized,
            Err(panic) => {
                let reason = panic_message(panic.as_ref());
                error!(endpoint = %request.endpoint, "standardizer panicked: {}", reason);
                self.error_response(
                    &request,
                    StandardizeError::Internal(reason),
                    DetectedFormat::Text,
                )
            }
        }
    }

    fn run(&self, request: &StandardizeRequest) -> Standardized {
        let detected = detect(&request.payload);

        if request.status_code >= 400 {
            let err = StandardizeError::Upstream {
                code: request.status_code,
                message: self.upstream_message(&request.payload, request.status_code),
            };
            debug!(endpoint = %request.endpoint, code = request.status_code, "upstream error payload");
            return self.error_response(request, err, detected);
        }

        debug!(endpoint = %request.endpoint, format = ?detected, "detected payload format");
        match self.structure(request, detected) {
            Ok((data, kind)) => self.success_response(request, data, kind, detected),
            Err(err) => {
                warn!(endpoint = %request.endpoint, "could not structure payload: {}", err);
                self.error_response(request, err, detected)
            }
        }
    }

    fn structure(
        &self,
        request: &StandardizeRequest,
        detected: DetectedFormat,
    ) -> Result<(Value, Option<SectionKind>), StandardizeError> {
        let text = match &request.payload {
            RawPayload::Structured(value) => return Ok((value.clone(), None)),
            RawPayload::Text(text) => text,
        };
        let excerpt_chars = self.config.error_excerpt_chars;

        match detected {
            DetectedFormat::Json => Ok((serde_json::from_str(text)?, None)),
            DetectedFormat::Markdown | DetectedFormat::Text => {
                let kind = select_kind(Some(&request.endpoint), text);
                let data = parse_section(kind, text, detected == DetectedFormat::Markdown, excerpt_chars)?;
                Ok((data, Some(kind)))
            }
            DetectedFormat::Mixed => {
                let kind = select_kind(Some(&request.endpoint), text);
                let parsed = parse_section(kind, text, true, excerpt_chars)?;
                if kind != SectionKind::Generic {
                    // Section fields win; inline JSON is field content, fenced JSON sits beside them.
                    let mut data = parsed;
                    if let (Value::Object(map), Some(fenced)) = (&mut data, extract_fenced_json(text)) {
                        map.insert("embedded".to_string(), fenced);
                    }
                    return Ok((data, Some(kind)));
                }
                let mut merged = match parsed {
                    Value::Object(map) => map,
                    other => {
                        let mut map = Map::new();
                        map.insert("items".to_string(), other);
                        map
                    }
                };
                match extract_embedded_json(text) {
                    Some(Value::Object(embedded)) => merged.extend(embedded),
                    Some(embedded) => {
                        merged.insert("items".to_string(), embedded);
                    }
                    None => {}
                }
                Ok((Value::Object(merged), None))
            }
        }
    }

    fn success_response(
        &self,
        request: &StandardizeRequest,
        data: Value,
        kind: Option<SectionKind>,
        detected: DetectedFormat,
    ) -> Standardized {
        let category = request
            .category
            .clone()
            .unwrap_or_else(|| ResponseConfig::category_for(&request.endpoint).to_string());
        let max_items = self.config.resolve_limit(request.limit, &category);
        let (data, limit) = limit_value(data, max_items);
        if limit.is_truncated {
            debug!(
                endpoint = %request.endpoint,
                category = %category,
                "truncated {:?} items to {:?}",
                limit.original_count,
                limit.result_count
            );
        }

        let serialized = data.to_string();
        let metadata = self.metadata.compute(MetadataInput {
            sized_payload: &serialized,
            status: Status::Success,
            limit,
            format: detected,
            endpoint: &request.endpoint,
            started_at: request.started_at,
            model: request.model.as_deref(),
        });

        let model = request
            .model
            .clone()
            .unwrap_or_else(|| self.config.default_model.clone());
        let message = (self.config.max_token_estimate > 0
            && should_truncate(metadata.token_estimate, self.config.max_token_estimate, &model))
        .then(|| {
            format!(
                "Large response: about {} tokens ({} usage). Pass a smaller limit to reduce it.",
                metadata.token_estimate,
                TokenUsageTier::from_count(metadata.token_estimate).as_str()
            )
        });

        let envelope = Envelope {
            status: Status::Success,
            data: Some(data),
            metadata,
            error: None,
            message,
        };
        let format = request.format.unwrap_or(self.config.default_format);
        let text = match format {
            ResponseFormat::Json => pretty(&envelope),
            ResponseFormat::Markdown => markdown_for(request, &envelope, kind, &limit),
        };

        Standardized {
            envelope,
            format,
            text,
        }
    }

    fn error_response(
        &self,
        request: &StandardizeRequest,
        err: StandardizeError,
        detected: DetectedFormat,
    ) -> Standardized {
        let sized = request.payload.to_display_string();
        let metadata = self.metadata.compute(MetadataInput {
            sized_payload: &sized,
            status: Status::Error,
            limit: LimitInfo::default(),
            format: detected,
            endpoint: &request.endpoint,
            started_at: request.started_at,
            model: request.model.as_deref(),
        });

        let envelope = Envelope {
            status: Status::Error,
            data: None,
            metadata,
            error: Some(ErrorInfo {
                code: err.code(),
                message: err.public_message(),
                details: Some(err.details()),
            }),
            message: None,
        };
        let format = request.format.unwrap_or(self.config.default_format);
        let text = match (format, &envelope.error) {
            (ResponseFormat::Markdown, Some(info)) => render_error(info),
            _ => pretty(&envelope),
        };

        Standardized {
            envelope,
            format,
            text,
        }
    }

    /// Pull a readable message out of an upstream error body.
    fn upstream_message(&self, payload: &RawPayload, code: u16) -> String {
        let message = match payload {
            RawPayload::Structured(Value::Object(map)) => ["message", "detail", "reason", "error"]
                .iter()
                .find_map(|key| match map.get(*key) {
                    Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
                    Some(Value::Object(inner)) => inner
                        .get("message")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                    _ => None,
                })
                .unwrap_or_else(|| Value::Object(map.clone()).to_string()),
            RawPayload::Structured(Value::Null) => String::new(),
            RawPayload::Structured(other) => other.to_string(),
            RawPayload::Text(text) => text.trim().to_string(),
        };

        if message.is_empty() {
            format!("Upstream request failed with status {}", code)
        } else {
            excerpt(&message, self.config.error_excerpt_chars)
        }
    }
}

fn markdown_for(
    request: &StandardizeRequest,
    envelope: &Envelope,
    kind: Option<SectionKind>,
    limit: &LimitInfo,
) -> String {
    let data = envelope.data.as_ref().unwrap_or(&Value::Null);
    let mut text = match (&request.payload, limit.is_truncated) {
        (RawPayload::Text(original), false) if envelope.metadata.format != DetectedFormat::Json => {
            original.clone()
        }
        _ => render_data(kind, &request.endpoint, data),
    };
    if let (true, Some(shown), Some(total)) =
        (limit.is_truncated, limit.result_count, limit.original_count)
    {
        text.push_str(&truncation_note(shown, total));
    }
    if let Some(message) = &envelope.message {
        text.push_str(&format!("\n> {}\n", message));
    }
    text
}

fn pretty(envelope: &Envelope) -> String {
    serde_json::to_string_pretty(envelope)
        .unwrap_or_else(|e| format!("{{\"status\":\"error\",\"error\":{{\"code\":500,\"message\":\"{}\"}}}}", e))
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
