// src/standardize/metadata.rs

use std::collections::HashMap;
use std::time::Instant;

use serde::Serialize;
use serde_json::{json, Value};

use super::envelope::{DetectedFormat, Metadata, Status, TokenBreakdown};
use super::limiter::LimitInfo;

/// Ratio used for unknown models and invalid profile entries.
pub const FALLBACK_CHARS_PER_TOKEN: f64 = 4.0;

/// Character-ratio token estimator keyed by model family.
#[derive(Debug, Clone)]
pub struct TokenEstimator {
    /// Sorted longest name first so prefix matching prefers the most specific profile.
    profiles: Vec<(String, f64)>,
    default_model: String,
}

impl TokenEstimator {
    pub fn new(profiles: &HashMap<String, f64>, default_model: &str) -> Self {
        let mut profiles: Vec<(String, f64)> = profiles
            .iter()
            .map(|(name, ratio)| (name.to_ascii_lowercase(), *ratio))
            .collect();
        profiles.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));
        TokenEstimator {
            profiles,
            default_model: default_model.to_ascii_lowercase(),
        }
    }

    /// Exact match, then longest prefix, then the fallback ratio.
    pub fn chars_per_token(&self, model: Option<&str>) -> f64 {
        let model = model
            .map(|m| m.trim().to_ascii_lowercase())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| self.default_model.clone());

        let ratio = self
            .profiles
            .iter()
            .find(|(name, _)| *name == model)
            .or_else(|| self.profiles.iter().find(|(name, _)| model.starts_with(name.as_str())))
            .map(|(_, ratio)| *ratio)
            .unwrap_or(FALLBACK_CHARS_PER_TOKEN);

        if ratio.is_finite() && ratio > 0.0 {
            ratio
        } else {
            FALLBACK_CHARS_PER_TOKEN
        }
    }

    pub fn estimate_text(&self, text: &str, model: Option<&str>) -> usize {
        if text.is_empty() {
            return 0;
        }
        let chars = text.chars().count() as f64;
        (chars / self.chars_per_token(model)).ceil() as usize
    }

    pub fn estimate_json(&self, value: &Value, model: Option<&str>) -> usize {
        match value {
            Value::Null => 0,
            other => self.estimate_text(&other.to_string(), model),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenUsageTier {
    Minimal,
    Standard,
    Intensive,
    Excessive,
}

impl TokenUsageTier {
    pub fn from_count(tokens: usize) -> Self {
        match tokens {
            0..=499 => TokenUsageTier::Minimal,
            500..=1999 => TokenUsageTier::Standard,
            2000..=4999 => TokenUsageTier::Intensive,
            _ => TokenUsageTier::Excessive,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenUsageTier::Minimal => "minimal",
            TokenUsageTier::Standard => "standard",
            TokenUsageTier::Intensive => "intensive",
            TokenUsageTier::Excessive => "excessive",
        }
    }
}

/// Whether `tokens` exceeds `threshold` after the per-family adjustment
/// (smaller context for gpt-3 models, larger for gpt-4).
pub fn should_truncate(tokens: usize, threshold: usize, model: &str) -> bool {
    let model = model.to_ascii_lowercase();
    let factor = if model.starts_with("gpt-3") {
        0.8
    } else if model.starts_with("gpt-4") {
        1.2
    } else {
        1.0
    };
    tokens as f64 > threshold as f64 * factor
}

/// Everything the metadata of one envelope is computed from.
#[derive(Debug, Clone)]
pub struct MetadataInput<'a> {
    /// Serialized `data`, or the raw upstream payload on error.
    pub sized_payload: &'a str,
    pub status: Status,
    pub limit: LimitInfo,
    pub format: DetectedFormat,
    pub endpoint: &'a str,
    pub started_at: Instant,
    pub model: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct MetadataComputer {
    estimator: TokenEstimator,
    include_breakdown: bool,
}

impl MetadataComputer {
    pub fn new(estimator: TokenEstimator, include_breakdown: bool) -> Self {
        MetadataComputer {
            estimator,
            include_breakdown,
        }
    }

    pub fn estimator(&self) -> &TokenEstimator {
        &self.estimator
    }

    pub fn compute(&self, input: MetadataInput<'_>) -> Metadata {
        let elapsed_ms = input.started_at.elapsed().as_secs_f64() * 1000.0;
        let execution_time_ms = ((elapsed_ms.max(0.0)) * 100.0).round() / 100.0;
        let result_size_bytes = input.sized_payload.len();

        // only fields that are stable across repeated calls are priced
        let stable = json!({
            "result_size_bytes": result_size_bytes,
            "is_truncated": input.limit.is_truncated,
            "original_count": input.limit.original_count,
            "result_count": input.limit.result_count,
            "format": input.format,
            "endpoint": input.endpoint,
        });
        let breakdown = TokenBreakdown {
            data: self.estimator.estimate_text(input.sized_payload, input.model),
            metadata: self.estimator.estimate_json(&stable, input.model),
            status: self
                .estimator
                .estimate_json(&json!({ "status": input.status.as_str() }), input.model),
        };

        Metadata {
            execution_time_ms,
            result_size_bytes,
            is_truncated: input.limit.is_truncated,
            original_count: input.limit.original_count,
            result_count: input.limit.result_count,
            token_estimate: breakdown.data + breakdown.metadata + breakdown.status,
            token_breakdown: self.include_breakdown.then_some(breakdown),
            format: input.format,
            endpoint: input.endpoint.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResponseConfig;

    fn estimator() -> TokenEstimator {
        let config = ResponseConfig::default();
        TokenEstimator::new(&config.token_profiles, &config.default_model)
    }

    fn input<'a>(payload: &'a str, limit: LimitInfo) -> MetadataInput<'a> {
        MetadataInput {
            sized_payload: payload,
            status: Status::Success,
            limit,
            format: DetectedFormat::Json,
            endpoint: "get_latest_blocks",
            started_at: Instant::now(),
            model: None,
        }
    }

    #[test]
    fn test_profile_lookup() {
        let est = estimator();
        assert_eq!(est.chars_per_token(Some("claude")), 3.5);
        assert_eq!(est.chars_per_token(Some("Claude-3-Opus")), 3.5);
        assert_eq!(est.chars_per_token(Some("gpt-4o-mini")), 4.0);
        assert_eq!(est.chars_per_token(Some("llama-3-70b")), 3.8);
        assert_eq!(est.chars_per_token(Some("unknown-model")), FALLBACK_CHARS_PER_TOKEN);
        // no hint uses the configured default model
        assert_eq!(est.chars_per_token(None), 3.5);
    }

    #[test]
    fn test_invalid_ratio_falls_back() {
        let mut profiles = HashMap::new();
        profiles.insert("broken".to_string(), 0.0);
        profiles.insert("nan".to_string(), f64::NAN);
        let est = TokenEstimator::new(&profiles, "broken");
        assert_eq!(est.chars_per_token(None), FALLBACK_CHARS_PER_TOKEN);
        assert_eq!(est.chars_per_token(Some("nan")), FALLBACK_CHARS_PER_TOKEN);
    }

    #[test]
    fn test_estimate_text() {
        let est = estimator();
        assert_eq!(est.estimate_text("", Some("claude")), 0);
        // 7 chars / 3.5 = 2
        assert_eq!(est.estimate_text("abcdefg", Some("claude")), 2);
        // 9 chars / 4.0 rounds up to 3
        assert_eq!(est.estimate_text("abcdefghi", Some("gpt-4")), 3);
        // characters, not bytes
        assert_eq!(est.estimate_text("••••", Some("gpt-4")), 1);
    }

    #[test]
    fn test_usage_tiers_and_truncation_hint() {
        assert_eq!(TokenUsageTier::from_count(499), TokenUsageTier::Minimal);
        assert_eq!(TokenUsageTier::from_count(500), TokenUsageTier::Standard);
        assert_eq!(TokenUsageTier::from_count(4999), TokenUsageTier::Intensive);
        assert_eq!(TokenUsageTier::from_count(5000), TokenUsageTier::Excessive);

        assert!(should_truncate(3500, 4000, "gpt-3.5-turbo"));
        assert!(!should_truncate(4500, 4000, "gpt-4"));
        assert!(should_truncate(4001, 4000, "claude"));
    }

    #[test]
    fn test_compute_is_reproducible() {
        let computer = MetadataComputer::new(estimator(), true);
        let limit = LimitInfo {
            is_truncated: true,
            original_count: Some(250),
            result_count: Some(100),
        };
        let first = computer.compute(input("[1,2,3]", limit));
        let second = computer.compute(input("[1,2,3]", limit));

        assert_eq!(first.result_size_bytes, 7);
        assert_eq!(first.token_estimate, second.token_estimate);
        assert_eq!(first.token_breakdown, second.token_breakdown);
        assert!(first.execution_time_ms >= 0.0);
        let breakdown = first.token_breakdown.unwrap();
        assert_eq!(
            first.token_estimate,
            breakdown.data + breakdown.metadata + breakdown.status
        );
    }

    #[test]
    fn test_breakdown_can_be_disabled() {
        let computer = MetadataComputer::new(estimator(), false);
        let meta = computer.compute(input("{}", LimitInfo::default()));
        assert!(meta.token_breakdown.is_none());
        assert!(meta.token_estimate > 0);
    }
}
