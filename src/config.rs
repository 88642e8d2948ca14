// src/config.rs

use std::collections::HashMap;
use std::env;
use std::sync::Arc;

use anyhow::{Context, Result};
use secrecy::SecretString;

use crate::standardize::envelope::ResponseFormat;

/// Default per-category result limits.
pub const DEFAULT_LIMITS: &[(&str, i64)] = &[
    ("blocks", 10),
    ("transactions", 20),
    ("box", 50),
    ("tokens", 20),
    ("token_holders", 100),
    ("collections", 10),
    ("address_transactions", 20),
    ("address_tokens", 50),
    ("search_results", 15),
    ("analytics", 25),
    ("default", 50),
];

/// Characters per token for the model families we size responses for.
pub const DEFAULT_TOKEN_PROFILES: &[(&str, f64)] = &[
    ("claude", 3.5),
    ("gpt-3.5", 4.0),
    ("gpt-4", 4.0),
    ("gpt-4o", 4.0),
    ("llama", 3.8),
    ("mistral", 3.8),
    ("gemini", 4.0),
    ("palm", 4.0),
];

/// Tool name -> limit category. Tools not listed use `default`.
pub const ENDPOINT_CATEGORIES: &[(&str, &str)] = &[
    ("get_address_transactions", "address_transactions"),
    ("get_box", "box"),
    ("search_tokens", "tokens"),
    ("get_token_holders", "token_holders"),
    ("get_latest_blocks", "blocks"),
    ("get_mempool", "transactions"),
    ("get_rich_list", "analytics"),
    ("get_address_rank", "analytics"),
];

pub const DEFAULT_CATEGORY: &str = "default";

/// Settings of the response standardizer.
#[derive(Clone, Debug)]
pub struct ResponseConfig {
    pub default_format: ResponseFormat,
    pub default_model: String,
    pub token_profiles: HashMap<String, f64>,
    pub limits: HashMap<String, i64>,
    /// Cap on the raw text quoted back in parse errors.
    pub error_excerpt_chars: usize,
    /// Token estimate above which a warning is attached to the envelope.
    pub max_token_estimate: usize,
    pub include_token_breakdown: bool,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        ResponseConfig {
            default_format: ResponseFormat::Markdown,
            default_model: "claude".to_string(),
            token_profiles: DEFAULT_TOKEN_PROFILES
                .iter()
                .map(|(name, ratio)| (name.to_string(), *ratio))
                .collect(),
            limits: DEFAULT_LIMITS
                .iter()
                .map(|(category, limit)| (category.to_string(), *limit))
                .collect(),
            error_excerpt_chars: 200,
            max_token_estimate: 4000,
            include_token_breakdown: true,
        }
    }
}

impl ResponseConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from env-style keys supplied by `lookup`; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ResponseConfig::default();

        if let Some(format) = lookup("RESPONSE_FORMAT") {
            config.default_format = ResponseFormat::parse(&format)
                .with_context(|| format!("RESPONSE_FORMAT must be json or markdown, got '{}'", format))?;
        }
        if let Some(model) = lookup("TOKEN_MODEL") {
            config.default_model = model.trim().to_ascii_lowercase();
        }
        if let Some(profiles) = lookup("TOKEN_PROFILES") {
            let overrides: HashMap<String, f64> = serde_json::from_str(&profiles)
                .context("TOKEN_PROFILES must be a JSON map of model -> chars per token")?;
            config
                .token_profiles
                .extend(overrides.into_iter().map(|(k, v)| (k.to_ascii_lowercase(), v)));
        }

        for (category, _) in DEFAULT_LIMITS {
            let key = format!("LIMIT_{}", category.to_ascii_uppercase());
            if let Some(raw) = lookup(&key) {
                let limit = raw
                    .trim()
                    .parse::<i64>()
                    .with_context(|| format!("{} must be an integer", key))?;
                config.limits.insert(category.to_string(), limit);
            }
        }

        if let Some(raw) = lookup("ERROR_EXCERPT_CHARS") {
            config.error_excerpt_chars = raw
                .trim()
                .parse()
                .context("ERROR_EXCERPT_CHARS must be a valid number")?;
        }
        if let Some(raw) = lookup("MAX_TOKEN_ESTIMATE") {
            config.max_token_estimate = raw
                .trim()
                .parse()
                .context("MAX_TOKEN_ESTIMATE must be a valid number")?;
        }
        if let Some(raw) = lookup("TOKEN_BREAKDOWN") {
            config.include_token_breakdown = parse_flag(&raw)
                .with_context(|| format!("TOKEN_BREAKDOWN must be true or false, got '{}'", raw))?;
        }

        Ok(config)
    }

    /// Configured limit of a category, falling back to the `default` category.
    pub fn limit_for(&self, category: &str) -> i64 {
        self.limits
            .get(category)
            .or_else(|| self.limits.get(DEFAULT_CATEGORY))
            .copied()
            .unwrap_or(0)
    }

    /// Explicit per-call limit > category default > global default.
    pub fn resolve_limit(&self, explicit: Option<i64>, category: &str) -> i64 {
        explicit.unwrap_or_else(|| self.limit_for(category))
    }

    pub fn category_for(endpoint: &str) -> &'static str {
        ENDPOINT_CATEGORIES
            .iter()
            .find(|(name, _)| *name == endpoint)
            .map(|(_, category)| *category)
            .unwrap_or(DEFAULT_CATEGORY)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

// A struct to hold all configuration, loaded once at startup from the .env file.
#[derive(Clone, Debug)]
pub struct Config {
    // Server settings
    pub port: u16,

    // Upstream APIs
    pub explorer_api_url: String,
    pub node_api_url: String,
    pub node_api_key: Option<Arc<SecretString>>,
    pub ergowatch_api_url: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,

    // Token holder paging
    pub holders_page_size: usize,
    pub holders_max_pages: usize,

    pub response: ResponseConfig,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        // Load variables from the .env file into the environment
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Ok(Config {
            port: text("PORT", "3001")
                .parse()
                .context("PORT must be a valid number")?,

            explorer_api_url: trim_base(text(
                "ERGO_EXPLORER_API",
                "https://api.ergoplatform.com/api/v1",
            )),
            node_api_url: trim_base(text("ERGO_NODE_API", "http://localhost:9053")),
            node_api_key: lookup("ERGO_NODE_API_KEY")
                .filter(|key| !key.trim().is_empty())
                .map(|key| Arc::new(SecretString::new(key))),
            ergowatch_api_url: trim_base(text("ERGOWATCH_API_URL", "https://api.ergo.watch")),
            user_agent: text("USER_AGENT", "ErgoMCPServer/1.0"),
            request_timeout_secs: text("REQUEST_TIMEOUT_SECS", "30")
                .parse()
                .context("REQUEST_TIMEOUT_SECS must be a valid number")?,

            holders_page_size: text("HOLDERS_PAGE_SIZE", "100")
                .parse()
                .context("HOLDERS_PAGE_SIZE must be a valid number")?,
            holders_max_pages: text("HOLDERS_MAX_PAGES", "50")
                .parse()
                .context("HOLDERS_MAX_PAGES must be a valid number")?,

            response: ResponseConfig::from_lookup(&lookup)?,
        })
    }
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
