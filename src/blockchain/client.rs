//! HTTP client for the upstream Ergo APIs.
//!
//! One `reqwest::Client` is shared by every tool call; it talks to the public
//! Explorer API, the full node API and the ErgoWatch analytics API.

use std::sync::Arc;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info};
use url::Url;

use crate::config::Config;
use crate::standardize::RawPayload;

/// Status used when no upstream response could be obtained at all.
pub const TRANSPORT_FAILURE_STATUS: u16 = 502;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
    #[error("invalid upstream URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upstream {
    Explorer,
    Node,
    ErgoWatch,
}

/// Status code plus body of one upstream call.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub payload: RawPayload,
}

impl UpstreamResponse {
    pub fn new(status: u16, payload: impl Into<RawPayload>) -> Self {
        UpstreamResponse {
            status,
            payload: payload.into(),
        }
    }

    pub fn transport_failure(message: impl Into<String>) -> Self {
        UpstreamResponse::new(TRANSPORT_FAILURE_STATUS, message.into())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json(&self) -> Option<&Value> {
        match &self.payload {
            RawPayload::Structured(value) => Some(value),
            RawPayload::Text(_) => None,
        }
    }
}

#[derive(Clone)]
pub struct ErgoClient {
    http: reqwest::Client,
    explorer_url: String,
    node_url: String,
    ergowatch_url: String,
    node_api_key: Option<Arc<SecretString>>,
}

impl ErgoClient {
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(ClientError::Build)?;

        Ok(ErgoClient {
            http,
            explorer_url: config.explorer_api_url.clone(),
            node_url: config.node_api_url.clone(),
            ergowatch_url: config.ergowatch_api_url.clone(),
            node_api_key: config.node_api_key.clone(),
        })
    }

    fn base(&self, upstream: Upstream) -> &str {
        match upstream {
            Upstream::Explorer => &self.explorer_url,
            Upstream::Node => &self.node_url,
            Upstream::ErgoWatch => &self.ergowatch_url,
        }
    }

    pub fn url(
        &self,
        upstream: Upstream,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Url, ClientError> {
        let raw = format!("{}/{}", self.base(upstream), path.trim_start_matches('/'));
        let mut url = Url::parse(&raw).map_err(|source| ClientError::InvalidUrl {
            url: raw.clone(),
            source,
        })?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    /// GET a resource. Non-2xx answers are returned, not raised; only
    /// transport failures are errors.
    pub async fn get(
        &self,
        upstream: Upstream,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<UpstreamResponse, ClientError> {
        let url = self.url(upstream, path, query)?;
        info!("GET {:?} {}", upstream, url);

        let mut request = self.http.get(url.clone());
        if upstream == Upstream::Node {
            if let Some(key) = &self.node_api_key {
                request = request.header("api_key", key.expose_secret().as_str());
            }
        }

        let response = request.send().await.map_err(|source| {
            error!("request to {} failed: {}", url, source);
            ClientError::Transport {
                url: url.to_string(),
                source,
            }
        })?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|source| ClientError::Transport {
                url: url.to_string(),
                source,
            })?;
        debug!("{} answered {} ({} bytes)", url, status, body.len());

        Ok(UpstreamResponse::new(status, RawPayload::from_body(body)))
    }
}
