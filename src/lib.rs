// src/lib.rs

use std::sync::Arc;

use anyhow::{Context, Result};

pub mod api;
pub mod blockchain;
pub mod config;
pub mod mcp;
pub mod standardize;
pub mod utils;

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: config::Config,
    /// HTTP client for the explorer, node and ErgoWatch APIs
    pub client: blockchain::client::ErgoClient,
    /// Wraps every tool result into the standard envelope
    pub standardizer: Arc<standardize::ResponseStandardizer>,
}

impl AppState {
    pub fn new(config: config::Config) -> Result<Self> {
        let client = blockchain::client::ErgoClient::new(&config)
            .context("Failed to initialize Ergo API client")?;
        let standardizer = Arc::new(standardize::ResponseStandardizer::new(
            config.response.clone(),
        ));
        Ok(AppState {
            config,
            client,
            standardizer,
        })
    }
}
