//! # API Module
//!
//! HTTP handlers for the Ergo MCP server. Every resource route runs the same
//! tool as the MCP surface and answers with its standardized envelope.
//!
//! ## Available Endpoints
//!
//! - `GET /health` - Liveness check
//! - `POST /rpc` - JSON-RPC (MCP) over HTTP
//! - `GET /address/:address/balance` - Address balance
//! - `GET /transaction/:tx_id` - Transaction details
//! - `GET /box/:box_id` - Box details
//! - `GET /token/:token_id/holders` - Token holder distribution
//! - `GET /tokens/search?query=` - Token search
//! - `GET /network` - Network status
//!
//! Resource routes accept `format`, `limit` and `model` query parameters.

pub mod address;
pub mod boxes;
pub mod health;
pub mod network;
pub mod rpc;
pub mod token;
pub mod transaction;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    mcp::{handler::call_tool, protocol::error_codes},
    standardize::{ResponseFormat, Standardized},
    AppState,
};

/// Presentation options shared by the resource routes.
#[derive(Debug, Default, Deserialize)]
pub struct OutputQuery {
    pub format: Option<String>,
    pub limit: Option<i64>,
    pub model: Option<String>,
}

impl OutputQuery {
    /// Merge the options into tool arguments under their MCP names.
    pub fn into_args(self, mut args: Value) -> Value {
        if let Value::Object(map) = &mut args {
            if let Some(format) = self.format {
                map.insert("response_format".into(), json!(format));
            }
            if let Some(limit) = self.limit {
                map.insert("limit".into(), json!(limit));
            }
            if let Some(model) = self.model {
                map.insert("model_type".into(), json!(model));
            }
        }
        args
    }
}

/// Routes mounted under `/api`.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/rpc", post(rpc::rpc_handler))
        .route(
            "/address/:address/balance",
            get(address::get_balance_handler),
        )
        .route("/transaction/:tx_id", get(transaction::get_transaction_handler))
        .route("/box/:box_id", get(boxes::get_box_handler))
        .route(
            "/token/:token_id/holders",
            get(token::get_token_holders_handler),
        )
        .route("/tokens/search", get(token::search_tokens_handler))
        .route("/network", get(network::get_network_handler))
}

/// Run a tool for an HTTP route and turn the outcome into a response.
pub(crate) async fn respond_with_tool(state: &AppState, tool: &str, args: Value) -> Response {
    let explicit_markdown = args
        .get("response_format")
        .and_then(Value::as_str)
        .and_then(ResponseFormat::parse)
        == Some(ResponseFormat::Markdown);

    match call_tool(state, tool, &args, &Value::Null).await {
        Ok(standardized) if explicit_markdown => markdown_response(&standardized),
        Ok(standardized) => envelope_response(&standardized),
        Err(rpc_error) => {
            let status = match rpc_error.error.as_ref().map(|e| e.code) {
                Some(error_codes::METHOD_NOT_FOUND) => StatusCode::NOT_FOUND,
                _ => StatusCode::BAD_REQUEST,
            };
            (status, Json(json!({ "status": "error", "error": rpc_error.error }))).into_response()
        }
    }
}

/// 200 on success; the envelope's error code when it is a valid 4xx/5xx status.
pub fn http_status(standardized: &Standardized) -> StatusCode {
    if standardized.envelope.is_success() {
        return StatusCode::OK;
    }
    standardized
        .envelope
        .error
        .as_ref()
        .and_then(|e| StatusCode::from_u16(e.code).ok())
        .filter(|code| code.is_client_error() || code.is_server_error())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

pub fn envelope_response(standardized: &Standardized) -> Response {
    (http_status(standardized), Json(standardized.envelope.clone())).into_response()
}

fn markdown_response(standardized: &Standardized) -> Response {
    (
        http_status(standardized),
        [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")],
        standardized.text.clone(),
    )
        .into_response()
}
