use axum::{response::IntoResponse, Json};

use crate::mcp::protocol::{SERVER_NAME, SERVER_VERSION};

pub async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": SERVER_NAME,
        "version": SERVER_VERSION
    }))
}
