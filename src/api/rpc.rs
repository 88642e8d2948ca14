use axum::{extract::State, Json};

use crate::{
    mcp::{
        handler::handle_mcp_request,
        protocol::{error_codes, Request, Response},
    },
    AppState,
};

// Forward JSON-RPC requests over HTTP to the MCP handler
pub async fn rpc_handler(State(state): State<AppState>, Json(req): Json<Request>) -> Json<Response> {
    match handle_mcp_request(req, state).await {
        Some(resp) => Json(resp),
        None => Json(Response::error(
            serde_json::Value::Null,
            error_codes::INVALID_REQUEST,
            "Notifications are not supported over HTTP".into(),
        )),
    }
}
