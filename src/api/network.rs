use axum::{
    extract::{Query, State},
    response::Response,
};
use serde_json::json;

use super::{respond_with_tool, OutputQuery};
use crate::AppState;

// GET /network
pub async fn get_network_handler(
    Query(query): Query<OutputQuery>,
    State(state): State<AppState>,
) -> Response {
    respond_with_tool(&state, "get_network_status", query.into_args(json!({}))).await
}
