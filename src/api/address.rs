use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use serde_json::json;

use super::{respond_with_tool, OutputQuery};
use crate::AppState;

// GET /address/:address/balance
pub async fn get_balance_handler(
    Path(address): Path<String>,
    Query(query): Query<OutputQuery>,
    State(state): State<AppState>,
) -> Response {
    let args = query.into_args(json!({ "address": address }));
    respond_with_tool(&state, "get_address_balance", args).await
}
