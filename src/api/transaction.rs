use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use serde_json::json;

use super::{respond_with_tool, OutputQuery};
use crate::AppState;

// GET /transaction/:tx_id
pub async fn get_transaction_handler(
    Path(tx_id): Path<String>,
    Query(query): Query<OutputQuery>,
    State(state): State<AppState>,
) -> Response {
    let args = query.into_args(json!({ "tx_id": tx_id }));
    respond_with_tool(&state, "get_transaction", args).await
}
