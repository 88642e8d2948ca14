use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use serde_json::json;

use super::{respond_with_tool, OutputQuery};
use crate::AppState;

// GET /box/:box_id
pub async fn get_box_handler(
    Path(box_id): Path<String>,
    Query(query): Query<OutputQuery>,
    State(state): State<AppState>,
) -> Response {
    let args = query.into_args(json!({ "box_id": box_id }));
    respond_with_tool(&state, "get_box", args).await
}
