use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use serde::Deserialize;
use serde_json::json;

use super::{respond_with_tool, OutputQuery};
use crate::AppState;

// GET /token/:token_id/holders
pub async fn get_token_holders_handler(
    Path(token_id): Path<String>,
    Query(query): Query<OutputQuery>,
    State(state): State<AppState>,
) -> Response {
    let args = query.into_args(json!({ "token_id": token_id }));
    respond_with_tool(&state, "get_token_holders", args).await
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub query: String,
    pub offset: Option<u64>,
    pub format: Option<String>,
    pub limit: Option<i64>,
    pub model: Option<String>,
}

// GET /tokens/search?query=
pub async fn search_tokens_handler(
    Query(search): Query<SearchQuery>,
    State(state): State<AppState>,
) -> Response {
    let output = OutputQuery {
        format: search.format,
        limit: search.limit,
        model: search.model,
    };
    let args = output.into_args(json!({
        "query": search.query,
        "offset": search.offset,
    }));
    respond_with_tool(&state, "search_tokens", args).await
}
