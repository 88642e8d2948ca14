// src/blockchain/services/token.rs

use std::collections::HashMap;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};
use validator::Validate;

use super::success_json;
use crate::blockchain::client::{ErgoClient, Upstream, UpstreamResponse};
use crate::blockchain::models::{ExplorerBox, ExplorerToken, Items, TokenHolder};
use crate::standardize::parsers::TokenSection;

/// Validated arguments of `search_tokens`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TokenSearch {
    #[validate(length(min = 3, max = 100, message = "query must be between 3 and 100 characters"))]
    pub query: String,
    #[serde(default)]
    pub offset: Option<u64>,
}

pub async fn get_token(client: &ErgoClient, token_id: &str) -> Result<UpstreamResponse> {
    let response = client
        .get(Upstream::Explorer, &format!("tokens/{}", token_id), &[])
        .await?;
    let Some(body) = success_json(&response) else {
        return Ok(response);
    };

    let token: ExplorerToken =
        serde_json::from_value(body.clone()).context("Unexpected token payload from explorer")?;
    let section = TokenSection {
        id: Some(token.id),
        name: token.name,
        ticker: None,
        decimals: token.decimals,
        description: token.description,
        price: None,
        liquidity: None,
    };

    Ok(UpstreamResponse::new(response.status, section.to_markdown()))
}

pub async fn search_tokens(
    client: &ErgoClient,
    search: &TokenSearch,
    limit: u64,
) -> Result<UpstreamResponse> {
    let response = client
        .get(
            Upstream::Explorer,
            "tokens/search",
            &[
                ("query", search.query.clone()),
                ("offset", search.offset.unwrap_or(0).to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await?;
    let Some(body) = success_json(&response) else {
        return Ok(response);
    };

    let page: Items<ExplorerToken> = serde_json::from_value(body.clone())
        .context("Unexpected token search payload from explorer")?;
    let items: Vec<Value> = page
        .items
        .iter()
        .map(|token| {
            json!({
                "id": token.id,
                "name": token.name,
                "decimals": token.decimals,
                "emission_amount": token.emission_amount,
                "type": token.token_type,
            })
        })
        .collect();

    Ok(UpstreamResponse::new(
        response.status,
        json!({ "query": search.query, "items": items, "total": page.total }),
    ))
}

/// Walk the unspent boxes holding `token_id` and aggregate amounts per address.
///
/// Pages of `page_size` boxes are fetched until a short page or `max_pages`.
/// A failing first page is passed through; a failure later keeps what was collected.
pub async fn get_token_holders(
    client: &ErgoClient,
    token_id: &str,
    page_size: usize,
    max_pages: usize,
) -> Result<UpstreamResponse> {
    let path = format!("boxes/unspent/byTokenId/{}", token_id);
    let mut balances: HashMap<String, u64> = HashMap::new();
    let mut status = None;

    for page in 0..max_pages.max(1) {
        let offset = page * page_size;
        let response = client
            .get(
                Upstream::Explorer,
                &path,
                &[("offset", offset.to_string()), ("limit", page_size.to_string())],
            )
            .await?;

        let Some(body) = success_json(&response) else {
            if page == 0 {
                return Ok(response);
            }
            warn!("holder scan for {} stopped at page {}: status {}", token_id, page, response.status);
            break;
        };
        status = Some(response.status);

        let boxes: Items<ExplorerBox> = serde_json::from_value(body.clone())
            .context("Unexpected unspent box payload from explorer")?;
        let fetched = boxes.items.len();
        for ergo_box in boxes.items {
            let held: u64 = ergo_box
                .assets
                .iter()
                .filter(|asset| asset.token_id == token_id)
                .map(|asset| asset.amount)
                .sum();
            let owner = ergo_box.address.unwrap_or_else(|| "unknown".to_string());
            *balances.entry(owner).or_insert(0) += held;
        }

        debug!("holder scan for {}: page {} had {} boxes", token_id, page, fetched);
        if fetched < page_size {
            break;
        }
    }

    Ok(UpstreamResponse::new(
        status.unwrap_or(200),
        json!(rank_holders(balances)),
    ))
}

/// Largest holders first; equal amounts ordered by address.
pub fn rank_holders(balances: HashMap<String, u64>) -> Vec<TokenHolder> {
    let total: u64 = balances.values().sum();
    let mut holders: Vec<TokenHolder> = balances
        .into_iter()
        .filter(|(_, amount)| *amount > 0)
        .map(|(address, amount)| TokenHolder {
            share: if total == 0 {
                0.0
            } else {
                ((amount as f64 / total as f64) * 10_000.0).round() / 100.0
            },
            address,
            amount,
        })
        .collect();
    holders.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| a.address.cmp(&b.address)));
    holders
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_validation() {
        let short = TokenSearch {
            query: "ab".to_string(),
            offset: None,
        };
        assert!(short.validate().is_err());

        let ok = TokenSearch {
            query: "sigusd".to_string(),
            offset: Some(10),
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_rank_holders() {
        let mut balances = HashMap::new();
        balances.insert("9fB".to_string(), 25);
        balances.insert("9fA".to_string(), 75);
        balances.insert("9fEmpty".to_string(), 0);

        let ranked = rank_holders(balances);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].address, "9fA");
        assert_eq!(ranked[0].share, 75.0);
        assert_eq!(ranked[1].share, 25.0);
    }
}
