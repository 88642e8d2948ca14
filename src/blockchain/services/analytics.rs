// src/blockchain/services/analytics.rs
//
// ErgoWatch queries. Results are passed through as JSON.

use anyhow::Result;

use crate::blockchain::client::{ErgoClient, Upstream, UpstreamResponse};

pub async fn get_rich_list(client: &ErgoClient, limit: u64) -> Result<UpstreamResponse> {
    Ok(client
        .get(
            Upstream::ErgoWatch,
            "lists/addresses/by/balance",
            &[("limit", limit.to_string())],
        )
        .await?)
}

pub async fn get_address_rank(client: &ErgoClient, address: &str) -> Result<UpstreamResponse> {
    Ok(client
        .get(Upstream::ErgoWatch, &format!("ranking/{}", address), &[])
        .await?)
}
