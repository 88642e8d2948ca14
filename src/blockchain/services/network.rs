// src/blockchain/services/network.rs

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use super::success_json;
use crate::blockchain::client::{ErgoClient, Upstream, UpstreamResponse};
use crate::blockchain::models::{ExplorerBlock, Items, NetworkState};

pub async fn get_latest_blocks(client: &ErgoClient, limit: u64) -> Result<UpstreamResponse> {
    let response = client
        .get(
            Upstream::Explorer,
            "blocks",
            &[
                ("limit", limit.to_string()),
                ("sortBy", "height".to_string()),
                ("sortDirection", "desc".to_string()),
            ],
        )
        .await?;
    let Some(body) = success_json(&response) else {
        return Ok(response);
    };

    let page: Items<ExplorerBlock> =
        serde_json::from_value(body.clone()).context("Unexpected block list payload from explorer")?;
    let items: Vec<Value> = page
        .items
        .iter()
        .map(|block| {
            json!({
                "id": block.id,
                "height": block.height,
                "timestamp": block
                    .timestamp
                    .and_then(DateTime::<Utc>::from_timestamp_millis)
                    .map(|t| t.to_rfc3339()),
                "transactions": block.transactions_count,
                "size": block.size,
                "miner": block.miner.as_ref().and_then(|m| m.name.clone().or_else(|| m.address.clone())),
            })
        })
        .collect();

    Ok(UpstreamResponse::new(
        response.status,
        json!({ "items": items, "total": page.total }),
    ))
}

/// Plain-text status summary; structured by the generic extractor downstream.
pub async fn get_network_status(client: &ErgoClient) -> Result<UpstreamResponse> {
    let response = client.get(Upstream::Explorer, "networkState", &[]).await?;
    let Some(body) = success_json(&response) else {
        return Ok(response);
    };

    let state: NetworkState =
        serde_json::from_value(body.clone()).context("Unexpected network state payload from explorer")?;
    let mut text = format!(
        "Ergo Network Status:\nHeight: {}\nLast Block ID: {}\n",
        state.height, state.last_block_id
    );
    if let Some(gix) = state.max_box_gix {
        text.push_str(&format!("Max Box Index: {}\n", gix));
    }
    if let Some(gix) = state.max_tx_gix {
        text.push_str(&format!("Max Transaction Index: {}\n", gix));
    }

    Ok(UpstreamResponse::new(response.status, text))
}

pub async fn get_node_info(client: &ErgoClient) -> Result<UpstreamResponse> {
    Ok(client.get(Upstream::Node, "info", &[]).await?)
}

pub async fn get_mempool(client: &ErgoClient, limit: u64) -> Result<UpstreamResponse> {
    let response = client
        .get(
            Upstream::Node,
            "transactions/unconfirmed",
            &[("limit", limit.to_string()), ("offset", "0".to_string())],
        )
        .await?;
    let Some(Value::Array(txs)) = success_json(&response) else {
        return Ok(response);
    };

    let items: Vec<Value> = txs
        .iter()
        .map(|tx| {
            json!({
                "id": tx.get("id"),
                "inputs": tx.get("inputs").and_then(Value::as_array).map(Vec::len),
                "outputs": tx.get("outputs").and_then(Value::as_array).map(Vec::len),
                "size": tx.get("size"),
            })
        })
        .collect();

    Ok(UpstreamResponse::new(response.status, Value::Array(items)))
}
