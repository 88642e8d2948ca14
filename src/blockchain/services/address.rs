// src/blockchain/services/address.rs

use anyhow::{Context, Result};
use serde_json::{json, Value};

use super::success_json;
use crate::blockchain::client::{ErgoClient, Upstream, UpstreamResponse};
use crate::blockchain::models::{
    display_amount, nanoerg_to_erg, AddressBalance, ExplorerTransaction, Items,
};
use crate::standardize::parsers::{BalanceSection, TokenAmount};

pub async fn get_address_balance(client: &ErgoClient, address: &str) -> Result<UpstreamResponse> {
    let response = client
        .get(
            Upstream::Explorer,
            &format!("addresses/{}/balance/confirmed", address),
            &[],
        )
        .await?;
    let Some(body) = success_json(&response) else {
        return Ok(response);
    };

    let balance: AddressBalance =
        serde_json::from_value(body.clone()).context("Unexpected balance payload from explorer")?;
    let section = BalanceSection {
        address: Some(address.to_string()),
        erg_balance: Some(nanoerg_to_erg(balance.nano_ergs)),
        tokens: balance
            .tokens
            .iter()
            .map(|token| TokenAmount {
                name: Some(
                    token
                        .name
                        .clone()
                        .filter(|name| !name.trim().is_empty())
                        .unwrap_or_else(|| "Unknown".to_string()),
                ),
                amount: display_amount(token.amount, token.decimals),
                id: Some(token.token_id.clone()),
            })
            .collect(),
    };

    Ok(UpstreamResponse::new(response.status, section.to_markdown()))
}

pub async fn get_address_transactions(
    client: &ErgoClient,
    address: &str,
    offset: u64,
    limit: u64,
) -> Result<UpstreamResponse> {
    let response = client
        .get(
            Upstream::Explorer,
            &format!("addresses/{}/transactions", address),
            &[("offset", offset.to_string()), ("limit", limit.to_string())],
        )
        .await?;
    let Some(body) = success_json(&response) else {
        return Ok(response);
    };

    let page: Items<ExplorerTransaction> = serde_json::from_value(body.clone())
        .context("Unexpected transaction list payload from explorer")?;
    let items: Vec<Value> = page
        .items
        .iter()
        .map(|tx| {
            json!({
                "id": tx.id,
                "inclusion_height": tx.inclusion_height,
                "timestamp": tx.timestamp,
                "inputs": tx.inputs.len(),
                "outputs": tx.outputs.len(),
            })
        })
        .collect();

    Ok(UpstreamResponse::new(
        response.status,
        json!({ "address": address, "items": items, "total": page.total }),
    ))
}
