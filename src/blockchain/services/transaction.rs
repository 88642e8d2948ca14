// src/blockchain/services/transaction.rs

use anyhow::{Context, Result};

use super::success_json;
use crate::blockchain::client::{ErgoClient, Upstream, UpstreamResponse};
use crate::blockchain::models::{nanoerg_to_erg, ExplorerTransaction};
use crate::standardize::parsers::{AssetAmount, TransactionSection, TxInput, TxOutput};

pub async fn get_transaction(client: &ErgoClient, tx_id: &str) -> Result<UpstreamResponse> {
    let response = client
        .get(Upstream::Explorer, &format!("transactions/{}", tx_id), &[])
        .await?;
    let Some(body) = success_json(&response) else {
        return Ok(response);
    };

    let tx: ExplorerTransaction =
        serde_json::from_value(body.clone()).context("Unexpected transaction payload from explorer")?;
    Ok(UpstreamResponse::new(
        response.status,
        to_section(&tx).to_markdown(),
    ))
}

fn to_section(tx: &ExplorerTransaction) -> TransactionSection {
    TransactionSection {
        tx_id: Some(tx.id.clone()),
        size: tx.size,
        inputs_count: Some(tx.inputs.len() as u64),
        outputs_count: Some(tx.outputs.len() as u64),
        inputs: tx
            .inputs
            .iter()
            .map(|input| TxInput {
                box_id: input.box_id.clone(),
                value: input.value.map(nanoerg_to_erg),
            })
            .collect(),
        outputs: tx
            .outputs
            .iter()
            .map(|output| TxOutput {
                box_id: output.box_id.clone(),
                address: output.address.clone(),
                value: Some(nanoerg_to_erg(output.value)),
                tokens: output
                    .assets
                    .iter()
                    .map(|asset| AssetAmount {
                        token_id: asset.token_id.clone(),
                        amount: asset.amount,
                    })
                    .collect(),
            })
            .collect(),
        // recovered by the parser from the rendered outputs
        tokens_transferred: Vec::new(),
    }
}
