// src/blockchain/services/boxes.rs

use anyhow::{Context, Result};

use super::success_json;
use crate::blockchain::client::{ErgoClient, Upstream, UpstreamResponse};
use crate::blockchain::models::{nanoerg_to_erg, ExplorerBox};
use crate::standardize::parsers::{AssetAmount, BoxSection};

pub async fn get_box(client: &ErgoClient, box_id: &str) -> Result<UpstreamResponse> {
    let response = client
        .get(Upstream::Explorer, &format!("boxes/{}", box_id), &[])
        .await?;
    let Some(body) = success_json(&response) else {
        return Ok(response);
    };

    let ergo_box: ExplorerBox =
        serde_json::from_value(body.clone()).context("Unexpected box payload from explorer")?;
    let section = BoxSection {
        box_id: Some(ergo_box.box_id),
        value: Some(nanoerg_to_erg(ergo_box.value)),
        creation_height: Some(ergo_box.creation_height),
        ergo_tree: ergo_box.ergo_tree,
        tokens: ergo_box
            .assets
            .into_iter()
            .map(|asset| AssetAmount {
                token_id: asset.token_id,
                amount: asset.amount,
            })
            .collect(),
    };

    Ok(UpstreamResponse::new(response.status, section.to_markdown()))
}
