// src/blockchain/models.rs
//
// Shapes of the upstream API responses we read fields from. Only the fields
// the tools use are modelled; everything else is ignored by serde.

use serde::{Deserialize, Serialize};

pub const NANOERGS_PER_ERG: f64 = 1_000_000_000.0;

pub fn nanoerg_to_erg(nano: u64) -> f64 {
    nano as f64 / NANOERGS_PER_ERG
}

/// Token amount adjusted by its decimals.
pub fn display_amount(raw: u64, decimals: Option<u32>) -> f64 {
    match decimals {
        Some(d) if d > 0 => raw as f64 / 10f64.powi(d as i32),
        _ => raw as f64,
    }
}

// --- Explorer ---

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorerAsset {
    pub token_id: String,
    pub amount: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub decimals: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressBalance {
    pub nano_ergs: u64,
    #[serde(default)]
    pub tokens: Vec<ExplorerAsset>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorerInput {
    pub box_id: String,
    #[serde(default)]
    pub value: Option<u64>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorerOutput {
    pub box_id: String,
    pub value: u64,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub assets: Vec<ExplorerAsset>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorerTransaction {
    pub id: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub inclusion_height: Option<u64>,
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub inputs: Vec<ExplorerInput>,
    #[serde(default)]
    pub outputs: Vec<ExplorerOutput>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorerBox {
    pub box_id: String,
    pub value: u64,
    pub creation_height: u64,
    #[serde(default)]
    pub ergo_tree: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub assets: Vec<ExplorerAsset>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorerToken {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub decimals: Option<u32>,
    #[serde(default)]
    pub emission_amount: Option<u64>,
    #[serde(default, rename = "type")]
    pub token_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorerBlock {
    pub id: String,
    pub height: u64,
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub transactions_count: Option<u64>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub miner: Option<BlockMiner>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockMiner {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkState {
    pub last_block_id: String,
    pub height: u64,
    #[serde(default)]
    pub max_box_gix: Option<u64>,
    #[serde(default)]
    pub max_tx_gix: Option<u64>,
}

/// Explorer paging wrapper.
#[derive(Debug, Clone, Deserialize)]
pub struct Items<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub total: u64,
}

// --- Derived results ---

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenHolder {
    pub address: String,
    pub amount: u64,
    /// Share of the circulating amount found in unspent boxes, in percent.
    pub share: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        assert_eq!(nanoerg_to_erg(5_000_000_000), 5.0);
        assert_eq!(display_amount(12345, Some(2)), 123.45);
        assert_eq!(display_amount(7, None), 7.0);
    }

    #[test]
    fn test_balance_deserialize() {
        let raw = r#"{"nanoErgs": 1500000000, "tokens": [{"tokenId": "03fa", "amount": 100, "decimals": 2, "name": "SigUSD"}]}"#;
        let balance: AddressBalance = serde_json::from_str(raw).unwrap();
        assert_eq!(balance.nano_ergs, 1_500_000_000);
        assert_eq!(balance.tokens[0].name.as_deref(), Some("SigUSD"));
    }
}
