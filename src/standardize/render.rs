// src/standardize/render.rs
//
// Markdown templates. Services use the section templates to build their text
// responses, and the standardizer uses them again to re-render data after
// truncation, so a template and its parser always agree.

use serde_json::Value;

use super::envelope::ErrorInfo;
use super::parsers::{
    BalanceSection, BoxSection, EipSection, SectionKind, TokenSection, TransactionSection,
};

pub fn format_erg(value: f64) -> String {
    format!("{:.9}", value)
}

/// `1234567` -> `1,234,567`
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

impl BalanceSection {
    pub fn to_markdown(&self) -> String {
        let mut out = format!(
            "Balance for {}:\n• {} ERG\n",
            self.address.as_deref().unwrap_or("unknown"),
            format_erg(self.erg_balance.unwrap_or(0.0))
        );
        if self.tokens.is_empty() {
            out.push_str("\nNo tokens found.");
            return out;
        }
        out.push_str("\nTokens:\n");
        for token in &self.tokens {
            out.push_str(&format!(
                "• {} {} (ID: {})\n",
                token.amount,
                token.name.as_deref().unwrap_or("Unknown"),
                token.id.as_deref().unwrap_or("unknown")
            ));
        }
        out
    }
}

impl TransactionSection {
    pub fn to_markdown(&self) -> String {
        let mut out = format!(
            "Transaction Details for {}:\n",
            self.tx_id.as_deref().unwrap_or("unknown")
        );
        if let Some(size) = self.size {
            out.push_str(&format!("• Size: {} bytes\n", group_thousands(size)));
        }
        out.push_str(&format!(
            "• Inputs: {}\n• Outputs: {}\n",
            self.inputs_count.unwrap_or(self.inputs.len() as u64),
            self.outputs_count.unwrap_or(self.outputs.len() as u64)
        ));

        out.push_str("\nInputs:\n");
        for (idx, input) in self.inputs.iter().enumerate() {
            out.push_str(&format!("{}. Box ID: {}\n", idx + 1, input.box_id));
            if let Some(value) = input.value {
                out.push_str(&format!("   Value: {} ERG\n", format_erg(value)));
            }
        }

        out.push_str("\nOutputs:\n");
        for (idx, output) in self.outputs.iter().enumerate() {
            out.push_str(&format!("{}. Box ID: {}\n", idx + 1, output.box_id));
            if let Some(address) = &output.address {
                out.push_str(&format!("   Address: {}\n", address));
            }
            if let Some(value) = output.value {
                out.push_str(&format!("   Value: {} ERG\n", format_erg(value)));
            }
            if !output.tokens.is_empty() {
                out.push_str("   Tokens:\n");
                for asset in &output.tokens {
                    out.push_str(&format!(
                        "   - {}: {}\n",
                        asset.token_id,
                        group_thousands(asset.amount)
                    ));
                }
            }
        }
        out
    }
}

impl BoxSection {
    pub fn to_markdown(&self) -> String {
        let mut out = format!(
            "Box Details for {}:\n",
            self.box_id.as_deref().unwrap_or("unknown")
        );
        if let Some(value) = self.value {
            out.push_str(&format!("• Value: {} ERG\n", format_erg(value)));
        }
        if let Some(height) = self.creation_height {
            out.push_str(&format!("• Creation Height: {}\n", group_thousands(height)));
        }
        if let Some(tree) = &self.ergo_tree {
            out.push_str(&format!("• ErgoTree: {}\n", tree));
        }
        if !self.tokens.is_empty() {
            out.push_str("\nTokens:\n");
            for asset in &self.tokens {
                out.push_str(&format!(
                    "• {}: {}\n",
                    asset.token_id,
                    group_thousands(asset.amount)
                ));
            }
        }
        out
    }
}

impl TokenSection {
    pub fn to_markdown(&self) -> String {
        let name = self.name.as_deref().unwrap_or("Unknown");
        let mut out = String::from("## Token Information\n\n");
        match &self.ticker {
            Some(ticker) => out.push_str(&format!("### {} ({})\n", name, ticker)),
            None => out.push_str(&format!("### {}\n", name)),
        }
        out.push_str(&format!(
            "- **Token ID**: {}\n",
            self.id.as_deref().unwrap_or("unknown")
        ));
        if let Some(decimals) = self.decimals {
            out.push_str(&format!("- **Decimals**: {}\n", decimals));
        }
        if let Some(description) = self.description.as_deref().filter(|d| !d.is_empty()) {
            out.push_str(&format!("- **Description**: {}\n", description));
        }
        if let Some(price) = &self.price {
            out.push_str("\n### Price\n");
            if let Some(erg) = price.erg {
                out.push_str(&format!("- **Price in ERG**: {:.8} ERG\n", erg));
            }
            if let Some(usd) = price.usd {
                out.push_str(&format!("- **Price in USD**: ${:.6}\n", usd));
            }
        }
        if let Some(liquidity) = &self.liquidity {
            out.push_str("\n### Liquidity\n");
            if let Some(erg) = liquidity.erg {
                out.push_str(&format!("- **ERG in Pool**: {:.2} ERG\n", erg));
            }
            if let Some(tokens) = liquidity.token {
                out.push_str(&format!("- **Tokens in Pool**: {:.2}\n", tokens));
            }
        }
        out
    }
}

impl EipSection {
    pub fn to_markdown(&self) -> String {
        let eips = match self {
            EipSection::List(eips) => eips.as_slice(),
            EipSection::Single(eip) => std::slice::from_ref(eip),
        };
        let mut out = String::from("# Ergo Improvement Proposals (EIPs)\n\n");
        for eip in eips {
            match eip.number {
                Some(number) => out.push_str(&format!("## EIP-{}: {}\n", number, eip.title)),
                None => out.push_str(&format!("## {}\n", eip.title)),
            }
            out.push_str(&format!(
                "Status: {}\n\n",
                eip.status.as_deref().unwrap_or("Unknown")
            ));
        }
        out
    }
}

/// Render structured data with the template of its section, falling back to
/// the generic renderer when the data no longer fits the section shape.
pub fn render_data(kind: Option<SectionKind>, endpoint: &str, data: &Value) -> String {
    let rendered = match kind {
        Some(SectionKind::Balance) => serde_json::from_value::<BalanceSection>(data.clone())
            .ok()
            .map(|s| s.to_markdown()),
        Some(SectionKind::Transaction) => {
            serde_json::from_value::<TransactionSection>(data.clone())
                .ok()
                .map(|s| s.to_markdown())
        }
        Some(SectionKind::Box) => serde_json::from_value::<BoxSection>(data.clone())
            .ok()
            .map(|s| s.to_markdown()),
        Some(SectionKind::Token) => serde_json::from_value::<TokenSection>(data.clone())
            .ok()
            .filter(|s| s.id.is_some() || s.name.is_some())
            .map(|s| s.to_markdown()),
        Some(SectionKind::Eip) => serde_json::from_value::<EipSection>(data.clone())
            .ok()
            .map(|s| s.to_markdown()),
        Some(SectionKind::Generic) | None => None,
    };
    rendered.unwrap_or_else(|| render_generic(&title_for(endpoint), data))
}

pub fn render_generic(title: &str, data: &Value) -> String {
    let mut out = format!("## {}\n\n", title);
    match data {
        Value::Array(items) => render_list(&mut out, items),
        Value::Object(map) => {
            for (key, value) in map {
                match value {
                    Value::Array(items) => {
                        out.push_str(&format!("\n### {} ({})\n", key, items.len()));
                        render_list(&mut out, items);
                    }
                    Value::Object(_) => {
                        out.push_str(&format!("- **{}**: {}\n", key, inline(value)))
                    }
                    scalar => out.push_str(&format!("- **{}**: {}\n", key, inline(scalar))),
                }
            }
        }
        scalar => {
            out.push_str(&inline(scalar));
            out.push('\n');
        }
    }
    out
}

fn render_list(out: &mut String, items: &[Value]) {
    if items.is_empty() {
        out.push_str("No results.\n");
        return;
    }
    for (idx, item) in items.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", idx + 1, inline(item)));
    }
}

fn inline(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "n/a".to_string(),
        Value::Object(map) => map
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| match v {
                Value::String(s) => format!("{}: {}", k, s),
                other => format!("{}: {}", k, other),
            })
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

pub fn truncation_note(shown: usize, total: usize) -> String {
    format!("\n_Showing {} of {} results (truncated)._\n", shown, total)
}

pub fn render_error(error: &ErrorInfo) -> String {
    format!("Error ({}): {}", error.code, error.message)
}

/// `get_address_balance` -> `Address Balance`
pub fn title_for(endpoint: &str) -> String {
    endpoint
        .trim_start_matches("get_")
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::standardize::parsers::{
        parse_balance, parse_box, parse_transaction, AssetAmount, TxInput, TxOutput,
    };
    use serde_json::json;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_024_000), "1,024,000");
    }

    #[test]
    fn test_balance_template_parses_back() {
        let section = BalanceSection {
            address: Some("9fAddr".into()),
            erg_balance: Some(5.0),
            tokens: vec![],
        };
        let text = section.to_markdown();
        assert_eq!(text, "Balance for 9fAddr:\n• 5.000000000 ERG\n\nNo tokens found.");
        assert_eq!(parse_balance(&text, 50).unwrap(), section);
    }

    #[test]
    fn test_transaction_template_parses_back() {
        let section = TransactionSection {
            tx_id: Some("abc123".into()),
            size: Some(2048),
            inputs_count: Some(1),
            outputs_count: Some(1),
            inputs: vec![TxInput {
                box_id: "in1".into(),
                value: Some(1.5),
            }],
            outputs: vec![TxOutput {
                box_id: "out1".into(),
                address: Some("9fDest".into()),
                value: Some(1.4),
                tokens: vec![AssetAmount {
                    token_id: "03faf2cb329f2e90d6d23b58d91bbb6c".into(),
                    amount: 12_000,
                }],
            }],
            tokens_transferred: vec![],
        };
        let parsed = parse_transaction(&section.to_markdown(), 50).unwrap();
        assert_eq!(parsed.size, Some(2048));
        assert_eq!(parsed.outputs, section.outputs);
        assert_eq!(parsed.tokens_transferred.len(), 1);
    }

    #[test]
    fn test_box_template_without_tokens() {
        let section = BoxSection {
            box_id: Some("b1".into()),
            value: Some(0.001),
            creation_height: Some(1200),
            ergo_tree: None,
            tokens: vec![],
        };
        let text = section.to_markdown();
        assert!(!text.contains("Tokens:"));
        assert_eq!(parse_box(&text, 50).unwrap(), section);
    }

    #[test]
    fn test_render_data_falls_back_to_generic() {
        let data = json!({"items": [{"id": "a", "height": 1}], "total": 1});
        let text = render_data(Some(SectionKind::Balance), "get_latest_blocks", &data);
        assert!(text.starts_with("## Latest Blocks"));
        assert!(text.contains("1. id: a, height: 1") || text.contains("1. height: 1, id: a"));
        assert!(text.contains("- **total**: 1"));
    }

    #[test]
    fn test_render_error_and_title() {
        let error = ErrorInfo {
            code: 404,
            message: "Box not found".into(),
            details: None,
        };
        assert_eq!(render_error(&error), "Error (404): Box not found");
        assert_eq!(title_for("get_address_balance"), "Address Balance");
    }
}
