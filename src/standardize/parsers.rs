// src/standardize/parsers.rs
//
// Extractors that turn the markdown/text blocks produced by the tools back
// into structured data. Every parser is tolerant: fields it cannot find are
// left as `None`, and it only fails when none of its anchors are present.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::error::StandardizeError;

lazy_static! {
    // balance
    static ref BALANCE_ADDRESS_RE: Regex = Regex::new(r"Balance for\s+([^\s:]+)\s*:").unwrap();
    static ref ERG_LINE_RE: Regex =
        Regex::new(r"(?m)^\s*[•\-*]\s*([0-9][0-9,]*(?:\.[0-9]+)?)\s+ERG\b").unwrap();
    static ref INLINE_TOKEN_RE: Regex = Regex::new(
        r"(?m)^\s*[•\-*]\s*([0-9][0-9,]*(?:\.[0-9]+)?)\s+(?:(.+?)\s+)?\(ID:\s*([A-Za-z0-9]+)(?:\.\.\.)?\)"
    )
    .unwrap();
    static ref BLOCK_TOKEN_RE: Regex = Regex::new(
        r"(?m)^\s*[•\-*]\s*([^\n]+?)\s*\n\s+ID:\s*([A-Za-z0-9]+)\s*\n\s+Amount:\s*([0-9][0-9,]*(?:\.[0-9]+)?)"
    )
    .unwrap();

    // transaction and box
    static ref TX_ID_RE: Regex = Regex::new(r"Transaction Details for\s+([A-Za-z0-9]+)").unwrap();
    static ref BOX_ID_RE: Regex = Regex::new(r"Box Details for\s+([A-Za-z0-9]+)").unwrap();
    static ref LABELED_RE: Regex =
        Regex::new(r"^(?:[•\-*]\s*)?([A-Za-z][A-Za-z ]*?):\s*(.+?)\s*$").unwrap();
    static ref NUMBERED_BOX_RE: Regex = Regex::new(r"^\d+\.\s*Box ID:\s*([A-Za-z0-9]+)").unwrap();
    static ref ASSET_LINE_RE: Regex =
        Regex::new(r"^[•\-*]\s*([A-Za-z0-9]{16,}):\s*([0-9][0-9,]*)\s*$").unwrap();
    static ref ERG_VALUE_RE: Regex = Regex::new(r"^([0-9][0-9,]*(?:\.[0-9]+)?)\s*ERG").unwrap();

    // token
    static ref TOKEN_DETAILS_RE: Regex = Regex::new(r"Token Details for\s+([A-Za-z0-9]+)").unwrap();
    static ref H3_NAME_RE: Regex =
        Regex::new(r"(?m)^###\s+([^(\n]+?)\s*(?:\(([^)\n]+)\))?\s*$").unwrap();
    static ref BOLD_FIELD_RE: Regex =
        Regex::new(r"(?m)^\s*[-•*]\s*\*\*([^*]+)\*\*:\s*(.+?)\s*$").unwrap();

    // eip
    static ref EIP_HEADER_RE: Regex =
        Regex::new(r"(?m)^#{1,3}[ \t]*EIP-(\d+):[ \t]*([^\n]+?)[ \t]*(?:\nStatus:[ \t]*([^\n]+?)[ \t]*)?$").unwrap();
    static ref HTML_TITLE_RE: Regex = Regex::new(r"<h1>([^<]+)</h1>").unwrap();
    static ref HTML_STATUS_RE: Regex = Regex::new(r"<li>Status:\s*([^<]+)</li>").unwrap();
    static ref EIP_NUMBER_RE: Regex = Regex::new(r"EIP-(\d+)").unwrap();

    // generic
    static ref BULLET_PREFIX_RE: Regex = Regex::new(r"^(?:[•\-*]|\d+\.)\s+").unwrap();
    static ref MD_HEADER_RE: Regex = Regex::new(r"^(#{1,6})\s+(.+?)\s*$").unwrap();
    static ref INT_RE: Regex = Regex::new(r"^-?[0-9]+$").unwrap();
    static ref FLOAT_RE: Regex = Regex::new(r"^-?[0-9]+\.[0-9]+$").unwrap();
}

/// Content families a parser exists for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Balance,
    Transaction,
    Box,
    Token,
    Eip,
    Generic,
}

impl SectionKind {
    pub fn name(&self) -> &'static str {
        match self {
            SectionKind::Balance => "balance",
            SectionKind::Transaction => "transaction",
            SectionKind::Box => "box",
            SectionKind::Token => "token",
            SectionKind::Eip => "eip",
            SectionKind::Generic => "generic",
        }
    }
}

/// A content-sniffing rule; rules are evaluated in order and the first match wins.
pub struct SectionRule {
    pub kind: SectionKind,
    pub matches: fn(&str) -> bool,
}

pub const SECTION_RULES: &[SectionRule] = &[
    SectionRule {
        kind: SectionKind::Balance,
        matches: |text| text.contains("Balance for"),
    },
    SectionRule {
        kind: SectionKind::Transaction,
        matches: |text| text.contains("Transaction Details"),
    },
    SectionRule {
        kind: SectionKind::Box,
        matches: |text| text.contains("Box Details"),
    },
    SectionRule {
        kind: SectionKind::Token,
        matches: |text| {
            text.contains("Token Details for") || (text.contains("### ") && text.contains("Token ID"))
        },
    },
    SectionRule {
        kind: SectionKind::Eip,
        matches: |text| {
            text.contains("Ergo Improvement Proposals") || text.matches("EIP-").count() >= 2
        },
    },
];

/// Endpoint names that pin a parser regardless of content.
pub const ENDPOINT_HINTS: &[(&str, SectionKind)] = &[
    ("get_address_balance", SectionKind::Balance),
    ("address_balance", SectionKind::Balance),
    ("balance", SectionKind::Balance),
    ("get_transaction", SectionKind::Transaction),
    ("transaction", SectionKind::Transaction),
    ("get_box", SectionKind::Box),
    ("box", SectionKind::Box),
    ("get_token", SectionKind::Token),
    ("token", SectionKind::Token),
    ("get_token_price", SectionKind::Token),
    ("list_eips", SectionKind::Eip),
    ("get_eip", SectionKind::Eip),
    ("eips", SectionKind::Eip),
];

pub fn kind_for_endpoint(endpoint: &str) -> Option<SectionKind> {
    let endpoint = endpoint.trim().to_ascii_lowercase();
    ENDPOINT_HINTS
        .iter()
        .find(|(name, _)| *name == endpoint)
        .map(|(_, kind)| *kind)
}

pub fn sniff_kind(text: &str) -> SectionKind {
    SECTION_RULES
        .iter()
        .find(|rule| (rule.matches)(text))
        .map(|rule| rule.kind)
        .unwrap_or(SectionKind::Generic)
}

/// Endpoint hint first, then content sniffing, then the generic extractor.
pub fn select_kind(endpoint: Option<&str>, text: &str) -> SectionKind {
    endpoint
        .and_then(kind_for_endpoint)
        .unwrap_or_else(|| sniff_kind(text))
}

/// Run the parser for `kind` and return its result as JSON.
pub fn parse_section(
    kind: SectionKind,
    text: &str,
    markdown: bool,
    excerpt_chars: usize,
) -> Result<Value, StandardizeError> {
    let value = match kind {
        SectionKind::Balance => serde_json::to_value(parse_balance(text, excerpt_chars)?)?,
        SectionKind::Transaction => serde_json::to_value(parse_transaction(text, excerpt_chars)?)?,
        SectionKind::Box => serde_json::to_value(parse_box(text, excerpt_chars)?)?,
        SectionKind::Token => serde_json::to_value(parse_token(text, excerpt_chars)?)?,
        SectionKind::Eip => serde_json::to_value(parse_eips(text, excerpt_chars)?)?,
        SectionKind::Generic => parse_generic(text, markdown, excerpt_chars)?,
    };
    Ok(value)
}

// --- Section types ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenAmount {
    pub name: Option<String>,
    pub amount: f64,
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceSection {
    pub address: Option<String>,
    pub erg_balance: Option<f64>,
    pub tokens: Vec<TokenAmount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetAmount {
    pub token_id: String,
    pub amount: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxInput {
    pub box_id: String,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxOutput {
    pub box_id: String,
    pub address: Option<String>,
    pub value: Option<f64>,
    pub tokens: Vec<AssetAmount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenTransfer {
    pub token_id: String,
    pub amount: u64,
    pub box_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionSection {
    pub tx_id: Option<String>,
    pub size: Option<u64>,
    pub inputs_count: Option<u64>,
    pub outputs_count: Option<u64>,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
    pub tokens_transferred: Vec<TokenTransfer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxSection {
    pub box_id: Option<String>,
    pub value: Option<f64>,
    pub creation_height: Option<u64>,
    pub ergo_tree: Option<String>,
    pub tokens: Vec<AssetAmount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenPrice {
    pub erg: Option<f64>,
    pub usd: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenLiquidity {
    pub erg: Option<f64>,
    pub token: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenSection {
    pub id: Option<String>,
    pub name: Option<String>,
    pub ticker: Option<String>,
    pub decimals: Option<u32>,
    pub description: Option<String>,
    pub price: Option<TokenPrice>,
    pub liquidity: Option<TokenLiquidity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EipSummary {
    pub number: Option<u32>,
    pub title: String,
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EipSection {
    List(Vec<EipSummary>),
    Single(EipSummary),
}

// --- Parsers ---

pub fn parse_balance(text: &str, excerpt_chars: usize) -> Result<BalanceSection, StandardizeError> {
    let address = BALANCE_ADDRESS_RE
        .captures(text)
        .map(|caps| caps[1].to_string());
    let erg_balance = ERG_LINE_RE
        .captures(text)
        .and_then(|caps| parse_decimal(&caps[1]));

    if address.is_none() && erg_balance.is_none() {
        return Err(StandardizeError::parse("balance", text, excerpt_chars));
    }

    let mut tokens: Vec<TokenAmount> = INLINE_TOKEN_RE
        .captures_iter(text)
        .filter_map(|caps| {
            Some(TokenAmount {
                name: caps
                    .get(2)
                    .map(|m| m.as_str().trim().to_string())
                    .filter(|name| !name.is_empty()),
                amount: parse_decimal(&caps[1])?,
                id: Some(caps[3].to_string()),
            })
        })
        .collect();

    tokens.extend(BLOCK_TOKEN_RE.captures_iter(text).filter_map(|caps| {
        Some(TokenAmount {
            name: Some(caps[1].trim().to_string()),
            amount: parse_decimal(&caps[3])?,
            id: Some(caps[2].to_string()),
        })
    }));

    Ok(BalanceSection {
        address,
        erg_balance,
        tokens,
    })
}

#[derive(Clone, Copy, PartialEq)]
enum TxBlock {
    Header,
    Inputs,
    Outputs,
}

pub fn parse_transaction(
    text: &str,
    excerpt_chars: usize,
) -> Result<TransactionSection, StandardizeError> {
    let mut section = TransactionSection {
        tx_id: TX_ID_RE.captures(text).map(|caps| caps[1].to_string()),
        size: None,
        inputs_count: None,
        outputs_count: None,
        inputs: Vec::new(),
        outputs: Vec::new(),
        tokens_transferred: Vec::new(),
    };

    let mut block = TxBlock::Header;
    for line in text.lines().map(str::trim) {
        match line {
            "Inputs:" => {
                block = TxBlock::Inputs;
                continue;
            }
            "Outputs:" => {
                block = TxBlock::Outputs;
                continue;
            }
            _ => {}
        }

        if let Some(caps) = NUMBERED_BOX_RE.captures(line) {
            let box_id = caps[1].to_string();
            match block {
                TxBlock::Outputs => section.outputs.push(TxOutput {
                    box_id,
                    address: None,
                    value: None,
                    tokens: Vec::new(),
                }),
                _ => section.inputs.push(TxInput { box_id, value: None }),
            }
            continue;
        }

        if block == TxBlock::Outputs {
            if let Some(caps) = ASSET_LINE_RE.captures(line) {
                if let (Some(output), Some(amount)) = (section.outputs.last_mut(), parse_integer(&caps[2])) {
                    let token_id = caps[1].to_string();
                    section.tokens_transferred.push(TokenTransfer {
                        token_id: token_id.clone(),
                        amount,
                        box_id: output.box_id.clone(),
                    });
                    output.tokens.push(AssetAmount { token_id, amount });
                }
                continue;
            }
        }

        let Some(caps) = LABELED_RE.captures(line) else {
            continue;
        };
        let (label, value) = (&caps[1], &caps[2]);
        match (block, label) {
            (TxBlock::Header, "Size") => section.size = parse_integer(value),
            (TxBlock::Header, "Inputs") => section.inputs_count = parse_integer(value),
            (TxBlock::Header, "Outputs") => section.outputs_count = parse_integer(value),
            (TxBlock::Inputs, "Value") => {
                if let Some(input) = section.inputs.last_mut() {
                    input.value = parse_erg(value);
                }
            }
            (TxBlock::Outputs, "Value") => {
                if let Some(output) = section.outputs.last_mut() {
                    output.value = parse_erg(value);
                }
            }
            (TxBlock::Outputs, "Address") => {
                if let Some(output) = section.outputs.last_mut() {
                    output.address = Some(value.to_string());
                }
            }
            _ => {}
        }
    }

    if section.tx_id.is_none() && section.inputs.is_empty() && section.outputs.is_empty() {
        return Err(StandardizeError::parse("transaction", text, excerpt_chars));
    }
    Ok(section)
}

pub fn parse_box(text: &str, excerpt_chars: usize) -> Result<BoxSection, StandardizeError> {
    let mut section = BoxSection {
        box_id: BOX_ID_RE.captures(text).map(|caps| caps[1].to_string()),
        value: None,
        creation_height: None,
        ergo_tree: None,
        tokens: Vec::new(),
    };

    let mut in_tokens = false;
    for line in text.lines().map(str::trim) {
        if line == "Tokens:" {
            in_tokens = true;
            continue;
        }
        if in_tokens {
            if let Some(caps) = ASSET_LINE_RE.captures(line) {
                if let Some(amount) = parse_integer(&caps[2]) {
                    section.tokens.push(AssetAmount {
                        token_id: caps[1].to_string(),
                        amount,
                    });
                }
            }
            continue;
        }
        if let Some(caps) = LABELED_RE.captures(line) {
            match &caps[1] {
                "Value" => section.value = parse_erg(&caps[2]),
                "Creation Height" => section.creation_height = parse_integer(&caps[2]),
                "ErgoTree" => section.ergo_tree = Some(caps[2].to_string()),
                _ => {}
            }
        }
    }

    if section.box_id.is_none() && section.value.is_none() {
        return Err(StandardizeError::parse("box", text, excerpt_chars));
    }
    Ok(section)
}

pub fn parse_token(text: &str, excerpt_chars: usize) -> Result<TokenSection, StandardizeError> {
    let mut fields: Vec<(String, String)> = BOLD_FIELD_RE
        .captures_iter(text)
        .map(|caps| (caps[1].trim().to_string(), caps[2].to_string()))
        .collect();
    // "• Name: value" lines of the explorer token template
    fields.extend(text.lines().filter_map(|line| {
        let caps = LABELED_RE.captures(line.trim())?;
        Some((caps[1].to_string(), caps[2].to_string()))
    }));
    let field = |label: &str| {
        fields
            .iter()
            .find(|(key, _)| key == label)
            .map(|(_, value)| value.clone())
    };

    let heading = H3_NAME_RE.captures_iter(text).find(|caps| {
        !matches!(
            caps[1].trim(),
            "Price" | "Liquidity" | "Source" | "Price Change"
        )
    });

    let id = field("Token ID").or_else(|| {
        TOKEN_DETAILS_RE
            .captures(text)
            .map(|caps| caps[1].to_string())
    });
    let name = heading
        .as_ref()
        .map(|caps| caps[1].trim().to_string())
        .or_else(|| field("Name"));
    let ticker = heading
        .as_ref()
        .and_then(|caps| caps.get(2))
        .map(|m| m.as_str().trim().to_string());

    if id.is_none() && name.is_none() {
        return Err(StandardizeError::parse("token", text, excerpt_chars));
    }

    let price_erg = field("Price in ERG").and_then(|v| parse_erg(&v));
    let price_usd = field("Price in USD").and_then(|v| parse_decimal(v.trim_start_matches('$')));
    let liquidity_erg = field("ERG in Pool").and_then(|v| parse_erg(&v));
    let liquidity_token = field("Tokens in Pool").and_then(|v| leading_decimal(&v));

    Ok(TokenSection {
        id,
        name,
        ticker,
        decimals: field("Decimals").and_then(|v| v.trim().parse().ok()),
        description: field("Description"),
        price: (price_erg.is_some() || price_usd.is_some()).then(|| TokenPrice {
            erg: price_erg,
            usd: price_usd,
        }),
        liquidity: (liquidity_erg.is_some() || liquidity_token.is_some()).then(|| TokenLiquidity {
            erg: liquidity_erg,
            token: liquidity_token,
        }),
    })
}

pub fn parse_eips(text: &str, excerpt_chars: usize) -> Result<EipSection, StandardizeError> {
    let eips: Vec<EipSummary> = EIP_HEADER_RE
        .captures_iter(text)
        .map(|caps| EipSummary {
            number: caps[1].parse().ok(),
            title: caps[2].to_string(),
            status: caps.get(3).map(|m| m.as_str().to_string()),
        })
        .collect();

    if eips.len() > 1 || text.contains("Ergo Improvement Proposals") {
        return Ok(EipSection::List(eips));
    }
    if let Some(single) = eips.into_iter().next() {
        return Ok(EipSection::Single(single));
    }

    // rendered EIP documents come back as HTML fragments
    let title = HTML_TITLE_RE
        .captures(text)
        .map(|caps| caps[1].trim().to_string())
        .ok_or_else(|| StandardizeError::parse("eip", text, excerpt_chars))?;
    Ok(EipSection::Single(EipSummary {
        number: EIP_NUMBER_RE
            .captures(&title)
            .and_then(|caps| caps[1].parse().ok()),
        status: HTML_STATUS_RE
            .captures(text)
            .map(|caps| caps[1].trim().to_string()),
        title,
    }))
}

/// Line-based fallback: `key: value` per line, plus headers and tables for markdown.
pub fn parse_generic(
    text: &str,
    markdown: bool,
    excerpt_chars: usize,
) -> Result<Value, StandardizeError> {
    if text.trim().is_empty() {
        return Err(StandardizeError::parse("generic", text, excerpt_chars));
    }

    let mut data = Map::new();
    let mut in_fence = false;
    for line in text.lines().map(str::trim) {
        if line.starts_with("```") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence || line.starts_with('#') || line.starts_with('|') {
            continue;
        }
        let line = BULLET_PREFIX_RE.replace(line, "");
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.replace("**", "").trim().to_string();
        let value = value.trim();
        if key.is_empty() || value.is_empty() || data.contains_key(&key) {
            continue;
        }
        data.insert(key, coerce_scalar(value));
    }

    if markdown {
        let headers = extract_headers(text);
        if !headers.is_empty() && !data.contains_key("headers") {
            data.insert("headers".to_string(), Value::Object(headers));
        }
        let tables = extract_tables(text);
        if !tables.is_empty() && !data.contains_key("tables") {
            data.insert("tables".to_string(), Value::Array(tables));
        }
    }

    if data.is_empty() {
        return Ok(json!({ "message": text.trim() }));
    }
    Ok(Value::Object(data))
}

fn extract_headers(text: &str) -> Map<String, Value> {
    let mut headers = Map::new();
    for caps in text.lines().filter_map(|line| MD_HEADER_RE.captures(line.trim())) {
        let level = format!("h{}", caps[1].len());
        let entry = headers
            .entry(level)
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(titles) = entry {
            titles.push(Value::String(caps[2].to_string()));
        }
    }
    headers
}

fn extract_tables(text: &str) -> Vec<Value> {
    let split_row = |row: &str| -> Vec<String> {
        row.trim()
            .trim_matches('|')
            .split('|')
            .map(|cell| cell.trim().to_string())
            .collect()
    };
    let is_separator = |row: &str| {
        row.trim()
            .trim_matches('|')
            .split('|')
            .all(|cell| !cell.trim().is_empty() && cell.trim().chars().all(|c| c == '-' || c == ':'))
    };

    let lines: Vec<&str> = text.lines().collect();
    let mut tables = Vec::new();
    let mut idx = 0;
    while idx + 1 < lines.len() {
        if !(lines[idx].trim().starts_with('|') && is_separator(lines[idx + 1])) {
            idx += 1;
            continue;
        }
        let headers = split_row(lines[idx]);
        let mut rows = Vec::new();
        idx += 2;
        while idx < lines.len() && lines[idx].trim().starts_with('|') {
            let row: Map<String, Value> = headers
                .iter()
                .cloned()
                .zip(split_row(lines[idx]).into_iter().map(Value::String))
                .collect();
            rows.push(Value::Object(row));
            idx += 1;
        }
        tables.push(json!({
            "name": format!("table_{}", tables.len() + 1),
            "headers": headers,
            "rows": rows,
        }));
    }
    tables
}

// --- Scalar helpers ---

fn coerce_scalar(value: &str) -> Value {
    if value.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if value.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    if INT_RE.is_match(value) {
        if let Ok(n) = value.parse::<i64>() {
            return json!(n);
        }
    }
    if FLOAT_RE.is_match(value) {
        if let Ok(n) = value.parse::<f64>() {
            return json!(n);
        }
    }
    Value::String(value.to_string())
}

fn parse_decimal(raw: &str) -> Option<f64> {
    raw.trim().replace(',', "").parse::<f64>().ok()
}

fn parse_integer(raw: &str) -> Option<u64> {
    raw.trim()
        .split_whitespace()
        .next()?
        .replace(',', "")
        .parse::<u64>()
        .ok()
}

fn parse_erg(raw: &str) -> Option<f64> {
    ERG_VALUE_RE
        .captures(raw.trim())
        .and_then(|caps| parse_decimal(&caps[1]))
}

fn leading_decimal(raw: &str) -> Option<f64> {
    parse_decimal(raw.split_whitespace().next()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TX_TEXT: &str = "Transaction Details for ff9b418e98:\n\
• Size: 1,234 bytes\n\
• Inputs: 1\n\
• Outputs: 2\n\
\n\
Inputs:\n\
1. Box ID: in01\n   Value: 2.500000000 ERG\n\
\n\
Outputs:\n\
1. Box ID: out01\n   Address: 9fAddrOne\n   Value: 2.000000000 ERG\n   Tokens:\n   - 03faf2cb329f2e90d6d23b58d91bbb6c046aa143261cc21f52fbe2824bfcbf04: 1,500\n\
2. Box ID: out02\n   Address: 9fAddrTwo\n   Value: 0.499000000 ERG\n";

    #[test]
    fn test_balance_scenario() {
        let text = "Balance for 9f...:\n• 5.000000000 ERG\n\nNo tokens found.";
        let parsed = parse_balance(text, 100).unwrap();
        assert_eq!(parsed.address.as_deref(), Some("9f..."));
        assert_eq!(parsed.erg_balance, Some(5.0));
        assert!(parsed.tokens.is_empty());
    }

    #[test]
    fn test_balance_with_tokens() {
        let text = "Balance for 9hHDQb26:\n• 1.250000000 ERG\n\nTokens:\n\
• 1,000.5 SigUSD (ID: 03faf2cb...)\n• 7 Comet (ID: 0cd8c9f4)\n• 5  (ID: aaaa)\n";
        let parsed = parse_balance(text, 100).unwrap();
        assert_eq!(parsed.erg_balance, Some(1.25));
        assert_eq!(parsed.tokens.len(), 3);
        assert_eq!(parsed.tokens[2].name, None);
        assert_eq!(parsed.tokens[2].amount, 5.0);
        assert_eq!(parsed.tokens[2].id.as_deref(), Some("aaaa"));
        assert_eq!(parsed.tokens[0].name.as_deref(), Some("SigUSD"));
        assert_eq!(parsed.tokens[0].amount, 1000.5);
        assert_eq!(parsed.tokens[0].id.as_deref(), Some("03faf2cb"));
    }

    #[test]
    fn test_balance_block_token_layout() {
        let text = "Balance for 9hAddr:\n\nConfirmed Balance:\n• 3.000000000 ERG\n\n\
Confirmed Tokens:\n• SigUSD\n  ID: 03faf2cb\n  Amount: 12.50\n";
        let parsed = parse_balance(text, 100).unwrap();
        assert_eq!(parsed.tokens.len(), 1);
        assert_eq!(parsed.tokens[0].amount, 12.5);
    }

    #[test]
    fn test_balance_missing_anchors_fails() {
        let err = parse_balance("Error fetching balance: timeout", 10).unwrap_err();
        assert!(matches!(err, StandardizeError::Parse { parser: "balance", .. }));
    }

    #[test]
    fn test_transaction_parse() {
        let parsed = parse_transaction(TX_TEXT, 100).unwrap();
        assert_eq!(parsed.tx_id.as_deref(), Some("ff9b418e98"));
        assert_eq!(parsed.size, Some(1234));
        assert_eq!(parsed.inputs_count, Some(1));
        assert_eq!(parsed.outputs_count, Some(2));
        assert_eq!(parsed.inputs.len(), 1);
        assert_eq!(parsed.inputs[0].value, Some(2.5));
        assert_eq!(parsed.outputs.len(), 2);
        assert_eq!(parsed.outputs[0].address.as_deref(), Some("9fAddrOne"));
        assert_eq!(parsed.outputs[0].tokens[0].amount, 1500);
        assert_eq!(parsed.tokens_transferred.len(), 1);
        assert_eq!(parsed.tokens_transferred[0].box_id, "out01");
        assert_eq!(parsed.outputs[1].value, Some(0.499));
    }

    #[test]
    fn test_box_parse_ignores_value_line_as_token() {
        let text = "Box Details for b0x1d:\n• Value: 1.000000000 ERG\n• Creation Height: 1,024,000\n\
• ErgoTree: 0008cd02\n\nTokens:\n• 03faf2cb329f2e90d6d23b58d91bbb6c: 10\n";
        let parsed = parse_box(text, 100).unwrap();
        assert_eq!(parsed.box_id.as_deref(), Some("b0x1d"));
        assert_eq!(parsed.value, Some(1.0));
        assert_eq!(parsed.creation_height, Some(1_024_000));
        assert_eq!(parsed.ergo_tree.as_deref(), Some("0008cd02"));
        assert_eq!(parsed.tokens.len(), 1);
    }

    #[test]
    fn test_token_price_block() {
        let text = "\n## Token Price Information\n\n### SigmaUSD (SigUSD)\n- **Token ID**: 03faf2cb\n\
- **Timestamp**: Unknown\n\n### Price\n- **Price in ERG**: 0.52000000 ERG\n- **Price in USD**: $1.000100\n\n\
### Liquidity\n- **ERG in Pool**: 1200.50 ERG\n- **Tokens in Pool**: 2,300.00 SigUSD\n";
        let parsed = parse_token(text, 100).unwrap();
        assert_eq!(parsed.id.as_deref(), Some("03faf2cb"));
        assert_eq!(parsed.name.as_deref(), Some("SigmaUSD"));
        assert_eq!(parsed.ticker.as_deref(), Some("SigUSD"));
        let price = parsed.price.unwrap();
        assert_eq!(price.erg, Some(0.52));
        assert_eq!(price.usd, Some(1.0001));
        let liquidity = parsed.liquidity.unwrap();
        assert_eq!(liquidity.erg, Some(1200.5));
        assert_eq!(liquidity.token, Some(2300.0));
    }

    #[test]
    fn test_token_without_market_data_is_partial() {
        let text = "Token Details for 0cd8c9f4:\n• Name: Comet\n• Decimals: 0\n";
        let parsed = parse_token(text, 100).unwrap();
        assert_eq!(parsed.id.as_deref(), Some("0cd8c9f4"));
        assert_eq!(parsed.name.as_deref(), Some("Comet"));
        assert_eq!(parsed.decimals, Some(0));
        assert!(parsed.price.is_none());
        assert!(parsed.liquidity.is_none());
    }

    #[test]
    fn test_eip_list_and_single() {
        let list = "# Ergo Improvement Proposals (EIPs)\n\n## EIP-1: UTXO-Set Scanning Wallet API\nStatus: Implemented\n\n\
## EIP-4: Assets Standard\nStatus: Final\n\n";
        match parse_eips(list, 100).unwrap() {
            EipSection::List(eips) => {
                assert_eq!(eips.len(), 2);
                assert_eq!(eips[1].number, Some(4));
                assert_eq!(eips[1].status.as_deref(), Some("Final"));
            }
            other => panic!("expected list, got {:?}", other),
        }

        let single = "<h1>EIP-22: Auction Contract</h1>\n<ul><li>Status: Draft</li></ul>";
        match parse_eips(single, 100).unwrap() {
            EipSection::Single(eip) => {
                assert_eq!(eip.number, Some(22));
                assert_eq!(eip.status.as_deref(), Some("Draft"));
            }
            other => panic!("expected single, got {:?}", other),
        }
    }

    #[test]
    fn test_dispatch_order() {
        assert_eq!(sniff_kind("Balance for x:\n• 1 ERG"), SectionKind::Balance);
        assert_eq!(sniff_kind("Transaction Details for a:"), SectionKind::Transaction);
        assert_eq!(sniff_kind("Box Details for b:"), SectionKind::Box);
        assert_eq!(sniff_kind("see EIP-1 and EIP-2"), SectionKind::Eip);
        assert_eq!(sniff_kind("Height: 5"), SectionKind::Generic);
        // the endpoint hint beats content sniffing
        assert_eq!(select_kind(Some("get_box"), "Balance for x:"), SectionKind::Box);
        assert_eq!(select_kind(Some("unknown_tool"), "Box Details for b:"), SectionKind::Box);
    }

    #[test]
    fn test_generic_key_values() {
        let text = "Ergo Network Status:\nHeight: 1,000\nBlock Version: 3\nSynced: true\nRatio: 0.5\n";
        let parsed = parse_generic(text, false, 100).unwrap();
        assert_eq!(parsed["Height"], "1,000");
        assert_eq!(parsed["Block Version"], 3);
        assert_eq!(parsed["Synced"], true);
        assert_eq!(parsed["Ratio"], 0.5);
        assert!(parsed.get("Ergo Network Status").is_none());
    }

    #[test]
    fn test_generic_markdown_headers_and_tables() {
        let text = "# Holders\n| Address | Amount |\n|---|---|\n| 9fA | 10 |\n| 9fB | 5 |\n- **Total**: 15\n";
        let parsed = parse_generic(text, true, 100).unwrap();
        assert_eq!(parsed["Total"], 15);
        assert_eq!(parsed["headers"]["h1"][0], "Holders");
        assert_eq!(parsed["tables"][0]["rows"][1]["Address"], "9fB");
    }

    #[test]
    fn test_generic_without_pairs_keeps_message() {
        let parsed = parse_generic("No transactions found.", false, 100).unwrap();
        assert_eq!(parsed, json!({"message": "No transactions found."}));
        assert!(parse_generic("   \n", false, 100).is_err());
    }
}
