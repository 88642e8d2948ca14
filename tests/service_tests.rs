//! Tool calls against mocked upstream APIs

use mockito::{mock, Matcher};
use serde_json::{json, Value};

use ergo_mcp_server::{
    config::Config,
    mcp::{handler::call_tool, protocol::error_codes},
    standardize::{DetectedFormat, Status},
    AppState,
};

const ADDRESS: &str = "9fRAWhdxEsTcdb8PhGNrZfwqa65zfkuYHAMmkQLcic1gdLSV5vA";
const TOKEN_ID: &str = "03faf2cb329f2e90d6d23b58d91bbb6c046aa143261cc21f52fbe2824bfcbf04";
const TX_ID: &str = "ff9b418e98b1b0f1a4cd26eb5ff26bfc2b84bb7bcfa1e0e08aa1f69a2cf9d1a4";

fn test_state() -> AppState {
    let base = mockito::server_url();
    let config = Config::from_lookup(move |key| match key {
        "ERGO_EXPLORER_API" => Some(format!("{}/explorer", base)),
        "ERGO_NODE_API" => Some(format!("{}/node", base)),
        "ERGOWATCH_API_URL" => Some(format!("{}/watch", base)),
        "ERGO_NODE_API_KEY" => Some("hello".to_string()),
        "REQUEST_TIMEOUT_SECS" => Some("5".to_string()),
        _ => None,
    })
    .unwrap();
    AppState::new(config).unwrap()
}

fn hex_id(fill: char) -> String {
    std::iter::repeat(fill).take(64).collect()
}

#[tokio::test]
async fn test_address_balance_is_structured() {
    let _m = mock(
        "GET",
        format!("/explorer/addresses/{}/balance/confirmed", ADDRESS).as_str(),
    )
    .with_status(200)
    .with_header("content-type", "application/json")
    .with_body(r#"{"nanoErgs": 5000000000, "tokens": []}"#)
    .create();

    let state = test_state();
    let out = call_tool(&state, "get_address_balance", &json!({"address": ADDRESS}), &json!(1))
        .await
        .unwrap();

    assert_eq!(out.envelope.status, Status::Success);
    assert_eq!(
        out.envelope.data,
        Some(json!({"address": ADDRESS, "erg_balance": 5.0, "tokens": []}))
    );
    assert_eq!(out.envelope.metadata.format, DetectedFormat::Markdown);
    assert_eq!(
        out.text,
        format!("Balance for {}:\n• 5.000000000 ERG\n\nNo tokens found.", ADDRESS)
    );
}

#[tokio::test]
async fn test_token_holders_are_paged_and_limited() {
    let page = |range: std::ops::Range<usize>| {
        let items: Vec<Value> = range
            .map(|i| {
                json!({
                    "boxId": format!("box{}", i),
                    "value": 1000000,
                    "creationHeight": 1000,
                    "address": format!("9holder{}", i),
                    "assets": [{"tokenId": TOKEN_ID, "amount": i + 1}]
                })
            })
            .collect();
        json!({"items": items, "total": 250}).to_string()
    };
    let path = format!("/explorer/boxes/unspent/byTokenId/{}", TOKEN_ID);
    let _p0 = mock("GET", path.as_str())
        .match_query(Matcher::UrlEncoded("offset".into(), "0".into()))
        .with_body(page(0..100))
        .create();
    let _p1 = mock("GET", path.as_str())
        .match_query(Matcher::UrlEncoded("offset".into(), "100".into()))
        .with_body(page(100..200))
        .create();
    let _p2 = mock("GET", path.as_str())
        .match_query(Matcher::UrlEncoded("offset".into(), "200".into()))
        .with_body(page(200..250))
        .create();

    let state = test_state();
    let out = call_tool(&state, "get_token_holders", &json!({"token_id": TOKEN_ID}), &json!(1))
        .await
        .unwrap();

    let meta = &out.envelope.metadata;
    assert!(meta.is_truncated);
    assert_eq!(meta.original_count, Some(250));
    assert_eq!(meta.result_count, Some(100));
    let holders = out.envelope.data.unwrap();
    assert_eq!(holders.as_array().unwrap().len(), 100);
    assert_eq!(holders[0]["address"], "9holder249");
    assert_eq!(holders[0]["amount"], 250);
}

#[tokio::test]
async fn test_box_not_found_passes_through() {
    let box_id = hex_id('b');
    let _m = mock("GET", format!("/explorer/boxes/{}", box_id).as_str())
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(r#"{"status": 404, "reason": "not-found", "detail": "Box not found"}"#)
        .create();

    let state = test_state();
    let out = call_tool(&state, "get_box", &json!({"box_id": box_id}), &json!(1))
        .await
        .unwrap();

    assert_eq!(out.envelope.status, Status::Error);
    assert!(out.envelope.data.is_none());
    let error = out.envelope.error.unwrap();
    assert_eq!(error.code, 404);
    assert_eq!(error.message, "Box not found");
}

#[tokio::test]
async fn test_transaction_markdown_round_trip() {
    let body = json!({
        "id": TX_ID,
        "size": 345,
        "inputs": [{"boxId": "in1", "value": 2000000000u64, "address": ADDRESS}],
        "outputs": [{
            "boxId": "out1",
            "value": 1999000000u64,
            "address": "9fDestination",
            "assets": [{"tokenId": TOKEN_ID, "amount": 1500}]
        }]
    });
    let _m = mock("GET", format!("/explorer/transactions/{}", TX_ID).as_str())
        .with_body(body.to_string())
        .create();

    let state = test_state();
    let out = call_tool(
        &state,
        "get_transaction",
        &json!({"tx_id": TX_ID, "response_format": "json"}),
        &json!(1),
    )
    .await
    .unwrap();

    let data = out.envelope.data.clone().unwrap();
    assert_eq!(data["tx_id"], TX_ID);
    assert_eq!(data["size"], 345);
    assert_eq!(data["inputs"][0]["value"], 2.0);
    assert_eq!(data["outputs"][0]["value"], 1.999);
    assert_eq!(data["tokens_transferred"][0]["amount"], 1500);
    // json format renders the envelope itself
    let rendered: Value = serde_json::from_str(&out.text).unwrap();
    assert_eq!(rendered["data"]["tx_id"], TX_ID);
}

#[tokio::test]
async fn test_network_status_goes_through_generic_extractor() {
    let _m = mock("GET", "/explorer/networkState")
        .with_body(r#"{"lastBlockId": "abc123", "height": 1234567, "maxBoxGix": 10, "maxTxGix": 5}"#)
        .create();

    let state = test_state();
    let out = call_tool(&state, "get_network_status", &json!({}), &json!(1))
        .await
        .unwrap();

    assert_eq!(out.envelope.metadata.format, DetectedFormat::Text);
    let data = out.envelope.data.unwrap();
    assert_eq!(data["Height"], 1234567);
    assert_eq!(data["Last Block ID"], "abc123");
}

#[tokio::test]
async fn test_node_requests_carry_api_key() {
    let _m = mock("GET", "/node/info")
        .match_header("api_key", "hello")
        .with_body(r#"{"name": "ergo-node", "fullHeight": 1234567, "isMining": false}"#)
        .create();

    let state = test_state();
    let out = call_tool(&state, "get_node_info", &json!({}), &json!(1))
        .await
        .unwrap();

    assert_eq!(out.envelope.status, Status::Success);
    assert_eq!(out.envelope.metadata.format, DetectedFormat::Json);
    assert_eq!(out.envelope.data.unwrap()["fullHeight"], 1234567);
}

#[tokio::test]
async fn test_latest_blocks_respect_explicit_limit() {
    let _m = mock("GET", "/explorer/blocks")
        .match_query(Matcher::Any)
        .with_body(
            json!({
                "items": [
                    {"id": "b3", "height": 3, "timestamp": 1700000000000u64},
                    {"id": "b2", "height": 2},
                    {"id": "b1", "height": 1}
                ],
                "total": 3
            })
            .to_string(),
        )
        .create();

    let state = test_state();
    let out = call_tool(&state, "get_latest_blocks", &json!({"limit": 2}), &json!(1))
        .await
        .unwrap();

    let data = out.envelope.data.unwrap();
    assert_eq!(data["items"].as_array().unwrap().len(), 2);
    assert_eq!(data["items"][0]["id"], "b3");
    assert_eq!(data["items"][0]["timestamp"], "2023-11-14T22:13:20+00:00");
    assert_eq!(out.envelope.metadata.original_count, Some(3));
    assert!(out.text.contains("_Showing 2 of 3 results (truncated)._"));
}

#[tokio::test]
async fn test_transport_failure_becomes_502_envelope() {
    let config = Config::from_lookup(|key| match key {
        "ERGO_EXPLORER_API" => Some("http://127.0.0.1:1".to_string()),
        "REQUEST_TIMEOUT_SECS" => Some("2".to_string()),
        _ => None,
    })
    .unwrap();
    let state = AppState::new(config).unwrap();

    let out = call_tool(&state, "get_network_status", &json!({}), &json!(1))
        .await
        .unwrap();
    assert_eq!(out.envelope.status, Status::Error);
    assert_eq!(out.envelope.error.unwrap().code, 502);
}

#[tokio::test]
async fn test_invalid_arguments_are_rpc_errors() {
    let state = test_state();

    let short = call_tool(&state, "search_tokens", &json!({"query": "ab"}), &json!(1))
        .await
        .unwrap_err();
    assert_eq!(short.error.unwrap().code, error_codes::INVALID_PARAMS);

    let bad_id = call_tool(&state, "get_box", &json!({"box_id": "xyz"}), &json!(1))
        .await
        .unwrap_err();
    assert_eq!(bad_id.error.unwrap().code, error_codes::INVALID_PARAMS);

    let unknown = call_tool(&state, "get_everything", &json!({}), &json!(1))
        .await
        .unwrap_err();
    assert_eq!(unknown.error.unwrap().code, error_codes::METHOD_NOT_FOUND);
}

#[tokio::test]
async fn test_token_json_description_keeps_token_fields() {
    let token_id = hex_id('e');
    let description = r#"{"id":"spoofed","name":"Other","royalty":5}"#;
    let _m = mock("GET", format!("/explorer/tokens/{}", token_id).as_str())
        .with_body(
            json!({
                "id": token_id,
                "name": "CoolNFT",
                "decimals": 0,
                "description": description
            })
            .to_string(),
        )
        .create();

    let state = test_state();
    let out = call_tool(&state, "get_token", &json!({"token_id": token_id}), &json!(1))
        .await
        .unwrap();

    assert_eq!(out.envelope.status, Status::Success);
    let data = out.envelope.data.unwrap();
    assert_eq!(data["id"], token_id);
    assert_eq!(data["name"], "CoolNFT");
    assert_eq!(data["description"], description);
    assert!(data.get("royalty").is_none());
}

#[tokio::test]
async fn test_balance_keeps_tokens_without_names() {
    let address = "9hEQHEMyY1K1vs79vJXFtNjr2dbQbtWXF99oVWGJ5c4xbcLdBuw";
    let _m = mock(
        "GET",
        format!("/explorer/addresses/{}/balance/confirmed", address).as_str(),
    )
    .with_body(
        json!({
            "nanoErgs": 1000000000u64,
            "tokens": [
                {"tokenId": "aaaa", "amount": 5, "name": ""},
                {"tokenId": "bbbb", "amount": 7, "name": "SigUSD"}
            ]
        })
        .to_string(),
    )
    .create();

    let state = test_state();
    let out = call_tool(&state, "get_address_balance", &json!({"address": address}), &json!(1))
        .await
        .unwrap();

    let tokens = out.envelope.data.unwrap()["tokens"].clone();
    assert_eq!(tokens.as_array().unwrap().len(), 2);
    assert_eq!(tokens[0]["name"], "Unknown");
    assert_eq!(tokens[0]["id"], "aaaa");
    assert_eq!(tokens[1]["name"], "SigUSD");
    assert_eq!(tokens[1]["amount"], 7.0);
}
