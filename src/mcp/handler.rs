//! # MCP Handler Module
//!
//! Implements the Model Context Protocol for the Ergo server. Requests are
//! dispatched to the tool services and every tool result is passed through the
//! response standardizer before it is returned.
//!
//! ## Supported Tools
//!
//! ### Addresses
//! - `get_address_balance` - Confirmed ERG and token balance
//! - `get_address_transactions` - Transaction history
//! - `get_address_rank` - Rich-list rank (ErgoWatch)
//!
//! ### Transactions and boxes
//! - `get_transaction` - Transaction details
//! - `get_box` - Box details
//! - `get_mempool` - Unconfirmed transactions (node)
//!
//! ### Tokens
//! - `get_token` - Token details
//! - `search_tokens` - Search tokens by name or id
//! - `get_token_holders` - Holder distribution from unspent boxes
//!
//! ### Network
//! - `get_latest_blocks`, `get_network_status`, `get_node_info`, `get_rich_list`

use std::time::Instant;

use serde_json::{json, Map, Value};
use tracing::{error, info};
use validator::Validate;

use crate::{
    blockchain::{
        client::UpstreamResponse,
        services::{address, analytics, boxes, network, token, transaction},
    },
    config::ResponseConfig,
    mcp::protocol::{
        error_codes, tool_result, Request, Response, ToolCallParams, PROTOCOL_VERSION,
        SERVER_NAME, SERVER_VERSION,
    },
    standardize::{ResponseFormat, StandardizeRequest, Standardized},
    utils, AppState,
};

/// Upper bound for upstream page sizes when the configured limit is "unlimited".
const MAX_FETCH_LIMIT: u64 = 500;

struct ToolSpec {
    name: &'static str,
    description: &'static str,
    /// (name, JSON type, description)
    params: &'static [(&'static str, &'static str, &'static str)],
    required: &'static [&'static str],
}

const ADDRESS_PARAM: (&str, &str, &str) = ("address", "string", "Ergo address (base58).");

const TOOLS: &[ToolSpec] = &[
    ToolSpec {
        name: "get_address_balance",
        description: "Get the confirmed ERG balance and tokens held by an address.",
        params: &[ADDRESS_PARAM],
        required: &["address"],
    },
    ToolSpec {
        name: "get_address_transactions",
        description: "List recent transactions of an address.",
        params: &[
            ADDRESS_PARAM,
            ("offset", "integer", "Number of transactions to skip."),
        ],
        required: &["address"],
    },
    ToolSpec {
        name: "get_transaction",
        description: "Get inputs, outputs and token transfers of a transaction.",
        params: &[("tx_id", "string", "Transaction id (64 hex characters).")],
        required: &["tx_id"],
    },
    ToolSpec {
        name: "get_box",
        description: "Get value, creation height, ErgoTree and tokens of a box.",
        params: &[("box_id", "string", "Box id (64 hex characters).")],
        required: &["box_id"],
    },
    ToolSpec {
        name: "get_token",
        description: "Get name, decimals and description of a token.",
        params: &[("token_id", "string", "Token id (64 hex characters).")],
        required: &["token_id"],
    },
    ToolSpec {
        name: "search_tokens",
        description: "Search tokens by name or id fragment.",
        params: &[
            ("query", "string", "Search text, at least 3 characters."),
            ("offset", "integer", "Number of results to skip."),
        ],
        required: &["query"],
    },
    ToolSpec {
        name: "get_token_holders",
        description: "Aggregate the unspent boxes holding a token into a ranked holder list.",
        params: &[("token_id", "string", "Token id (64 hex characters).")],
        required: &["token_id"],
    },
    ToolSpec {
        name: "get_latest_blocks",
        description: "List the most recent blocks.",
        params: &[],
        required: &[],
    },
    ToolSpec {
        name: "get_network_status",
        description: "Current height and last block id of the Ergo network.",
        params: &[],
        required: &[],
    },
    ToolSpec {
        name: "get_node_info",
        description: "Information reported by the configured Ergo node.",
        params: &[],
        required: &[],
    },
    ToolSpec {
        name: "get_mempool",
        description: "Unconfirmed transactions in the node mempool.",
        params: &[],
        required: &[],
    },
    ToolSpec {
        name: "get_rich_list",
        description: "Addresses with the largest ERG balances (ErgoWatch).",
        params: &[],
        required: &[],
    },
    ToolSpec {
        name: "get_address_rank",
        description: "Rich-list rank of an address (ErgoWatch).",
        params: &[ADDRESS_PARAM],
        required: &["address"],
    },
];

pub fn is_tool(name: &str) -> bool {
    TOOLS.iter().any(|tool| tool.name == name)
}

/// This is the main dispatcher for all incoming MCP requests.
pub async fn handle_mcp_request(req: Request, state: AppState) -> Option<Response> {
    info!("Handling MCP request for method: {}", req.method);

    if req.is_notification() {
        return None;
    }

    let response = match req.method.as_str() {
        "initialize" => handle_initialize(&req),
        "ping" => Response::success(req.id, json!({})),
        "tools/list" => handle_tools_list(&req),
        "tools/call" => handle_tool_call(req, state).await,
        // Direct method calls are rewritten into tools/call to reuse the same logic
        method if is_tool(method) => handle_tool_call(req.into_tool_call(), state).await,
        _ => Response::error(
            req.id,
            error_codes::METHOD_NOT_FOUND,
            format!("Method not found: {}", req.method),
        ),
    };

    Some(response)
}

/// Handles a 'tools/call' request by dispatching it to the correct tool logic.
async fn handle_tool_call(req: Request, state: AppState) -> Response {
    let params: ToolCallParams = match req.params.clone().map(serde_json::from_value) {
        Some(Ok(params)) => params,
        _ => {
            return Response::error(
                req.id,
                error_codes::INVALID_PARAMS,
                "Missing or invalid 'params': expected {name, arguments}".into(),
            )
        }
    };

    match call_tool(&state, &params.name, &params.arguments, &req.id).await {
        Ok(standardized) => Response::success(req.id, tool_result(&standardized)),
        Err(err_resp) => err_resp,
    }
}

/// Per-call presentation options shared by every tool.
#[derive(Debug, Clone, Default)]
pub struct ToolOptions {
    pub format: Option<ResponseFormat>,
    pub model: Option<String>,
    pub limit: Option<i64>,
}

impl ToolOptions {
    pub fn from_args(args: &Value, req_id: &Value) -> Result<Self, Response> {
        let format = match utils::get_optional_arg::<String>(args, "response_format", req_id)? {
            Some(raw) => Some(ResponseFormat::parse(&raw).ok_or_else(|| {
                Response::error(
                    req_id.clone(),
                    error_codes::INVALID_PARAMS,
                    format!("Unsupported response_format '{}': use json or markdown", raw),
                )
            })?),
            None => None,
        };
        Ok(ToolOptions {
            format,
            model: utils::get_optional_arg(args, "model_type", req_id)?,
            limit: utils::get_optional_arg(args, "limit", req_id)?,
        })
    }
}

/// Run one tool and standardize its result. `Err` carries a JSON-RPC error
/// for argument problems; upstream and transport failures come back as
/// error envelopes inside `Ok`.
pub async fn call_tool(
    state: &AppState,
    name: &str,
    args: &Value,
    req_id: &Value,
) -> Result<Standardized, Response> {
    let options = ToolOptions::from_args(args, req_id)?;
    let started_at = Instant::now();
    let category = ResponseConfig::category_for(name);
    let fetch_limit = match state.standardizer.config().resolve_limit(options.limit, category) {
        n if n <= 0 => MAX_FETCH_LIMIT,
        n => (n as u64).min(MAX_FETCH_LIMIT),
    };
    let client = &state.client;

    let outcome = match name {
        "get_address_balance" => {
            let addr = required_address(args, req_id)?;
            address::get_address_balance(client, &addr).await
        }
        "get_address_transactions" => {
            let addr = required_address(args, req_id)?;
            let offset = utils::get_optional_arg::<u64>(args, "offset", req_id)?.unwrap_or(0);
            address::get_address_transactions(client, &addr, offset, fetch_limit).await
        }
        "get_transaction" => {
            let tx_id = required_hex_id(args, "tx_id", req_id)?;
            transaction::get_transaction(client, &tx_id).await
        }
        "get_box" => {
            let box_id = required_hex_id(args, "box_id", req_id)?;
            boxes::get_box(client, &box_id).await
        }
        "get_token" => {
            let token_id = required_hex_id(args, "token_id", req_id)?;
            token::get_token(client, &token_id).await
        }
        "search_tokens" => {
            let search: token::TokenSearch = serde_json::from_value(args.clone()).map_err(|_| {
                Response::error(
                    req_id.clone(),
                    error_codes::INVALID_PARAMS,
                    "Missing or invalid required argument: 'query'".into(),
                )
            })?;
            search.validate().map_err(|e| {
                Response::error(
                    req_id.clone(),
                    error_codes::INVALID_PARAMS,
                    format!("Invalid arguments: {}", e),
                )
            })?;
            token::search_tokens(client, &search, fetch_limit).await
        }
        "get_token_holders" => {
            let token_id = required_hex_id(args, "token_id", req_id)?;
            token::get_token_holders(
                client,
                &token_id,
                state.config.holders_page_size,
                state.config.holders_max_pages,
            )
            .await
        }
        "get_latest_blocks" => network::get_latest_blocks(client, fetch_limit).await,
        "get_network_status" => network::get_network_status(client).await,
        "get_node_info" => network::get_node_info(client).await,
        "get_mempool" => network::get_mempool(client, fetch_limit).await,
        "get_rich_list" => analytics::get_rich_list(client, fetch_limit).await,
        "get_address_rank" => {
            let addr = required_address(args, req_id)?;
            analytics::get_address_rank(client, &addr).await
        }
        _ => {
            return Err(Response::error(
                req_id.clone(),
                error_codes::METHOD_NOT_FOUND,
                format!("Tool not found: {}", name),
            ))
        }
    };

    let upstream = outcome.unwrap_or_else(|e| {
        error!("Tool {} failed before a response was received: {:#}", name, e);
        UpstreamResponse::transport_failure(format!("{:#}", e))
    });

    let request = StandardizeRequest::new(name, upstream.payload, upstream.status)
        .format(options.format)
        .model(options.model)
        .limit(options.limit)
        .category(category)
        .started_at(started_at);
    Ok(state.standardizer.standardize(request))
}

fn required_address(args: &Value, req_id: &Value) -> Result<String, Response> {
    let addr = utils::get_required_arg::<String>(args, "address", req_id)?;
    let addr = addr.trim().to_string();
    if !utils::is_plausible_address(&addr) {
        return Err(Response::error(
            req_id.clone(),
            error_codes::INVALID_PARAMS,
            format!("'{}' is not a valid Ergo address", addr),
        ));
    }
    Ok(addr)
}

fn required_hex_id(args: &Value, key: &str, req_id: &Value) -> Result<String, Response> {
    let id = utils::get_required_arg::<String>(args, key, req_id)?;
    let id = id.trim().to_ascii_lowercase();
    if !utils::is_hex_id(&id) {
        return Err(Response::error(
            req_id.clone(),
            error_codes::INVALID_PARAMS,
            format!("'{}' must be a 64-character hex id", key),
        ));
    }
    Ok(id)
}

/// Handles the 'initialize' request.
fn handle_initialize(req: &Request) -> Response {
    let server_info = json!({
        "name": SERVER_NAME,
        "version": SERVER_VERSION
    });
    let capabilities = json!({ "tools": { "listChanged": false } });
    let instructions = "Ergo blockchain MCP server. Every tool returns a standardized envelope \
        (status, data, metadata) and accepts response_format, model_type and limit.";

    Response::success(
        req.id.clone(),
        json!({
            "serverInfo": server_info,
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": capabilities,
            "instructions": instructions
        }),
    )
}

/// Handles the 'tools/list' request by returning a JSON definition of all available tools.
fn handle_tools_list(req: &Request) -> Response {
    let tools: Vec<Value> = TOOLS.iter().map(tool_definition).collect();
    Response::success(req.id.clone(), json!({ "tools": tools }))
}

fn tool_definition(tool: &ToolSpec) -> Value {
    let mut properties = Map::new();
    for (name, kind, description) in tool.params {
        properties.insert(
            name.to_string(),
            json!({ "type": kind, "description": description }),
        );
    }
    properties.insert(
        "response_format".to_string(),
        json!({
            "type": "string",
            "enum": ["markdown", "json"],
            "description": "Output format of the text content (default from server config)."
        }),
    );
    properties.insert(
        "model_type".to_string(),
        json!({"type": "string", "description": "Model family used for token estimates, e.g. claude or gpt-4."}),
    );
    properties.insert(
        "limit".to_string(),
        json!({"type": "integer", "description": "Maximum number of list items returned; 0 or below means no limit."}),
    );

    json!({
        "name": tool.name,
        "description": tool.description,
        "inputSchema": {
            "type": "object",
            "properties": properties,
            "required": tool.required,
            "additionalProperties": false
        }
    })
}
