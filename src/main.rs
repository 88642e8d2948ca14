// src/main.rs

use axum::Router;
use ergo_mcp_server::{
    api::create_api_router,
    config::Config,
    mcp::{
        handler::handle_mcp_request,
        protocol::{error_codes, Request, Response},
    },
    AppState,
};
use std::env;
use std::net::SocketAddr;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// --- HTTP Server Logic ---
async fn run_http_server(state: AppState) -> anyhow::Result<()> {
    let app = Router::new()
        .nest("/api", create_api_router())
        .with_state(state.clone())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([127, 0, 0, 1], state.config.port));
    info!("🚀 HTTP Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
    Ok(())
}

// --- MCP Server Logic ---
async fn run_mcp_server(state: AppState) {
    info!("🚀 Starting MCP server on stdin/stdout...");

    let mut stdin = io::BufReader::new(io::stdin());
    let mut stdout = io::stdout();

    loop {
        let mut line = String::new();

        match stdin.read_line(&mut line).await {
            Ok(0) => {
                info!("EOF received, shutting down MCP server");
                break;
            }
            Ok(_) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                debug!("Received: {}", line);

                let response = match serde_json::from_str::<Request>(line) {
                    Ok(request) => handle_mcp_request(request, state.clone()).await,
                    Err(parse_error) => {
                        error!("JSON parse error: {}", parse_error);
                        Some(Response::error(
                            serde_json::Value::Null,
                            error_codes::PARSE_ERROR,
                            format!("Parse error: {}", parse_error),
                        ))
                    }
                };

                if let Some(response) = response {
                    if let Ok(response_json) = serde_json::to_string(&response) {
                        debug!("Sending: {}", response_json);
                        let written = async {
                            stdout.write_all(response_json.as_bytes()).await?;
                            stdout.write_all(b"\n").await?;
                            stdout.flush().await
                        };
                        if let Err(e) = written.await {
                            error!("Failed to write response: {}", e);
                            break;
                        }
                    }
                }
            }
            Err(e) => {
                error!("Failed to read from stdin: {}", e);
                break;
            }
        }
    }

    info!("MCP server shutting down");
}

#[tokio::main]
async fn main() {
    // Logs go to stderr; stdout carries the MCP protocol
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ergo_mcp_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("❌ Failed to load configuration: {:#}", e);
            return;
        }
    };

    let app_state = match AppState::new(config) {
        Ok(state) => state,
        Err(e) => {
            error!("❌ Failed to initialize application state: {:#}", e);
            return;
        }
    };
    info!(
        "Explorer: {}, node: {}, ErgoWatch: {}",
        app_state.config.explorer_api_url,
        app_state.config.node_api_url,
        app_state.config.ergowatch_api_url
    );

    // Check if running in MCP mode (stdin/stdout) or HTTP server mode
    let args: Vec<String> = env::args().collect();
    if args.iter().any(|arg| arg == "--mcp") || env::var("MCP_MODE").is_ok() {
        run_mcp_server(app_state).await;
    } else if let Err(e) = run_http_server(app_state).await {
        error!("❌ HTTP server failed: {:#}", e);
    }
}
