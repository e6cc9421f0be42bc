mod api;
mod gemini;
mod langsearch;
mod pipeline;
mod text;

pub const USER_AGENT: &str = concat!("beacon/", env!("CARGO_PKG_VERSION"));

use std::time::Duration;

use clap::Parser;
use reqwest::Client;
use tracing::{info, warn};

use api::AppState;
use gemini::GeminiClient;
use langsearch::LangSearchClient;

/// TCP connection establishment timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Global HTTP client timeout; individual upstream calls set tighter
/// per-request bounds.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Parser)]
#[command(
    name = "beacon",
    about = "Search proxy with semantic reranking and LLM summarization"
)]
struct Args {
    /// Address to bind.
    #[arg(long, default_value = "127.0.0.1")]
    bind: String,
    /// Port to listen on.
    #[arg(long, default_value_t = 3000)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("beacon=info".parse()?),
        )
        .init();

    let args = Args::parse();

    let http = Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(HTTP_TIMEOUT)
        .build()?;

    let langsearch = LangSearchClient::from_env(http.clone())
        .inspect_err(|e| warn!("search client not available: {e}"))
        .ok();
    let gemini = GeminiClient::from_env(http)
        .inspect_err(|e| warn!("summarizer not available: {e}"))
        .ok();

    let state = AppState { langsearch, gemini };
    let addr = format!("{}:{}", args.bind, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "beacon listening");

    axum::serve(listener, api::create_router(state)).await?;
    Ok(())
}
