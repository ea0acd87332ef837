//! Fast Order Server - order formatting API

use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use fast_order::{BreakerConfig, LlmConfig, ResilientLlm};
use fast_order_server::{router, AppState};

/// Fast Order Server - appends your lunch order to the group list
#[derive(Parser, Debug)]
#[command(name = "fast-order-server")]
#[command(about = "Run the lunch order formatting API")]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "8080")]
    port: u16,

    /// API key for the model endpoint
    #[arg(short = 'k', long, env = "LLM_API_KEY", default_value = "", hide_env_values = true)]
    api_key: String,

    /// Base URL of an OpenAI-compatible API (e.g. http://localhost:11434/v1 for Ollama)
    #[arg(short = 'u', long, env = "LLM_BASE_URL", default_value = "https://api.openai.com/v1")]
    base_url: String,

    /// Model to use for completions
    #[arg(short, long, env = "LLM_MODEL", default_value = "gpt-4o-mini")]
    model: String,

    /// Time budget for each generation, in seconds
    #[arg(long, default_value = "30")]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> fast_order::Result<()> {
    // A missing .env file is fine; the environment may already be set.
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    if args.api_key.is_empty() {
        tracing::warn!("LLM_API_KEY is not set; requests to the model endpoint may be refused");
    }

    let llm_config = LlmConfig::new(&args.model)
        .with_api_key(&args.api_key)
        .with_base_url(&args.base_url);
    let llm = ResilientLlm::from_config(&llm_config, BreakerConfig::default())?;

    let state = Arc::new(AppState::new(llm, Duration::from_secs(args.timeout_secs)));
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    tracing::info!("Server starting on {}", addr);
    tracing::info!("Model: {}", args.model);
    tracing::info!("Backend URL: {}", args.base_url);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
