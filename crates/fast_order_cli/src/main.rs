//! Fast Order CLI - one-shot order generation
//!
//! Reads the menu and the current order list from files (or stdin), picks a
//! mode from what was supplied unless one is given, and prints the updated
//! list ready to paste.

use clap::Parser;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use fast_order::{
    BreakerConfig, CallContext, GenerationRequest, LlmConfig, Mode, ResilientLlm,
};

#[derive(Parser, Debug)]
#[command(name = "fast_order")]
#[command(about = "Append your lunch order to the group order list")]
struct Args {
    /// Menu file
    #[arg(long)]
    menu: Option<PathBuf>,

    /// Current orders file, or "-" for stdin
    #[arg(long)]
    orders: Option<PathBuf>,

    /// normal, nitro or first-touch (detected from the inputs when omitted)
    #[arg(long)]
    mode: Option<String>,

    /// Model to use
    #[arg(short, long, env = "LLM_MODEL", default_value = "gpt-4o-mini")]
    model: String,

    /// Backend LLM URL
    #[arg(short = 'u', long, env = "LLM_BASE_URL", default_value = "https://api.openai.com/v1")]
    backend_url: String,

    /// Backend API key
    #[arg(short = 'k', long, env = "LLM_API_KEY", default_value = "", hide_env_values = true)]
    backend_key: String,

    /// Time budget in seconds
    #[arg(long, default_value = "30")]
    timeout_secs: u64,

    /// Log the prompt and timings
    #[arg(short, long)]
    verbose: bool,
}

fn read_input(path: &Path) -> io::Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path)
    }
}

/// An input that was not given reads as empty
fn read_optional(path: Option<&Path>) -> io::Result<String> {
    match path {
        Some(p) => read_input(p),
        None => Ok(String::new()),
    }
}

fn display_path(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string()).unwrap_or_default()
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let menu = match read_optional(args.menu.as_deref()) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Failed to read menu '{}': {}", display_path(args.menu.as_deref()), e);
            std::process::exit(1);
        }
    };
    let orders = match read_optional(args.orders.as_deref()) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Failed to read orders '{}': {}", display_path(args.orders.as_deref()), e);
            std::process::exit(1);
        }
    };

    let mode = match args.mode.as_deref() {
        Some(name) => Mode::parse(name),
        None => Mode::detect(&menu, &orders),
    };
    tracing::debug!(%mode, "mode selected");

    let request = GenerationRequest::new(mode)
        .with_menu(menu)
        .with_current_orders(orders);
    if let Err(e) = request.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(2);
    }

    let config = LlmConfig::new(&args.model)
        .with_api_key(&args.backend_key)
        .with_base_url(&args.backend_url);
    let llm = match ResilientLlm::from_config(&config, BreakerConfig::default()) {
        Ok(llm) => llm,
        Err(e) => {
            eprintln!("Failed to create LLM client: {}", e);
            std::process::exit(1);
        }
    };

    // Ctrl+C aborts the in-flight request instead of waiting for the timeout.
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let ctx = CallContext::with_timeout(Duration::from_secs(args.timeout_secs))
        .with_cancellation(cancel);

    match llm.generate_order(&ctx, &request).await {
        Ok(message) => println!("{}", message),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
