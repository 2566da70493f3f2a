// Neri entry point
// Console REPL by default, or a one-shot run of a saved update.

use anyhow::{bail, Context, Result};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use neri_core::brain::ReplyEngine;
use neri_core::config::Settings;
use neri_core::handler::UpdateHandler;
use neri_core::models::InboundMessage;
use neri_core::services::{ConsoleChannel, DeliveryChannel, OpenWeatherClient, TelegramChannel};

const USAGE: &str = "usage: neri [update <file.json>]";

/// Logs go to stderr so console replies stay clean on stdout.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("NERI_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(JsonStorageLayer)
            .with(BunyanFormattingLayer::new("neri".into(), std::io::stderr))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env may carry RUST_LOG and NERI_LOG_FORMAT, so load it before the subscriber
    let _ = dotenv::dotenv();
    init_tracing();
    let settings = Settings::from_env().context("Failed to load settings")?;
    info!("Neri starting v{}", env!("CARGO_PKG_VERSION"));

    let weather = OpenWeatherClient::new(&settings.weather, settings.http_timeout())
        .context("Failed to build the weather client")?;
    let engine = Arc::new(ReplyEngine::new(&settings, Arc::new(weather))?);

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        None => run_console(engine).await,
        Some("update") => {
            let path = args.get(1).context(USAGE)?;
            run_update(engine, &settings, path).await
        }
        Some(other) => bail!("unknown command '{}'; {}", other, USAGE),
    }
}

/// Reads lines from stdin and answers each as if it came from a chat.
async fn run_console(engine: Arc<ReplyEngine>) -> Result<()> {
    let handler = UpdateHandler::new(engine, Arc::new(ConsoleChannel::new()));
    info!("Console mode: address me as \"Нері, ...\"; Ctrl-D to quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if handler.handle_message(&InboundMessage::console(line)).await.is_none() {
            info!("(no reply)");
        }
    }
    Ok(())
}

/// Runs one saved update through the handler and delivers the reply.
async fn run_update(engine: Arc<ReplyEngine>, settings: &Settings, path: &str) -> Result<()> {
    let payload = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read update from {}", path))?;

    let channel: Arc<dyn DeliveryChannel> =
        match TelegramChannel::new(&settings.telegram, settings.http_timeout()) {
            Ok(channel) => Arc::new(channel),
            Err(e) => {
                warn!(error = %e, "Telegram delivery unavailable, printing the reply instead");
                Arc::new(ConsoleChannel::new())
            }
        };

    UpdateHandler::new(engine, channel)
        .handle(&payload)
        .await
        .context("Failed to handle the update")?;
    Ok(())
}
