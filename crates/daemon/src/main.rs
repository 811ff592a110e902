use anyhow::Result;
use clap::Parser;
use grants_core::tracing::{config::InstrumentationConfig, init::init_tracing};
use grants_daemon::{ServerBuilder, Settings, server};
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Grants daemon - snippet permission service
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let settings = Settings::load(cli.config.as_deref())?;

    let instrumentation_config = InstrumentationConfig {
        service_name: "grants".to_string(),
        service_version: env!("CARGO_PKG_VERSION").to_string(),
        log_level: settings.logging.level.clone(),
        json: settings.logging.json,
    };
    init_tracing(&instrumentation_config)?;

    if let Some(path) = &cli.config {
        info!("Loaded configuration from: {}", path.display());
    }

    let builder = ServerBuilder::new(settings);
    let router = builder.build().await?;

    let address = builder.settings().bind_address();
    let listener = TcpListener::bind(&address).await?;
    server::serve(router, listener, shutdown_signal()).await?;

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received shutdown signal"),
        Err(e) => error!("Failed to listen for shutdown signal: {}", e),
    }
}
