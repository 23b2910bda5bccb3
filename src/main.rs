//! og-reflector
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────┐
//!                        │                 OG REFLECTOR                  │
//!   Crawler / Browser    │  ┌─────────┐    ┌───────────┐                 │
//!   ─────────────────────┼─▶│  http   │───▶│ reflector │── GET ──────────┼──▶ Upstream
//!                        │  │ server  │    │  upstream │◀── HTML ────────┼─── origin
//!                        │  └─────────┘    └─────┬─────┘                 │
//!                        │                       ▼                       │
//!                        │                 ┌───────────┐                 │
//!                        │                 │  scanner  │ og:* + theme    │
//!                        │                 └─────┬─────┘                 │
//!                        │                       ▼                       │
//!   Redirect page        │  ┌─────────┐    ┌───────────┐                 │
//!   ◀────────────────────┼──│response │◀───│   page    │                 │
//!                        │  └─────────┘    └───────────┘                 │
//!                        └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use og_reflector::config::{load_config, validate_config, ConfigError, ReflectorConfig};
use og_reflector::lifecycle;
use og_reflector::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "og-reflector")]
#[command(about = "Reflects upstream pages as Open Graph redirect pages", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Validate the configuration and exit.
    #[arg(long)]
    check: bool,
}

fn resolve_config(cli: &Cli) -> Result<ReflectorConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ReflectorConfig::default(),
    };
    if let Some(bind) = &cli.bind {
        config.listener.bind_address = bind.clone();
        validate_config(&config).map_err(ConfigError::Validation)?;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    if cli.check {
        println!("configuration OK");
        return Ok(());
    }

    init_logging(&config.observability);
    tracing::info!("og-reflector v{} starting", env!("CARGO_PKG_VERSION"));

    lifecycle::run(config).await?;
    Ok(())
}
