//! # vigil - operator entry point
//!
//! ## Commands
//!
//! - `run` - reconcile the manifest against healthchecks.io until Ctrl+C
//! - `validate` - check a manifest without touching the API
//! - `channels` - list the project's notification channels
//!
//! ## Error Handling
//!
//! Startup failures, including unparseable flag or environment values, halt
//! with a non-zero exit and the full error chain.

#![forbid(unsafe_code)]
#![forbid(clippy::unwrap_used)]
#![forbid(clippy::panic)]
#![deny(clippy::expect_used)]

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use vigil::cli::{Cli, Commands};
use vigil::config::{LogConfig, OperatorConfig, healthchecks_config};
use vigil::operator;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log = LogConfig::resolve(&cli.log_level, cli.development, &|key| std::env::var(key).ok())
        .context("invalid logging configuration")?;
    init_tracing(&log);

    match cli.command {
        Commands::Run(args) => {
            let config = OperatorConfig::from_args(&args).context("invalid configuration")?;
            operator::run(config, wait_for_shutdown()).await
        }
        Commands::Validate { manifest } => {
            let checks = operator::validate(&manifest)?;
            for check in &checks {
                println!("{}", check.key());
            }
            info!(count = checks.len(), "manifest is valid");
            Ok(())
        }
        Commands::Channels => {
            let config = healthchecks_config(&|key| std::env::var(key).ok())
                .context("invalid configuration")?;
            for channel in operator::list_channels(config).await? {
                println!("{}\t{}\t{}", channel.id, channel.kind, channel.name);
            }
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter.
///
/// `RUST_LOG` wins over the configured level; development mode logs pretty
/// output at debug level.
fn init_tracing(log: &LogConfig) {
    let default_level = if log.development {
        tracing::Level::DEBUG
    } else {
        log.level
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.to_string().to_lowercase()));

    let registry = tracing_subscriber::registry().with(filter);
    if log.development {
        registry.with(tracing_subscriber::fmt::layer().pretty()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Wait for shutdown signal (Ctrl+C).
async fn wait_for_shutdown() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, initiating graceful shutdown"),
        Err(err) => error!("Failed to listen for shutdown signal: {}", err),
    }
}
