//! CLI command definitions using clap.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

/// vigil - heartbeat checks as declared state
#[derive(Parser, Debug)]
#[command(name = "vigil")]
#[command(version)]
#[command(about = "Keeps healthchecks.io checks in sync with declared Check manifests")]
#[command(
    long_about = "vigil reads Check records from a YAML manifest and creates, updates and deletes the matching healthchecks.io checks, recording the observed status in a local state file."
)]
pub struct Cli {
    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Human-readable debug output
    #[arg(long, global = true, default_value_t = false)]
    pub development: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reconcile the manifest against healthchecks.io until interrupted
    Run(RunArgs),

    /// Parse and validate a manifest without contacting the API
    Validate {
        /// Manifest file with one or more Check documents
        #[arg(short, long)]
        manifest: PathBuf,
    },

    /// List the notification channels of the project
    Channels,
}

/// Arguments of `vigil run`.
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Manifest file with one or more Check documents
    #[arg(short, long)]
    pub manifest: PathBuf,

    /// State file (defaults to `<manifest>.state.json`)
    #[arg(long)]
    pub state_file: Option<PathBuf>,

    /// Delay between passes over a healthy check
    #[arg(long, default_value = "1m", value_parser = humantime::parse_duration)]
    pub reconcile_interval: Duration,

    /// Prefix for external check names, unique per installation
    #[arg(long, default_value = "")]
    pub name_prefix: String,

    /// How often the manifest is re-read
    #[arg(long, default_value = "10s", value_parser = humantime::parse_duration)]
    pub manifest_poll_interval: Duration,

    /// Maximum checks reconciled at once
    #[arg(long, default_value_t = 4)]
    pub max_concurrent: usize,
}
