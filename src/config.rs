//! Operator configuration.
//!
//! Flags provide the defaults; a non-empty environment variable overrides its
//! flag. Values that cannot be parsed stop startup with an error.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tracing::Level;
use vigil_healthchecks::HealthchecksConfig;
use vigil_reconciler::{LoopConfig, ReconcilerConfig};

use crate::cli::RunArgs;

/// Overrides `--log-level`.
pub const LOG_LEVEL_ENV: &str = "OPERATOR_LOG_LEVEL";
/// Overrides `--development`.
pub const DEVELOPMENT_ENV: &str = "OPERATOR_DEVELOPMENT";
/// Overrides `--name-prefix`.
pub const NAME_PREFIX_ENV: &str = "OPERATOR_NAME_PREFIX";
/// Overrides `--reconcile-interval`.
pub const RECONCILE_INTERVAL_ENV: &str = "OPERATOR_RECONCILE_INTERVAL";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable or flag holds an unusable value.
    #[error("invalid value '{value}' for {name}: {reason}")]
    InvalidValue {
        name: String,
        value: String,
        reason: String,
    },

    /// No API key was provided.
    #[error("{0} must be set")]
    MissingApiKey(&'static str),

    /// The client configuration could not be loaded.
    #[error(transparent)]
    Healthchecks(#[from] vigil_healthchecks::Error),
}

impl ConfigError {
    fn invalid(name: &str, value: &str, reason: impl ToString) -> Self {
        Self::InvalidValue {
            name: name.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Logging settings shared by every command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Default level when `RUST_LOG` is not set.
    pub level: Level,
    /// Human-oriented output at debug level.
    pub development: bool,
}

impl LogConfig {
    /// Resolve logging settings from flags and the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for an unknown level or a
    /// non-boolean development flag.
    pub fn resolve<F>(level: &str, development: bool, lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let level = override_string(lookup, LOG_LEVEL_ENV, level.to_string());
        let development = match non_empty(lookup, DEVELOPMENT_ENV) {
            Some(value) => parse_bool(DEVELOPMENT_ENV, &value)?,
            None => development,
        };

        Ok(Self {
            level: parse_level(&level)?,
            development,
        })
    }
}

/// Everything `vigil run` needs.
#[derive(Debug, Clone)]
pub struct OperatorConfig {
    /// Manifest declaring the desired checks.
    pub manifest: PathBuf,
    /// Where records, finalizers and status are persisted.
    pub state_file: PathBuf,
    /// How often the manifest is re-read.
    pub manifest_poll_interval: Duration,
    /// Reconciler settings.
    pub reconciler: ReconcilerConfig,
    /// Loop settings.
    pub reconciliation: LoopConfig,
    /// Client settings.
    pub healthchecks: HealthchecksConfig,
}

impl OperatorConfig {
    /// Resolve the run configuration from flags and the process environment.
    ///
    /// # Errors
    ///
    /// See [`OperatorConfig::resolve`].
    pub fn from_args(args: &RunArgs) -> Result<Self, ConfigError> {
        Self::resolve(args, &|key| std::env::var(key).ok())
    }

    /// Resolve the run configuration from flags and `lookup`.
    ///
    /// # Errors
    ///
    /// Returns an error for an unparseable override, a zero interval or
    /// concurrency, or a missing API key.
    pub fn resolve<F>(args: &RunArgs, lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let requeue_after = match non_empty(lookup, RECONCILE_INTERVAL_ENV) {
            Some(value) => humantime::parse_duration(&value)
                .map_err(|e| ConfigError::invalid(RECONCILE_INTERVAL_ENV, &value, e))?,
            None => args.reconcile_interval,
        };
        if requeue_after.is_zero() {
            return Err(ConfigError::invalid(
                "reconcile interval",
                "0s",
                "must be greater than zero",
            ));
        }
        if args.max_concurrent == 0 {
            return Err(ConfigError::invalid("--max-concurrent", "0", "must be at least 1"));
        }
        if args.manifest_poll_interval.is_zero() {
            return Err(ConfigError::invalid(
                "--manifest-poll-interval",
                "0s",
                "must be greater than zero",
            ));
        }

        let state_file = args
            .state_file
            .clone()
            .unwrap_or_else(|| default_state_file(&args.manifest));

        Ok(Self {
            manifest: args.manifest.clone(),
            state_file,
            manifest_poll_interval: args.manifest_poll_interval,
            reconciler: ReconcilerConfig {
                requeue_after,
                name_prefix: override_string(lookup, NAME_PREFIX_ENV, args.name_prefix.clone()),
            },
            reconciliation: LoopConfig {
                max_concurrent: args.max_concurrent,
                ..LoopConfig::default()
            },
            healthchecks: healthchecks_config(lookup)?,
        })
    }
}

/// Client configuration with a mandatory API key.
///
/// # Errors
///
/// Returns [`ConfigError::MissingApiKey`] if no key is set, or the client's
/// own parse error.
pub fn healthchecks_config<F>(lookup: &F) -> Result<HealthchecksConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let config = HealthchecksConfig::from_lookup(lookup)?;
    if config.api_key.is_empty() {
        return Err(ConfigError::MissingApiKey(vigil_healthchecks::config::API_KEY_ENV));
    }
    Ok(config)
}

/// `<manifest>.state.json` next to the manifest.
fn default_state_file(manifest: &std::path::Path) -> PathBuf {
    let mut name = manifest.file_name().unwrap_or_default().to_os_string();
    name.push(".state.json");
    manifest.with_file_name(name)
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|v| !v.is_empty())
}

fn override_string<F>(lookup: &F, key: &str, default: String) -> String
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup, key).unwrap_or(default)
}

fn parse_bool(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "t" | "true" | "yes" => Ok(true),
        "0" | "f" | "false" | "no" => Ok(false),
        _ => Err(ConfigError::invalid(name, value, "expected true or false")),
    }
}

fn parse_level(value: &str) -> Result<Level, ConfigError> {
    value
        .parse::<Level>()
        .map_err(|e| ConfigError::invalid("log level", value, e))
}
