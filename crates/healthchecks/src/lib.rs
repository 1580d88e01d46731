#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

//! # vigil-healthchecks
//!
//! Client for the [healthchecks.io](https://healthchecks.io) management API.
//!
//! ## Features
//!
//! - List notification channels
//! - Create or update checks idempotently (upsert keyed by name)
//! - List and delete checks
//! - 404 on delete is distinguishable via [`Error::is_not_found`]
//!
//! ## Example
//!
//! ```ignore
//! use vigil_healthchecks::{Healthcheck, HealthchecksClient, HealthchecksConfig};
//!
//! let client = HealthchecksClient::with_config(HealthchecksConfig::from_env()?)?;
//! let channels = client.list_channels().await?;
//! let check = client
//!     .create(&Healthcheck {
//!         name: "ops/nightly-backup".into(),
//!         unique: vec!["name".into()],
//!         ..Default::default()
//!     })
//!     .await?;
//! println!("ping {}", check.ping_url);
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used items
pub use client::HealthchecksClient;
pub use config::HealthchecksConfig;
pub use error::{Error, Result};
pub use types::{Healthcheck, HealthcheckChannel, HealthcheckResponse, UNIQUE_BY_NAME};
