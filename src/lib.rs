#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

//! # vigil
//!
//! Keeps healthchecks.io checks in sync with `Check` records declared in a
//! YAML manifest.
//!
//! The engine lives in [`vigil_reconciler`]; this crate supplies the command
//! line, configuration, a state-file backed store and the process bootstrap.

pub mod cli;
pub mod config;
pub mod operator;
pub mod store;

pub use vigil_core;
pub use vigil_healthchecks;
pub use vigil_reconciler;
