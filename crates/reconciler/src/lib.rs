//! K8s-style reconciliation of declared checks against healthchecks.io.
//!
//! This crate implements the controller side of the Kubernetes pattern:
//!
//! - **Declared record**: a [`vigil_core::Check`] held in a [`ResourceStore`]
//! - **External check**: the monitor kept by a [`MonitorService`]
//! - **Reconcile**: one idempotent pass per key that drives the external check
//!   toward the record and writes back the observed status
//!
//! # Key Concepts
//!
//! ## Two-phase deletion
//!
//! The [`FINALIZER`] is persisted before the external check is first created.
//! When deletion is requested the reconciler deletes the external check, treats
//! "already gone" as success, and only then removes the finalizer so the store
//! can drop the record.
//!
//! ## Requeue
//!
//! Every successful pass over a live record asks to be run again after
//! [`ReconcilerConfig::requeue_after`] so external drift gets corrected.
//! [`ReconciliationLoop`] honours that, retries failures with exponential
//! backoff and never runs one key twice at once.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use vigil_core::scheme;
//! use vigil_healthchecks::{HealthchecksClient, HealthchecksConfig};
//! use vigil_reconciler::{InMemoryStore, LoopConfig, ReconcilerBuilder, ReconciliationLoop};
//!
//! let store = Arc::new(InMemoryStore::new());
//! let client = Arc::new(HealthchecksClient::with_config(HealthchecksConfig::from_env()?)?);
//! let reconciler = Arc::new(
//!     ReconcilerBuilder::new()
//!         .with_store(store.clone())
//!         .with_monitor(client)
//!         .build(&scheme())?,
//! );
//!
//! let mut reconciliation = ReconciliationLoop::new(reconciler, store, LoopConfig::default());
//! reconciliation.run().await;
//! ```

#![forbid(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![forbid(clippy::panic)]

pub mod channels;
pub mod clock;
pub mod convert;
pub mod error;
pub mod r#loop;
pub mod monitor;
pub mod reconciler;
pub mod status;
pub mod store;

// Re-export main types
pub use channels::{ALL_CHANNELS, match_channels};
pub use clock::{Clock, FixedClock, SystemClock};
pub use convert::to_healthcheck;
pub use error::{Error, Result, StoreError, StoreResult};
pub use r#loop::{KeySource, LoopConfig, LoopStopper, ReconciliationLoop};
pub use monitor::{MonitorResult, MonitorService};
pub use reconciler::{
    DEFAULT_REQUEUE_AFTER, FINALIZER, Reconcile, ReconcileOutcome, Reconciler, ReconcilerBuilder,
    ReconcilerConfig,
};
pub use status::diff_status;
pub use store::{InMemoryStore, ResourceStore};
