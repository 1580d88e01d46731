//! # vigil-core
//!
//! Declared-record types shared by every vigil crate.
//!
//! - [`Check`] is the declared heartbeat check: metadata, desired spec and the
//!   status observed by the reconciler.
//! - [`Registry`] binds record kinds explicitly; build one with [`scheme`] at
//!   startup and pass it to whatever needs to recognise documents.
//! - [`parse_manifests`] turns a multi-document YAML stream into checks.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod check;
pub mod error;
pub mod manifest;
pub mod meta;
pub mod registry;

pub use check::{Check, CheckSpec, CheckStatus};
pub use error::{Error, Result};
pub use manifest::{load_manifest_file, parse_manifests};
pub use meta::{DEFAULT_NAMESPACE, ObjectKey, ObjectMeta, TypeMeta};
pub use registry::{GroupVersionKind, Registry, scheme};
