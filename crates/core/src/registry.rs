//! Explicit type registry.
//!
//! Record kinds are bound by calling [`Registry::register`] during startup and the
//! resulting value is handed to whoever needs to recognise documents. There is no
//! process-wide registry.

use std::collections::BTreeSet;
use std::fmt;

use crate::check::Check;

/// A group/version/kind triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupVersionKind {
    pub group: String,
    pub version: String,
    pub kind: String,
}

impl GroupVersionKind {
    /// Create a new triple.
    pub fn new(group: impl Into<String>, version: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            kind: kind.into(),
        }
    }

    /// The `apiVersion` string: `group/version`, or just `version` for the core group.
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }
}

impl fmt::Display for GroupVersionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, Kind={}", self.api_version(), self.kind)
    }
}

/// Set of kinds this process understands.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    kinds: BTreeSet<GroupVersionKind>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a kind into the registry.
    #[must_use]
    pub fn register(mut self, gvk: GroupVersionKind) -> Self {
        self.kinds.insert(gvk);
        self
    }

    /// Whether `gvk` has been registered.
    pub fn contains(&self, gvk: &GroupVersionKind) -> bool {
        self.kinds.contains(gvk)
    }

    /// Whether a document header names a registered kind.
    pub fn recognizes(&self, api_version: &str, kind: &str) -> bool {
        self.kinds
            .iter()
            .any(|gvk| gvk.kind == kind && gvk.api_version() == api_version)
    }

    /// Registered kinds in sorted order.
    pub fn kinds(&self) -> impl Iterator<Item = &GroupVersionKind> {
        self.kinds.iter()
    }
}

/// Registry with every kind vigil reconciles.
pub fn scheme() -> Registry {
    Registry::new().register(Check::gvk())
}
