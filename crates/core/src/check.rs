//! The `Check` record: a declared heartbeat check and its observed status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::meta::{ObjectKey, ObjectMeta, TypeMeta};
use crate::registry::GroupVersionKind;

/// API group the `Check` kind is registered under.
pub const GROUP: &str = "monitoring.healthchecks.io";
/// API version the `Check` kind is registered under.
pub const VERSION: &str = "v1alpha1";
/// Kind name of the declared record.
pub const KIND: &str = "Check";

/// Desired state of a check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckSpec {
    /// The schedule in cron format.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub schedule: String,

    /// Server's timezone. Only has effect in combination with `schedule`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub timezone: String,

    /// Expected period of the check, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,

    /// Grace period for the check, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grace_period: Option<u32>,

    /// Tags for the check.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Channel references: `*`, `<kind>` or `<kind>/<name>`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub channels: Vec<String>,
}

/// Observed state of a check, written only by the reconciler.
///
/// `id` is non-empty if and only if the external check has been created at least once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckStatus {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pings: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_ping: Option<DateTime<Utc>>,

    #[serde(default, rename = "pingURL", skip_serializing_if = "String::is_empty")]
    pub ping_url: String,

    #[serde(default)]
    pub observed_generation: i64,
}

/// A declared check together with its metadata and status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Check {
    #[serde(flatten)]
    pub type_meta: TypeMeta,
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: CheckSpec,
    #[serde(default)]
    pub status: CheckStatus,
}

impl Check {
    /// The registered group/version/kind of `Check`.
    pub fn gvk() -> GroupVersionKind {
        GroupVersionKind::new(GROUP, VERSION, KIND)
    }

    /// Create a new check with the canonical type header.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, spec: CheckSpec) -> Self {
        let gvk = Self::gvk();
        Self {
            type_meta: TypeMeta {
                api_version: gvk.api_version(),
                kind: gvk.kind,
            },
            metadata: ObjectMeta::new(namespace, name),
            spec,
            status: CheckStatus::default(),
        }
    }

    /// The key identifying this record.
    pub fn key(&self) -> ObjectKey {
        self.metadata.key()
    }
}

impl CheckSpec {
    /// Set the cron schedule.
    #[must_use]
    pub fn with_schedule(mut self, schedule: impl Into<String>) -> Self {
        self.schedule = schedule.into();
        self
    }

    /// Set the timezone.
    #[must_use]
    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }

    /// Set the timeout in seconds.
    #[must_use]
    pub const fn with_timeout(mut self, seconds: u32) -> Self {
        self.timeout = Some(seconds);
        self
    }

    /// Set the grace period in seconds.
    #[must_use]
    pub const fn with_grace_period(mut self, seconds: u32) -> Self {
        self.grace_period = Some(seconds);
        self
    }

    /// Set the tags.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Set the channel references.
    #[must_use]
    pub fn with_channels<I, S>(mut self, channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.channels = channels.into_iter().map(Into::into).collect();
        self
    }
}
