//! Wire types of the healthchecks management API.

use serde::{Deserialize, Serialize};

/// The field that makes `POST checks/` an upsert instead of a create.
pub const UNIQUE_BY_NAME: &str = "name";

/// Request body for creating or updating a check.
///
/// Zero and empty fields are left out of the JSON body so the API applies its
/// own defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Healthcheck {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub schedule: String,

    #[serde(default, rename = "tz", skip_serializing_if = "String::is_empty")]
    pub timezone: String,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub timeout: u64,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub grace: u64,

    /// Space separated tags.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tags: String,

    /// Comma separated channel identifiers, or `*` for every channel.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub channels: String,

    /// Fields whose values identify an existing check to update.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unique: Vec<String>,
}

/// A check as returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthcheckResponse {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub tags: String,

    #[serde(default)]
    pub desc: String,

    #[serde(default)]
    pub grace: u64,

    #[serde(default)]
    pub timeout: Option<u64>,

    #[serde(default)]
    pub schedule: Option<String>,

    #[serde(default)]
    pub tz: Option<String>,

    #[serde(default, rename = "n_pings")]
    pub pings: i64,

    #[serde(default)]
    pub status: String,

    /// RFC 3339 timestamp, `null` before the first ping.
    #[serde(default)]
    pub last_ping: Option<String>,

    #[serde(default)]
    pub next_ping: Option<String>,

    #[serde(default)]
    pub channels: Option<String>,

    #[serde(default)]
    pub ping_url: String,

    #[serde(default)]
    pub update_url: String,

    #[serde(default)]
    pub pause_url: String,

    /// Only present in newer API versions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
}

impl HealthcheckResponse {
    /// The identifier used for later updates and deletion.
    ///
    /// Falls back to the last path segment of `update_url` when the API does not
    /// send `uuid`.
    pub fn id(&self) -> String {
        if let Some(uuid) = self.uuid.as_deref().filter(|u| !u.is_empty()) {
            return uuid.to_string();
        }
        self.update_url
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string()
    }
}

/// A notification channel configured in the project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthcheckChannel {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub kind: String,
}

impl HealthcheckChannel {
    /// Create a channel description.
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: kind.into(),
        }
    }
}

/// Body of `GET channels/`.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ChannelList {
    #[serde(default)]
    pub channels: Vec<HealthcheckChannel>,
}

/// Body of `GET checks/`.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct CheckList {
    #[serde(default)]
    pub checks: Vec<HealthcheckResponse>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_zero(value: &u64) -> bool {
    *value == 0
}
