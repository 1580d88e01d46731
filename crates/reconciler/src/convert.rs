//! Conversion of a declared check into the API request shape.

use vigil_core::Check;
use vigil_healthchecks::{Healthcheck, UNIQUE_BY_NAME};

/// Build the upsert request for `check` using already resolved channel IDs.
///
/// The request name is `"<namespace>/<name>"` and the request is always
/// unique by name, so resubmitting it updates the existing external check.
pub fn to_healthcheck(check: &Check, channel_ids: &[String]) -> Healthcheck {
    Healthcheck {
        name: check.key().to_string(),
        schedule: check.spec.schedule.clone(),
        timezone: check.spec.timezone.clone(),
        timeout: check.spec.timeout.map_or(0, u64::from),
        grace: check.spec.grace_period.map_or(0, u64::from),
        tags: check.spec.tags.join(" "),
        channels: channel_ids.join(","),
        unique: vec![UNIQUE_BY_NAME.to_string()],
    }
}
