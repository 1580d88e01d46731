//! Status differ.
//!
//! Applies an upsert response to the observed status and reports whether
//! anything changed. Comparison is field by field on [`CheckStatus`]; only a
//! real change stamps `last_updated`.

use chrono::{DateTime, Utc};
use vigil_core::CheckStatus;
use vigil_healthchecks::HealthcheckResponse;

use crate::clock::Clock;

/// Apply `response` to `status` and return whether the status changed.
///
/// `last_updated` is set to `clock.now()` only when something changed.
pub fn diff_status(
    status: &mut CheckStatus,
    generation: i64,
    response: &HealthcheckResponse,
    clock: &dyn Clock,
) -> bool {
    let before = status.clone();

    status.observed_generation = generation;
    status.id = response.id();
    status.ping_url.clone_from(&response.ping_url);
    status.status.clone_from(&response.status);
    status.pings = Some(narrow_pings(response.pings));
    status.last_ping = response.last_ping.as_deref().and_then(parse_timestamp);

    let changed = *status != before;
    if changed {
        status.last_updated = Some(clock.now());
    }
    changed
}

/// Narrow the API's ping count to the stored width, saturating at the bounds.
fn narrow_pings(pings: i64) -> i32 {
    i32::try_from(pings).unwrap_or(if pings < 0 { i32::MIN } else { i32::MAX })
}

/// Parse an RFC 3339 timestamp, `None` if it does not parse.
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}
