//! Property-based tests for the pure reconciler parts.
//!
//! Uses proptest to validate:
//! - Conversion always names the check `<namespace>/<name>` and marks it unique by name
//! - A sole `*` reference means every channel
//! - Kind/name references select exactly the matching channels
//! - Status diffing is idempotent

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use vigil_core::{Check, CheckSpec, CheckStatus};
use vigil_healthchecks::{HealthcheckChannel, HealthcheckResponse};
use vigil_reconciler::{FixedClock, diff_status, match_channels, to_healthcheck};

fn arb_spec() -> impl Strategy<Value = CheckSpec> {
    (
        "[a-z*/ 0-9]{0,20}",
        "[A-Za-z/_]{0,20}",
        proptest::option::of(any::<u32>()),
        proptest::option::of(any::<u32>()),
        proptest::collection::vec("[a-z0-9-]{1,8}", 0..4),
        proptest::collection::vec("[a-z]{1,6}(/[a-z0-9-]{1,8})?", 0..4),
    )
        .prop_map(|(schedule, timezone, timeout, grace_period, tags, channels)| CheckSpec {
            schedule,
            timezone,
            timeout,
            grace_period,
            tags,
            channels,
        })
}

fn arb_channels() -> impl Strategy<Value = Vec<HealthcheckChannel>> {
    proptest::collection::vec(
        ("[a-f0-9]{8}", "[a-z]{1,3}-[0-9]", prop_oneof!["email", "sms", "slack"]),
        1..8,
    )
    .prop_map(|channels| {
        channels
            .into_iter()
            .map(|(id, name, kind)| HealthcheckChannel::new(id, name, kind))
            .collect()
    })
}

proptest! {
    /// Property: the request name and uniqueness marker never depend on the rest of the spec
    #[test]
    fn prop_convert_names_by_key(
        namespace in "[a-z0-9-]{1,20}",
        name in "[a-z0-9-]{1,20}",
        spec in arb_spec(),
    ) {
        let check = Check::new(namespace.clone(), name.clone(), spec);

        let request = to_healthcheck(&check, &[]);

        prop_assert_eq!(request.name, format!("{namespace}/{name}"));
        prop_assert_eq!(request.unique, vec!["name".to_string()]);
    }

    /// Property: tags survive the space join in order
    #[test]
    fn prop_convert_joins_tags(spec in arb_spec()) {
        let check = Check::new("ns", "n", spec.clone());

        let request = to_healthcheck(&check, &[]);
        let split: Vec<String> = if request.tags.is_empty() {
            Vec::new()
        } else {
            request.tags.split(' ').map(ToString::to_string).collect()
        };

        prop_assert_eq!(split, spec.tags);
    }

    /// Property: a sole `*` reference resolves to `*` whatever the channels
    #[test]
    fn prop_wildcard_matches_all(channels in arb_channels()) {
        prop_assert_eq!(match_channels(&["*".to_string()], &channels), vec!["*".to_string()]);
    }

    /// Property: `kind/name` selects exactly the channels with that kind and name
    #[test]
    fn prop_kind_and_name_is_exact(channels in arb_channels(), pick in any::<prop::sample::Index>()) {
        let target = pick.get(&channels).clone();
        let reference = format!("{}/{}", target.kind, target.name);

        let expected: Vec<String> = channels
            .iter()
            .filter(|c| c.kind == target.kind && c.name == target.name)
            .map(|c| c.id.clone())
            .collect();

        prop_assert_eq!(match_channels(&[reference], &channels), expected);
    }

    /// Property: a bare kind selects every channel of that kind
    #[test]
    fn prop_kind_selects_all_of_kind(channels in arb_channels(), kind in prop_oneof!["email", "sms", "slack", "webhook"]) {
        let expected: Vec<String> = channels
            .iter()
            .filter(|c| c.kind == kind)
            .map(|c| c.id.clone())
            .collect();

        prop_assert_eq!(match_channels(&[kind.to_string()], &channels), expected);
    }

    /// Property: applying the same response twice reports no change the second time
    #[test]
    fn prop_diff_status_is_idempotent(
        generation in 0i64..1000,
        pings in any::<i64>(),
        status in prop_oneof!["new", "up", "down", "grace", "paused"],
        id in "[a-f0-9]{8}",
    ) {
        let clock = FixedClock(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap_or_default());
        let response = HealthcheckResponse {
            pings,
            status: status.to_string(),
            ping_url: format!("https://hc-ping.com/{id}"),
            update_url: format!("https://healthchecks.io/api/v1/checks/{id}"),
            last_ping: Some("2024-01-01T00:00:00+00:00".to_string()),
            ..Default::default()
        };
        let mut observed = CheckStatus::default();

        prop_assert!(diff_status(&mut observed, generation, &response, &clock));
        let snapshot = observed.clone();
        prop_assert!(!diff_status(&mut observed, generation, &response, &clock));
        prop_assert_eq!(observed, snapshot);
    }
}
