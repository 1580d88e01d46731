//! Resolution of symbolic channel references to channel identifiers.
//!
//! A reference is one of:
//!
//! - `*` as the only reference: every channel in the project
//! - `<kind>`: every channel of that kind
//! - `<kind>/<name>`: channels with exactly that kind and name
//!
//! References that match nothing contribute nothing. Channels matched by more
//! than one reference appear once per match.

use vigil_healthchecks::HealthcheckChannel;

/// Marker the API understands as "every channel".
pub const ALL_CHANNELS: &str = "*";

/// Resolve `references` against the channels known to the service.
pub fn match_channels(references: &[String], channels: &[HealthcheckChannel]) -> Vec<String> {
    if matches!(references, [only] if only == ALL_CHANNELS) {
        return vec![ALL_CHANNELS.to_string()];
    }

    references
        .iter()
        .map(|reference| ChannelReference::parse(reference))
        .flat_map(|reference| {
            channels
                .iter()
                .filter(move |channel| reference.matches(channel))
                .map(|channel| channel.id.clone())
        })
        .collect()
}

/// A parsed `<kind>[/<name>]` reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ChannelReference<'a> {
    kind: &'a str,
    name: Option<&'a str>,
}

impl<'a> ChannelReference<'a> {
    /// Split on `/`. Only a reference with exactly two parts carries a name;
    /// anything else matches by kind alone.
    fn parse(reference: &'a str) -> Self {
        let mut parts = reference.split('/');
        let kind = parts.next().unwrap_or_default();
        let name = match (parts.next(), parts.next()) {
            (Some(name), None) if !name.is_empty() => Some(name),
            _ => None,
        };
        Self { kind, name }
    }

    fn matches(&self, channel: &HealthcheckChannel) -> bool {
        channel.kind == self.kind && self.name.is_none_or(|name| channel.name == name)
    }
}
