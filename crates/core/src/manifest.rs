//! Parsing declared checks from multi-document YAML manifests.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::check::{Check, CheckStatus};
use crate::error::{Error, Result};
use crate::registry::Registry;

/// Parse every document in `input` into a declared [`Check`].
///
/// Empty documents are skipped. Only the declaring actor's fields are kept:
/// status, finalizers, deletion timestamp, generation and resource version are
/// owned by the store and the reconciler and are reset here.
///
/// # Errors
///
/// Returns an error if a document is not valid YAML, names a kind the registry does
/// not recognise, has no name, or repeats a key declared earlier in the stream.
pub fn parse_manifests(input: &str, registry: &Registry) -> Result<Vec<Check>> {
    let mut seen = HashSet::new();
    let mut checks = Vec::new();

    for (index, document) in serde_yaml::Deserializer::from_str(input).enumerate() {
        let value = serde_yaml::Value::deserialize(document)
            .map_err(|e| Error::manifest_parse_failed(index, e.to_string()))?;

        if value.is_null() {
            continue;
        }

        let api_version = value
            .get("apiVersion")
            .and_then(serde_yaml::Value::as_str)
            .unwrap_or_default();
        let kind = value
            .get("kind")
            .and_then(serde_yaml::Value::as_str)
            .unwrap_or_default();
        if !registry.recognizes(api_version, kind) {
            return Err(Error::unknown_kind(api_version, kind));
        }

        let mut check: Check = serde_yaml::from_value(value)
            .map_err(|e| Error::manifest_parse_failed(index, e.to_string()))?;

        if check.metadata.name.is_empty() {
            return Err(Error::invalid_record(format!(
                "document {index} has no metadata.name"
            )));
        }

        let key = check.key();
        if !seen.insert(key.clone()) {
            return Err(Error::duplicate_record(key.to_string()));
        }

        check.metadata.generation = 0;
        check.metadata.resource_version = 0;
        check.metadata.finalizers.clear();
        check.metadata.deletion_timestamp = None;
        check.status = CheckStatus::default();

        debug!(check = %key, "parsed declared check");
        checks.push(check);
    }

    Ok(checks)
}

/// Read and parse a manifest file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or [`parse_manifests`] fails.
pub fn load_manifest_file(path: &Path, registry: &Registry) -> Result<Vec<Check>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::file_read_failed(path, e.to_string()))?;
    parse_manifests(&content, registry)
}
