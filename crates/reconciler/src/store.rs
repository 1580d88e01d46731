//! Resource store seam and an in-memory implementation.
//!
//! The store owns the declared records. The declaring actor creates, changes
//! and requests deletion of records; the reconciler only writes finalizers
//! (through [`ResourceStore::update`]) and status (through
//! [`ResourceStore::update_status`]). Every write is checked against the
//! record's `resource_version`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;
use vigil_core::{Check, CheckStatus, ObjectKey};

use crate::error::{StoreError, StoreResult};
use crate::r#loop::KeySource;

/// Store operations the reconciler relies on.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Fetch the record, [`StoreError::NotFound`] if it does not exist.
    async fn get(&self, key: &ObjectKey) -> StoreResult<Check>;

    /// Write metadata and spec. Status in `check` is ignored.
    async fn update(&self, check: &Check) -> StoreResult<Check>;

    /// Write status only.
    async fn update_status(&self, check: &Check) -> StoreResult<Check>;
}

#[derive(Debug, Default)]
struct State {
    records: BTreeMap<ObjectKey, Check>,
    version: u64,
}

impl State {
    fn next_version(&mut self) -> u64 {
        self.version = self.version.saturating_add(1);
        self.version
    }
}

/// In-memory [`ResourceStore`] with optimistic concurrency.
///
/// A record whose deletion was requested is removed as soon as its finalizer
/// list is empty.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `records` exactly as given, versions included.
    pub fn with_records(records: impl IntoIterator<Item = Check>) -> Self {
        let mut state = State::default();
        for check in records {
            state.version = state.version.max(check.metadata.resource_version);
            state.records.insert(check.key(), check);
        }
        Self {
            state: RwLock::new(state),
        }
    }

    /// Create a new record at generation 1.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AlreadyExists`] if the key is taken.
    pub async fn create(&self, check: Check) -> StoreResult<Check> {
        let mut state = self.state.write().await;
        let key = check.key();
        if state.records.contains_key(&key) {
            return Err(StoreError::already_exists(key));
        }
        Ok(insert_new(&mut state, check))
    }

    /// Declare `check`: create it, or replace the spec of the existing record.
    ///
    /// A spec change bumps the generation; an identical spec is a no-op.
    ///
    /// # Errors
    ///
    /// Never fails today; the signature matches the other writes.
    pub async fn apply(&self, check: Check) -> StoreResult<Check> {
        let mut guard = self.state.write().await;
        let State { records, version } = &mut *guard;
        let key = check.key();

        let Some(existing) = records.get_mut(&key) else {
            return Ok(insert_new(&mut guard, check));
        };

        if existing.spec != check.spec {
            existing.spec = check.spec;
            existing.metadata.generation = existing.metadata.generation.saturating_add(1);
            *version = version.saturating_add(1);
            existing.metadata.resource_version = *version;
            debug!(check = %key, generation = existing.metadata.generation, "spec changed");
        }
        Ok(existing.clone())
    }

    /// Request deletion of the record at `at`.
    ///
    /// Records without finalizers are removed immediately. Repeated requests keep
    /// the first timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the record does not exist.
    pub async fn request_deletion(&self, key: &ObjectKey, at: DateTime<Utc>) -> StoreResult<()> {
        let mut guard = self.state.write().await;
        let State { records, version } = &mut *guard;
        let existing = records
            .get_mut(key)
            .ok_or_else(|| StoreError::not_found(key.clone()))?;

        if existing.metadata.deletion_timestamp.is_none() {
            existing.metadata.deletion_timestamp = Some(at);
            *version = version.saturating_add(1);
            existing.metadata.resource_version = *version;
            debug!(check = %key, "deletion requested");
        }
        purge_if_released(records, key);
        Ok(())
    }

    /// Replace every record with `records`, versions included.
    ///
    /// The version counter never moves backwards, so versions handed out
    /// before the reset are not reused.
    pub async fn reset(&self, records: impl IntoIterator<Item = Check>) {
        let mut state = self.state.write().await;
        state.records = records
            .into_iter()
            .map(|check| (check.key(), check))
            .collect();
        let highest = state
            .records
            .values()
            .map(|check| check.metadata.resource_version)
            .max()
            .unwrap_or_default();
        state.version = state.version.max(highest);
    }

    /// Every record, ordered by key.
    pub async fn list(&self) -> Vec<Check> {
        self.state.read().await.records.values().cloned().collect()
    }

    /// Number of records.
    pub async fn len(&self) -> usize {
        self.state.read().await.records.len()
    }

    /// Whether the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.state.read().await.records.is_empty()
    }
}

/// Insert a record the caller has checked is absent.
fn insert_new(state: &mut State, check: Check) -> Check {
    let key = check.key();
    let mut check = check;
    check.metadata.generation = 1;
    check.metadata.resource_version = state.next_version();
    check.metadata.deletion_timestamp = None;
    check.status = CheckStatus::default();

    debug!(check = %key, "created record");
    state.records.insert(key, check.clone());
    check
}

/// Remove the record if deletion was requested and nothing holds it back.
fn purge_if_released(records: &mut BTreeMap<ObjectKey, Check>, key: &ObjectKey) -> bool {
    let released = records
        .get(key)
        .is_some_and(|c| c.metadata.is_being_deleted() && c.metadata.finalizers.is_empty());
    if released {
        records.remove(key);
        debug!(check = %key, "purged record");
    }
    released
}

/// Look up `check`'s stored record and verify the caller saw its latest version.
fn fetch_for_write<'a>(
    records: &'a mut BTreeMap<ObjectKey, Check>,
    check: &Check,
) -> StoreResult<&'a mut Check> {
    let key = check.key();
    let existing = records
        .get_mut(&key)
        .ok_or_else(|| StoreError::not_found(key.clone()))?;
    let actual = existing.metadata.resource_version;
    if actual != check.metadata.resource_version {
        return Err(StoreError::conflict(key, check.metadata.resource_version, actual));
    }
    Ok(existing)
}

#[async_trait]
impl ResourceStore for InMemoryStore {
    async fn get(&self, key: &ObjectKey) -> StoreResult<Check> {
        self.state
            .read()
            .await
            .records
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::not_found(key.clone()))
    }

    async fn update(&self, check: &Check) -> StoreResult<Check> {
        let mut guard = self.state.write().await;
        let State { records, version } = &mut *guard;
        let existing = fetch_for_write(records, check)?;

        if existing.spec != check.spec {
            existing.spec = check.spec.clone();
            existing.metadata.generation = existing.metadata.generation.saturating_add(1);
        }
        existing.metadata.finalizers.clone_from(&check.metadata.finalizers);
        *version = version.saturating_add(1);
        existing.metadata.resource_version = *version;

        let updated = existing.clone();
        purge_if_released(records, &updated.key());
        Ok(updated)
    }

    async fn update_status(&self, check: &Check) -> StoreResult<Check> {
        let mut guard = self.state.write().await;
        let State { records, version } = &mut *guard;
        let existing = fetch_for_write(records, check)?;

        existing.status = check.status.clone();
        *version = version.saturating_add(1);
        existing.metadata.resource_version = *version;
        Ok(existing.clone())
    }
}

#[async_trait]
impl KeySource for InMemoryStore {
    async fn list_keys(&self) -> StoreResult<Vec<(ObjectKey, u64)>> {
        Ok(self
            .state
            .read()
            .await
            .records
            .iter()
            .map(|(key, check)| (key.clone(), check.metadata.resource_version))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::arithmetic_side_effects)]

    use vigil_core::CheckSpec;

    use super::*;

    fn check(name: &str) -> Check {
        Check::new("ops", name, CheckSpec::default().with_timeout(60))
    }

    #[tokio::test]
    async fn test_create_sets_generation_and_version() -> StoreResult<()> {
        let store = InMemoryStore::new();

        let created = store.create(check("backup")).await?;

        assert_eq!(created.metadata.generation, 1);
        assert_eq!(created.metadata.resource_version, 1);
        assert_eq!(store.get(&created.key()).await?, created);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_rejects_existing_key() -> StoreResult<()> {
        let store = InMemoryStore::new();
        store.create(check("backup")).await?;

        let result = store.create(check("backup")).await;

        assert!(matches!(result, Err(StoreError::AlreadyExists { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let store = InMemoryStore::new();
        let result = store.get(&ObjectKey::new("ops", "nope")).await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_stale_update_conflicts() -> StoreResult<()> {
        let store = InMemoryStore::new();
        let stale = store.create(check("backup")).await?;
        let mut fresh = stale.clone();
        fresh.metadata.add_finalizer("f");
        store.update(&fresh).await?;

        let result = store.update(&stale).await;

        assert_eq!(
            result,
            Err(StoreError::conflict(stale.key(), 1, 2))
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_update_ignores_status_and_update_status_ignores_metadata() -> StoreResult<()> {
        let store = InMemoryStore::new();
        let mut record = store.create(check("backup")).await?;
        record.status.id = "abc".into();
        record.metadata.add_finalizer("f");

        let record = store.update(&record).await?;
        assert!(record.status.id.is_empty());
        assert!(record.metadata.has_finalizer("f"));

        let mut record = record;
        record.status.id = "abc".into();
        record.metadata.finalizers.clear();
        let record = store.update_status(&record).await?;
        assert_eq!(record.status.id, "abc");
        assert!(record.metadata.has_finalizer("f"));
        Ok(())
    }

    #[tokio::test]
    async fn test_apply_bumps_generation_only_on_spec_change() -> StoreResult<()> {
        let store = InMemoryStore::new();
        store.apply(check("backup")).await?;

        let same = store.apply(check("backup")).await?;
        assert_eq!(same.metadata.generation, 1);
        assert_eq!(same.metadata.resource_version, 1);

        let mut changed = check("backup");
        changed.spec.grace_period = Some(30);
        let changed = store.apply(changed).await?;
        assert_eq!(changed.metadata.generation, 2);
        assert_eq!(changed.metadata.resource_version, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_deletion_without_finalizer_purges_immediately() -> StoreResult<()> {
        let store = InMemoryStore::new();
        let record = store.create(check("backup")).await?;

        store.request_deletion(&record.key(), Utc::now()).await?;

        assert!(store.is_empty().await);
        Ok(())
    }

    #[tokio::test]
    async fn test_finalizer_blocks_purge_until_removed() -> StoreResult<()> {
        let store = InMemoryStore::new();
        let mut record = store.create(check("backup")).await?;
        record.metadata.add_finalizer("f");
        store.update(&record).await?;

        store.request_deletion(&record.key(), Utc::now()).await?;
        let mut held = store.get(&record.key()).await?;
        assert!(held.metadata.is_being_deleted());

        held.metadata.remove_finalizer("f");
        let released = store.update(&held).await?;

        assert!(released.metadata.finalizers.is_empty());
        assert!(store.is_empty().await);
        Ok(())
    }

    #[tokio::test]
    async fn test_repeated_deletion_keeps_first_timestamp() -> StoreResult<()> {
        let store = InMemoryStore::new();
        let mut record = store.create(check("backup")).await?;
        record.metadata.add_finalizer("f");
        store.update(&record).await?;
        let first = Utc::now();

        store.request_deletion(&record.key(), first).await?;
        store
            .request_deletion(&record.key(), first + chrono::TimeDelta::seconds(5))
            .await?;

        let held = store.get(&record.key()).await?;
        assert_eq!(held.metadata.deletion_timestamp, Some(first));
        Ok(())
    }

    #[tokio::test]
    async fn test_with_records_continues_versions() -> StoreResult<()> {
        let mut restored = check("backup");
        restored.metadata.resource_version = 41;
        let store = InMemoryStore::with_records([restored]);

        let created = store.create(check("other")).await?;

        assert_eq!(created.metadata.resource_version, 42);
        Ok(())
    }

    /// Given a store snapshot taken before a write
    /// When the store is reset to that snapshot
    /// Then the record is back as it was and later versions keep increasing
    #[tokio::test]
    async fn test_reset_restores_snapshot_without_reusing_versions() -> StoreResult<()> {
        let store = InMemoryStore::new();
        let created = store.create(check("backup")).await?;
        let snapshot = store.list().await;

        let mut changed = created.clone();
        changed.metadata.add_finalizer("example.com/guard");
        store.update(&changed).await?;
        store.reset(snapshot).await;

        assert_eq!(store.get(&created.key()).await?, created);
        let next = store.create(check("other")).await?;
        assert_eq!(next.metadata.resource_version, 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_keys_reports_versions() -> StoreResult<()> {
        let store = InMemoryStore::new();
        store.create(check("a")).await?;
        store.create(check("b")).await?;

        let keys = store.list_keys().await?;

        assert_eq!(
            keys,
            vec![(ObjectKey::new("ops", "a"), 1), (ObjectKey::new("ops", "b"), 2)]
        );
        Ok(())
    }
}
