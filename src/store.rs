//! Resource store backed by a JSON state file.
//!
//! Records live in an [`InMemoryStore`]; every write is followed by a rewrite
//! of the state file (temp file, then rename), so finalizers and status survive
//! restarts. A write whose state file update fails is rolled back in memory.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use vigil_core::{Check, ObjectKey};
use vigil_reconciler::{InMemoryStore, KeySource, ResourceStore, StoreError, StoreResult};

/// Current layout of the state file.
const STATE_FORMAT: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct StateFile {
    format: u32,
    checks: Vec<Check>,
}

/// What a manifest sync changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Newly declared records.
    pub created: usize,
    /// Records whose spec changed.
    pub updated: usize,
    /// Records no longer declared, now marked for deletion.
    pub deleting: usize,
}

/// [`ResourceStore`] persisted to a JSON file.
#[derive(Debug)]
pub struct FileStore {
    inner: InMemoryStore,
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open the store at `path`, starting empty if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the file exists but cannot be read or parsed.
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let records = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let state: StateFile = serde_json::from_slice(&bytes).map_err(|e| {
                    StoreError::backend(format!("failed parsing {}: {e}", path.display()))
                })?;
                if state.format != STATE_FORMAT {
                    return Err(StoreError::backend(format!(
                        "{} has unsupported format {}",
                        path.display(),
                        state.format
                    )));
                }
                state.checks
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                return Err(StoreError::backend(format!(
                    "failed reading {}: {e}",
                    path.display()
                )));
            }
        };

        info!(path = %path.display(), records = records.len(), "opened state file");
        Ok(Self {
            inner: InMemoryStore::with_records(records),
            path,
            write_lock: Mutex::new(()),
        })
    }

    /// Path of the state file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every record, ordered by key.
    pub async fn list(&self) -> Vec<Check> {
        self.inner.list().await
    }

    /// Make the store match the declared set.
    ///
    /// New records are created, changed specs bump the generation, and records
    /// missing from `declared` are marked for deletion at `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if a write or the state file update fails.
    pub async fn sync_manifest(&self, declared: Vec<Check>, now: DateTime<Utc>) -> StoreResult<SyncReport> {
        let _guard = self.write_lock.lock().await;
        let snapshot = self.inner.list().await;

        let report = match self.apply_declared(&snapshot, declared, now).await {
            Ok(report) => report,
            Err(e) => {
                self.inner.reset(snapshot).await;
                return Err(e);
            }
        };

        if report != SyncReport::default() {
            self.commit(snapshot).await?;
            info!(
                created = report.created,
                updated = report.updated,
                deleting = report.deleting,
                "applied manifest"
            );
        }
        Ok(report)
    }

    async fn apply_declared(
        &self,
        snapshot: &[Check],
        declared: Vec<Check>,
        now: DateTime<Utc>,
    ) -> StoreResult<SyncReport> {
        let existing: BTreeMap<ObjectKey, &Check> =
            snapshot.iter().map(|check| (check.key(), check)).collect();
        let declared_keys: BTreeSet<ObjectKey> = declared.iter().map(Check::key).collect();
        let mut report = SyncReport::default();

        for check in declared {
            match existing.get(&check.key()) {
                None => report.created = report.created.saturating_add(1),
                Some(current) if current.spec != check.spec => {
                    report.updated = report.updated.saturating_add(1);
                }
                Some(_) => {}
            }
            self.inner.apply(check).await?;
        }

        for (key, check) in &existing {
            if declared_keys.contains(key) || check.metadata.is_being_deleted() {
                continue;
            }
            self.inner.request_deletion(key, now).await?;
            report.deleting = report.deleting.saturating_add(1);
        }
        Ok(report)
    }

    /// Persist the records, or put `snapshot` back in memory if the state file
    /// cannot be written. Memory never gets ahead of the file.
    ///
    /// The caller holds `write_lock`.
    async fn commit(&self, snapshot: Vec<Check>) -> StoreResult<()> {
        if let Err(e) = self.persist().await {
            warn!(path = %self.path.display(), error = %e, "rolling back unpersisted write");
            self.inner.reset(snapshot).await;
            return Err(e);
        }
        Ok(())
    }

    /// Write the current records to the state file.
    async fn persist(&self) -> StoreResult<()> {
        let state = StateFile {
            format: STATE_FORMAT,
            checks: self.inner.list().await,
        };
        let bytes = serde_json::to_vec_pretty(&state)
            .map_err(|e| StoreError::backend(format!("failed encoding state: {e}")))?;

        let tmp = temp_path(&self.path);
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| StoreError::backend(format!("failed writing {}: {e}", tmp.display())))?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|e| {
            StoreError::backend(format!("failed replacing {}: {e}", self.path.display()))
        })?;

        debug!(path = %self.path.display(), records = state.checks.len(), "persisted state");
        Ok(())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[async_trait]
impl ResourceStore for FileStore {
    async fn get(&self, key: &ObjectKey) -> StoreResult<Check> {
        self.inner.get(key).await
    }

    async fn update(&self, check: &Check) -> StoreResult<Check> {
        let _guard = self.write_lock.lock().await;
        let snapshot = self.inner.list().await;
        let updated = self.inner.update(check).await?;
        self.commit(snapshot).await?;
        Ok(updated)
    }

    async fn update_status(&self, check: &Check) -> StoreResult<Check> {
        let _guard = self.write_lock.lock().await;
        let snapshot = self.inner.list().await;
        let updated = self.inner.update_status(check).await?;
        self.commit(snapshot).await?;
        Ok(updated)
    }
}

#[async_trait]
impl KeySource for FileStore {
    async fn list_keys(&self) -> StoreResult<Vec<(ObjectKey, u64)>> {
        self.inner.list_keys().await
    }
}
