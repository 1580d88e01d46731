//! Reconciler implementation.
//!
//! One invocation moves a single record through
//! `Fetch -> Active | Deleting -> Done`:
//!
//! - **Active**: ensure the finalizer is persisted, resolve channels, upsert
//!   the external check, write status if it changed, requeue.
//! - **Deleting**: delete the external check (absent counts as deleted), then
//!   drop the finalizer so the store can remove the record.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, info, trace};
use vigil_core::{Check, ObjectKey, Registry};

use crate::channels::match_channels;
use crate::clock::{Clock, SystemClock};
use crate::convert::to_healthcheck;
use crate::error::{Error, Result};
use crate::monitor::MonitorService;
use crate::status::diff_status;
use crate::store::ResourceStore;

/// Finalizer token guarding the external check.
pub const FINALIZER: &str = "check.finalizers.monitoring.healthchecks.io";

/// Requeue delay after a successful pass.
pub const DEFAULT_REQUEUE_AFTER: Duration = Duration::from_secs(60);

/// Configuration for the reconciler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilerConfig {
    /// Delay before the next pass over a healthy record.
    pub requeue_after: Duration,
    /// Prepended to every external check name.
    pub name_prefix: String,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            requeue_after: DEFAULT_REQUEUE_AFTER,
            name_prefix: String::new(),
        }
    }
}

/// What the caller should do after a pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// Invoke again after this delay; `None` waits for the next change.
    pub requeue_after: Option<Duration>,
}

impl ReconcileOutcome {
    /// Nothing left to do for this record.
    pub const fn done() -> Self {
        Self {
            requeue_after: None,
        }
    }

    /// Reconcile again after `after`.
    pub const fn requeue(after: Duration) -> Self {
        Self {
            requeue_after: Some(after),
        }
    }
}

/// Something that can reconcile one key at a time.
#[async_trait]
pub trait Reconcile: Send + Sync {
    /// Run one pass for `key`.
    async fn reconcile(&self, key: &ObjectKey) -> Result<ReconcileOutcome>;
}

/// Drives external checks toward the declared records.
pub struct Reconciler {
    store: Arc<dyn ResourceStore>,
    monitor: Arc<dyn MonitorService>,
    clock: Arc<dyn Clock>,
    config: ReconcilerConfig,
}

impl Reconciler {
    /// Create a new reconciler.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `registry` does not know the `Check` kind.
    pub fn new(
        registry: &Registry,
        store: Arc<dyn ResourceStore>,
        monitor: Arc<dyn MonitorService>,
        clock: Arc<dyn Clock>,
        config: ReconcilerConfig,
    ) -> Result<Self> {
        let gvk = Check::gvk();
        if !registry.contains(&gvk) {
            return Err(Error::invalid_config(format!("{gvk} is not registered")));
        }

        Ok(Self {
            store,
            monitor,
            clock,
            config,
        })
    }

    /// Get the configuration.
    pub const fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Run one pass for `key`.
    ///
    /// # Errors
    ///
    /// Store and monitoring errors are returned unchanged, except a missing
    /// record, which ends the pass successfully.
    pub async fn reconcile(&self, key: &ObjectKey) -> Result<ReconcileOutcome> {
        let check = match self.store.get(key).await {
            Ok(check) => check,
            Err(e) => {
                let e = Error::from(e);
                if e.is_not_found() {
                    debug!(check = %key, "record gone, nothing to reconcile");
                    return Ok(ReconcileOutcome::done());
                }
                error!(check = %key, error = %e, "failed to fetch record");
                return Err(e);
            }
        };

        if check.metadata.is_being_deleted() {
            return self.finalize(check).await;
        }

        let check = self.ensure_finalizer(check).await?;
        let channel_ids = self.resolve_channels(&check).await?;

        let mut request = to_healthcheck(&check, &channel_ids);
        request.name = self.external_name(&check);
        trace!(check = %key, request = ?request, "upserting check");

        let response = self.monitor.upsert(&request).await.inspect_err(|e| {
            error!(check = %key, error = %e, "failed to create/update healthcheck");
        })?;
        info!(check = %key, id = %response.id(), "created/updated healthcheck");

        let mut check = check;
        let generation = check.metadata.generation;
        if diff_status(&mut check.status, generation, &response, self.clock.as_ref()) {
            self.store.update_status(&check).await.inspect_err(|e| {
                error!(check = %key, error = %e, "failed to update status");
            })?;
            debug!(check = %key, "updated status");
        } else {
            debug!(check = %key, "status unchanged, skipping update");
        }

        Ok(ReconcileOutcome::requeue(self.config.requeue_after))
    }

    /// Persist the finalizer before anything external happens.
    async fn ensure_finalizer(&self, check: Check) -> Result<Check> {
        if check.metadata.has_finalizer(FINALIZER) {
            return Ok(check);
        }

        let mut check = check;
        check.metadata.add_finalizer(FINALIZER);
        let updated = self.store.update(&check).await.inspect_err(|e| {
            error!(check = %check.key(), error = %e, "failed to add finalizer");
        })?;
        info!(check = %updated.key(), "added finalizer");
        Ok(updated)
    }

    /// Deleting branch: remove the external check, then release the record.
    async fn finalize(&self, check: Check) -> Result<ReconcileOutcome> {
        let key = check.key();
        if !check.metadata.has_finalizer(FINALIZER) {
            debug!(check = %key, "finalizer already removed");
            return Ok(ReconcileOutcome::done());
        }

        self.delete_external(&check).await.inspect_err(|e| {
            error!(check = %key, error = %e, "failed to delete healthcheck");
        })?;

        let mut check = check;
        check.metadata.remove_finalizer(FINALIZER);
        self.store.update(&check).await.inspect_err(|e| {
            error!(check = %key, error = %e, "failed to remove finalizer");
        })?;
        info!(check = %key, "removed finalizer");

        Ok(ReconcileOutcome::done())
    }

    /// Delete the external check. An already absent check counts as deleted.
    ///
    /// Without a recorded ID the check is looked up by its unique name, which
    /// covers an upsert whose status write never committed.
    pub(crate) async fn delete_external(&self, check: &Check) -> Result<()> {
        let key = check.key();
        let id = if check.status.id.is_empty() {
            let name = self.external_name(check);
            let found = self
                .monitor
                .list_checks()
                .await?
                .into_iter()
                .find(|c| c.name == name)
                .map(|c| c.id());
            let Some(id) = found else {
                debug!(check = %key, name = %name, "no external check to delete");
                return Ok(());
            };
            id
        } else {
            check.status.id.clone()
        };

        match self.monitor.delete(&id).await {
            Ok(()) => {
                info!(check = %key, id = %id, "deleted healthcheck");
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                debug!(check = %key, id = %id, "healthcheck already deleted");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Channel IDs for the record's references; no lookup when there are none.
    async fn resolve_channels(&self, check: &Check) -> Result<Vec<String>> {
        if check.spec.channels.is_empty() {
            return Ok(Vec::new());
        }

        let channels = self.monitor.list_channels().await.inspect_err(|e| {
            error!(check = %check.key(), error = %e, "failed to list channels");
        })?;
        trace!(check = %check.key(), channels = ?channels, "fetched channels");
        Ok(match_channels(&check.spec.channels, &channels))
    }

    fn external_name(&self, check: &Check) -> String {
        format!("{}{}", self.config.name_prefix, check.key())
    }
}

#[async_trait]
impl Reconcile for Reconciler {
    async fn reconcile(&self, key: &ObjectKey) -> Result<ReconcileOutcome> {
        Self::reconcile(self, key).await
    }
}

/// Builder for Reconciler.
pub struct ReconcilerBuilder {
    store: Option<Arc<dyn ResourceStore>>,
    monitor: Option<Arc<dyn MonitorService>>,
    clock: Option<Arc<dyn Clock>>,
    config: ReconcilerConfig,
}

impl ReconcilerBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            store: None,
            monitor: None,
            clock: None,
            config: ReconcilerConfig::default(),
        }
    }

    /// Set the resource store.
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn ResourceStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the monitoring service.
    #[must_use]
    pub fn with_monitor(mut self, monitor: Arc<dyn MonitorService>) -> Self {
        self.monitor = Some(monitor);
        self
    }

    /// Set the clock. Defaults to [`SystemClock`].
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Set the configuration.
    #[must_use]
    pub fn with_config(mut self, config: ReconcilerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the requeue delay.
    #[must_use]
    pub const fn requeue_after(mut self, after: Duration) -> Self {
        self.config.requeue_after = after;
        self
    }

    /// Set the external name prefix.
    #[must_use]
    pub fn name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.name_prefix = prefix.into();
        self
    }

    /// Build the reconciler.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the store or monitor is missing or
    /// `registry` does not know the `Check` kind.
    pub fn build(self, registry: &Registry) -> Result<Reconciler> {
        let store = self
            .store
            .ok_or_else(|| Error::invalid_config("resource store is required"))?;
        let monitor = self
            .monitor
            .ok_or_else(|| Error::invalid_config("monitoring service is required"))?;
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));

        Reconciler::new(registry, store, monitor, clock, self.config)
    }
}

impl Default for ReconcilerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::{DateTime, TimeZone, Utc};
    use vigil_core::{CheckSpec, scheme};
    use vigil_healthchecks::{Healthcheck, HealthcheckChannel, HealthcheckResponse};

    use super::*;
    use crate::clock::FixedClock;
    use crate::error::StoreError;
    use crate::monitor::MonitorResult;
    use crate::store::InMemoryStore;

    const CHECK_ID: &str = "e71024f4-8537-4dd2-b742-ebe5a1685776";

    /// Scripted monitoring service recording every call.
    #[derive(Default)]
    struct FakeMonitor {
        channels: Vec<HealthcheckChannel>,
        existing: Vec<HealthcheckResponse>,
        delete_status: Option<u16>,
        fail_upsert: bool,
        upserts: Mutex<Vec<Healthcheck>>,
        deletes: Mutex<Vec<String>>,
        channel_lookups: Mutex<usize>,
    }

    impl FakeMonitor {
        fn upserts(&self) -> Vec<Healthcheck> {
            self.upserts.lock().map(|u| u.clone()).unwrap_or_default()
        }

        fn deletes(&self) -> Vec<String> {
            self.deletes.lock().map(|d| d.clone()).unwrap_or_default()
        }

        fn channel_lookups(&self) -> usize {
            self.channel_lookups.lock().map(|n| *n).unwrap_or_default()
        }
    }

    #[async_trait]
    impl MonitorService for FakeMonitor {
        async fn list_channels(&self) -> MonitorResult<Vec<HealthcheckChannel>> {
            if let Ok(mut n) = self.channel_lookups.lock() {
                *n = n.saturating_add(1);
            }
            Ok(self.channels.clone())
        }

        async fn upsert(&self, check: &Healthcheck) -> MonitorResult<HealthcheckResponse> {
            if self.fail_upsert {
                return Err(vigil_healthchecks::Error::api(503, "unavailable"));
            }
            if let Ok(mut upserts) = self.upserts.lock() {
                upserts.push(check.clone());
            }
            Ok(HealthcheckResponse {
                name: check.name.clone(),
                status: "new".into(),
                ping_url: format!("https://hc-ping.com/{CHECK_ID}"),
                update_url: format!("https://healthchecks.io/api/v1/checks/{CHECK_ID}"),
                ..Default::default()
            })
        }

        async fn list_checks(&self) -> MonitorResult<Vec<HealthcheckResponse>> {
            Ok(self.existing.clone())
        }

        async fn delete(&self, id: &str) -> MonitorResult<()> {
            if let Ok(mut deletes) = self.deletes.lock() {
                deletes.push(id.to_string());
            }
            match self.delete_status {
                None | Some(200) => Ok(()),
                Some(status) => Err(vigil_healthchecks::Error::api(status, "{}")),
            }
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).single().unwrap_or_default()
    }

    fn reconciler(store: Arc<InMemoryStore>, monitor: Arc<FakeMonitor>) -> Result<Reconciler> {
        ReconcilerBuilder::new()
            .with_store(store)
            .with_monitor(monitor)
            .with_clock(Arc::new(FixedClock(now())))
            .build(&scheme())
    }

    fn example_spec() -> CheckSpec {
        CheckSpec::default()
            .with_timeout(3600)
            .with_grace_period(60)
            .with_channels(["email"])
    }

    fn email_and_sms() -> Vec<HealthcheckChannel> {
        vec![
            HealthcheckChannel::new("4ec5a071-2d08-4baa-898a-eb4eb3cd6941", "My Work Email", "email"),
            HealthcheckChannel::new("746a083e-f542-4554-be1a-707ce16d3acc", "My Phone", "sms"),
        ]
    }

    async fn deleting_check(store: &InMemoryStore, status_id: &str) -> Result<Check> {
        let mut created = store
            .create(Check::new("testnamespace", "example", example_spec()))
            .await?;
        created.metadata.add_finalizer(FINALIZER);
        let mut created = store.update(&created).await?;
        created.status.id = status_id.to_string();
        let created = store.update_status(&created).await?;
        store.request_deletion(&created.key(), now()).await?;
        Ok(store.get(&created.key()).await?)
    }

    // ===== Behavior-Driven Tests =====

    /// Given a new record with an email channel reference
    /// When it is reconciled
    /// Then the finalizer, external ID and requeue delay are in place
    #[tokio::test]
    async fn new_record_is_created_externally() -> Result<()> {
        let store = Arc::new(InMemoryStore::new());
        let monitor = Arc::new(FakeMonitor {
            channels: email_and_sms(),
            ..Default::default()
        });
        let key = store
            .create(Check::new("testnamespace", "example", example_spec()))
            .await?
            .key();

        let outcome = reconciler(store.clone(), monitor.clone())?.reconcile(&key).await?;

        assert_eq!(outcome, ReconcileOutcome::requeue(Duration::from_secs(60)));
        let stored = store.get(&key).await?;
        assert_eq!(stored.metadata.finalizers, vec![FINALIZER.to_string()]);
        assert_eq!(stored.status.id, CHECK_ID);
        assert_eq!(stored.status.status, "new");
        assert_eq!(stored.status.observed_generation, 1);
        assert_eq!(stored.status.last_updated, Some(now()));

        let upserts = monitor.upserts();
        assert_eq!(upserts.len(), 1);
        assert_eq!(upserts.first().map(|u| u.name.as_str()), Some("testnamespace/example"));
        assert_eq!(
            upserts.first().map(|u| u.channels.as_str()),
            Some("4ec5a071-2d08-4baa-898a-eb4eb3cd6941")
        );
        Ok(())
    }

    /// Given a record already reconciled once
    /// When it is reconciled again with nothing changed externally
    /// Then the status is not rewritten
    #[tokio::test]
    async fn second_pass_skips_unchanged_status() -> Result<()> {
        let store = Arc::new(InMemoryStore::new());
        let monitor = Arc::new(FakeMonitor::default());
        let key = store
            .create(Check::new("ops", "backup", CheckSpec::default()))
            .await?
            .key();
        let reconciler = reconciler(store.clone(), monitor.clone())?;

        reconciler.reconcile(&key).await?;
        let version = store.get(&key).await?.metadata.resource_version;
        reconciler.reconcile(&key).await?;

        assert_eq!(store.get(&key).await?.metadata.resource_version, version);
        assert_eq!(monitor.upserts().len(), 2);
        Ok(())
    }

    /// Given a record without channel references
    /// When it is reconciled
    /// Then channels are never listed
    #[tokio::test]
    async fn no_channel_references_skip_lookup() -> Result<()> {
        let store = Arc::new(InMemoryStore::new());
        let monitor = Arc::new(FakeMonitor::default());
        let key = store
            .create(Check::new("ops", "backup", CheckSpec::default()))
            .await?
            .key();

        reconciler(store, monitor.clone())?.reconcile(&key).await?;

        assert_eq!(monitor.channel_lookups(), 0);
        assert_eq!(monitor.upserts().first().map(|u| u.channels.clone()), Some(String::new()));
        Ok(())
    }

    /// Given no record for the key
    /// When it is reconciled
    /// Then the pass ends without error or requeue
    #[tokio::test]
    async fn missing_record_is_not_an_error() -> Result<()> {
        let store = Arc::new(InMemoryStore::new());
        let monitor = Arc::new(FakeMonitor::default());

        let outcome = reconciler(store, monitor.clone())?
            .reconcile(&ObjectKey::new("ops", "gone"))
            .await?;

        assert_eq!(outcome, ReconcileOutcome::done());
        assert!(monitor.upserts().is_empty());
        Ok(())
    }

    /// Given the monitoring service is failing
    /// When a new record is reconciled
    /// Then the error is returned and the finalizer is already persisted
    #[tokio::test]
    async fn upsert_failure_keeps_finalizer() -> Result<()> {
        let store = Arc::new(InMemoryStore::new());
        let monitor = Arc::new(FakeMonitor {
            fail_upsert: true,
            ..Default::default()
        });
        let key = store
            .create(Check::new("ops", "backup", CheckSpec::default()))
            .await?
            .key();

        let result = reconciler(store.clone(), monitor)?.reconcile(&key).await;

        assert!(matches!(
            result,
            Err(Error::Monitor(vigil_healthchecks::Error::Api { status: 503, .. }))
        ));
        let stored = store.get(&key).await?;
        assert!(stored.metadata.has_finalizer(FINALIZER));
        assert!(stored.status.id.is_empty());
        Ok(())
    }

    /// Given a record marked for deletion with the finalizer present
    /// When the external delete succeeds
    /// Then the finalizer is removed and nothing is requeued
    #[tokio::test]
    async fn deletion_removes_finalizer() -> Result<()> {
        let store = Arc::new(InMemoryStore::new());
        let monitor = Arc::new(FakeMonitor::default());
        let check = deleting_check(&store, CHECK_ID).await?;

        let outcome = reconciler(store.clone(), monitor.clone())?
            .reconcile(&check.key())
            .await?;

        assert_eq!(outcome, ReconcileOutcome::done());
        assert_eq!(monitor.deletes(), vec![CHECK_ID.to_string()]);
        assert!(matches!(
            store.get(&check.key()).await,
            Err(StoreError::NotFound { .. })
        ));
        Ok(())
    }

    /// Given a record marked for deletion whose external check is already gone
    /// When it is reconciled
    /// Then the 404 counts as deleted
    #[tokio::test]
    async fn deletion_tolerates_missing_external_check() -> Result<()> {
        let store = Arc::new(InMemoryStore::new());
        let monitor = Arc::new(FakeMonitor {
            delete_status: Some(404),
            ..Default::default()
        });
        let check = deleting_check(&store, CHECK_ID).await?;

        let outcome = reconciler(store.clone(), monitor)?
            .reconcile(&check.key())
            .await?;

        assert_eq!(outcome, ReconcileOutcome::done());
        assert!(store.is_empty().await);
        Ok(())
    }

    /// Given a record marked for deletion
    /// When the external delete fails with anything but 404
    /// Then the error is returned and the finalizer stays
    #[tokio::test]
    async fn deletion_failure_keeps_finalizer() -> Result<()> {
        let store = Arc::new(InMemoryStore::new());
        let monitor = Arc::new(FakeMonitor {
            delete_status: Some(502),
            ..Default::default()
        });
        let check = deleting_check(&store, CHECK_ID).await?;

        let result = reconciler(store.clone(), monitor)?.reconcile(&check.key()).await;

        assert!(matches!(
            result,
            Err(Error::Monitor(vigil_healthchecks::Error::Api { status: 502, .. }))
        ));
        assert!(store.get(&check.key()).await?.metadata.has_finalizer(FINALIZER));
        Ok(())
    }

    /// Given a record marked for deletion without a recorded external ID
    /// When the external check exists under the record's name
    /// Then it is found by name and deleted
    #[tokio::test]
    async fn deletion_without_id_looks_up_by_name() -> Result<()> {
        let store = Arc::new(InMemoryStore::new());
        let monitor = Arc::new(FakeMonitor {
            existing: vec![
                HealthcheckResponse {
                    name: "other/check".into(),
                    update_url: "https://healthchecks.io/api/v1/checks/zzz".into(),
                    ..Default::default()
                },
                HealthcheckResponse {
                    name: "testnamespace/example".into(),
                    update_url: "https://healthchecks.io/api/v1/checks/abc".into(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        });
        let check = deleting_check(&store, "").await?;

        reconciler(store.clone(), monitor.clone())?
            .reconcile(&check.key())
            .await?;

        assert_eq!(monitor.deletes(), vec!["abc".to_string()]);
        assert!(store.is_empty().await);
        Ok(())
    }

    /// Given a record marked for deletion that never reached the service
    /// When it is reconciled
    /// Then nothing is deleted and the finalizer is released
    #[tokio::test]
    async fn deletion_without_external_check_releases_record() -> Result<()> {
        let store = Arc::new(InMemoryStore::new());
        let monitor = Arc::new(FakeMonitor::default());
        let check = deleting_check(&store, "").await?;

        reconciler(store.clone(), monitor.clone())?
            .reconcile(&check.key())
            .await?;

        assert!(monitor.deletes().is_empty());
        assert!(store.is_empty().await);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_external_maps_status_codes() -> Result<()> {
        let store = Arc::new(InMemoryStore::new());
        let mut check = Check::new("ops", "backup", CheckSpec::default());
        check.status.id = "abc".into();

        for (status, ok) in [(200, true), (404, true), (500, false), (502, false), (403, false)] {
            let monitor = Arc::new(FakeMonitor {
                delete_status: Some(status),
                ..Default::default()
            });
            let result = reconciler(store.clone(), monitor)?.delete_external(&check).await;
            assert_eq!(result.is_ok(), ok, "status {status}");
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_name_prefix_applies_to_upsert_and_lookup() -> Result<()> {
        let store = Arc::new(InMemoryStore::new());
        let monitor = Arc::new(FakeMonitor {
            existing: vec![HealthcheckResponse {
                name: "cluster-a/ops/backup".into(),
                update_url: "https://healthchecks.io/api/v1/checks/abc".into(),
                ..Default::default()
            }],
            ..Default::default()
        });
        let key = store
            .create(Check::new("ops", "backup", CheckSpec::default()))
            .await?
            .key();
        let reconciler = ReconcilerBuilder::new()
            .with_store(store.clone())
            .with_monitor(monitor.clone())
            .name_prefix("cluster-a/")
            .build(&scheme())?;

        reconciler.reconcile(&key).await?;
        assert_eq!(
            monitor.upserts().first().map(|u| u.name.clone()),
            Some("cluster-a/ops/backup".to_string())
        );

        let check = Check::new("ops", "backup", CheckSpec::default());
        reconciler.delete_external(&check).await?;
        assert_eq!(monitor.deletes(), vec!["abc".to_string()]);
        Ok(())
    }

    #[test]
    fn test_build_requires_registered_kind() {
        let result = ReconcilerBuilder::new()
            .with_store(Arc::new(InMemoryStore::new()))
            .with_monitor(Arc::new(FakeMonitor::default()))
            .build(&Registry::new());

        assert!(matches!(result, Err(Error::InvalidConfig { .. })));
    }

    #[test]
    fn test_build_requires_collaborators() {
        let result = ReconcilerBuilder::new().build(&scheme());
        assert!(matches!(result, Err(Error::InvalidConfig { .. })));
    }

    #[test]
    fn test_builder_config() {
        let reconciler = ReconcilerBuilder::new()
            .with_store(Arc::new(InMemoryStore::new()))
            .with_monitor(Arc::new(FakeMonitor::default()))
            .requeue_after(Duration::from_secs(5))
            .build(&scheme());

        assert_eq!(
            reconciler.ok().map(|r| r.config().requeue_after),
            Some(Duration::from_secs(5))
        );
    }
}
