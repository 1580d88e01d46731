//! Requeue-driven reconciliation loop.
//!
//! Keeps one schedule entry per key. A key is due when it is new, when its
//! resource version changed, when its requeue delay elapsed, or when its error
//! backoff elapsed. Due keys are reconciled concurrently up to
//! `max_concurrent`; a key is never reconciled twice at the same time because
//! each tick waits for its whole batch.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use itertools::Itertools;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};
use vigil_core::ObjectKey;

use crate::error::{Result, StoreResult};
use crate::reconciler::{Reconcile, ReconcileOutcome};

/// Configuration for the reconciliation loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopConfig {
    /// How often the key source is polled for new and changed keys.
    pub poll_interval: Duration,
    /// Maximum number of keys reconciled at once.
    pub max_concurrent: usize,
    /// Delay after the first consecutive failure.
    pub backoff_base: Duration,
    /// Upper bound for the failure delay.
    pub backoff_max: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            max_concurrent: 4,
            backoff_base: Duration::from_secs(1),
            backoff_max: Duration::from_secs(300),
        }
    }
}

/// Source of the keys to reconcile.
#[async_trait]
pub trait KeySource: Send + Sync {
    /// Every current key with its resource version.
    async fn list_keys(&self) -> StoreResult<Vec<(ObjectKey, u64)>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Schedule {
    due: Option<Instant>,
    failures: u32,
    version: u64,
}

/// Continuous reconciliation loop.
pub struct ReconciliationLoop {
    reconciler: Arc<dyn Reconcile>,
    source: Arc<dyn KeySource>,
    config: LoopConfig,
    schedule: HashMap<ObjectKey, Schedule>,
    stop_rx: watch::Receiver<bool>,
    stop_tx: watch::Sender<bool>,
}

impl ReconciliationLoop {
    /// Create a new reconciliation loop.
    pub fn new(reconciler: Arc<dyn Reconcile>, source: Arc<dyn KeySource>, config: LoopConfig) -> Self {
        let (stop_tx, stop_rx) = watch::channel(false);
        Self {
            reconciler,
            source,
            config,
            schedule: HashMap::new(),
            stop_rx,
            stop_tx,
        }
    }

    /// Run until stopped.
    pub async fn run(&mut self) {
        info!(
            poll_interval_ms = self.config.poll_interval.as_millis(),
            max_concurrent = self.config.max_concurrent,
            "starting reconciliation loop"
        );

        let mut interval = tokio::time::interval(self.config.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.tick().await;
                }
                changed = self.stop_rx.changed() => {
                    if changed.is_err() || *self.stop_rx.borrow() {
                        info!("reconciliation loop stopped");
                        return;
                    }
                }
            }
        }
    }

    /// Refresh keys and reconcile everything due. Returns how many keys ran.
    pub async fn tick(&mut self) -> usize {
        self.refresh(Instant::now()).await;

        let now = Instant::now();
        let due: Vec<ObjectKey> = self
            .schedule
            .iter()
            .filter_map(|(key, entry)| entry.due.filter(|at| *at <= now).map(|at| (at, key)))
            .sorted()
            .take(self.config.max_concurrent.max(1))
            .map(|(_, key)| key.clone())
            .collect();

        if due.is_empty() {
            return 0;
        }
        debug!(count = due.len(), "reconciling due keys");

        let reconciler = Arc::clone(&self.reconciler);
        let results = join_all(due.into_iter().map(|key| {
            let reconciler = Arc::clone(&reconciler);
            async move {
                let result = reconciler.reconcile(&key).await;
                (key, result)
            }
        }))
        .await;

        let ran = results.len();
        let finished = Instant::now();
        for (key, result) in results {
            self.record(&key, result, finished);
        }
        ran
    }

    /// Track new, changed and removed keys.
    async fn refresh(&mut self, now: Instant) {
        let keys: HashMap<ObjectKey, u64> = match self.source.list_keys().await {
            Ok(keys) => keys.into_iter().collect(),
            Err(e) => {
                warn!(error = %e, "failed to list keys");
                return;
            }
        };

        self.schedule.retain(|key, _| keys.contains_key(key));

        for (key, version) in keys {
            match self.schedule.entry(key) {
                Entry::Vacant(slot) => {
                    debug!(check = %slot.key(), "tracking new key");
                    slot.insert(Schedule {
                        due: Some(now),
                        failures: 0,
                        version,
                    });
                }
                Entry::Occupied(mut slot) => {
                    let entry = slot.get_mut();
                    if entry.version != version {
                        entry.version = version;
                        // a failing key keeps its backoff
                        if entry.failures == 0 || entry.due.is_none() {
                            entry.due = Some(now);
                        }
                    }
                }
            }
        }
    }

    fn record(&mut self, key: &ObjectKey, result: Result<ReconcileOutcome>, now: Instant) {
        let Some(entry) = self.schedule.get_mut(key) else {
            return;
        };

        match result {
            Ok(outcome) => {
                entry.failures = 0;
                entry.due = outcome.requeue_after.map(|delay| later(now, delay));
                debug!(check = %key, requeue_after = ?outcome.requeue_after, "reconciled");
            }
            Err(e) => {
                entry.failures = entry.failures.saturating_add(1);
                let delay = backoff_delay(&self.config, entry.failures);
                entry.due = Some(later(now, delay));
                error!(
                    check = %key,
                    error = %e,
                    failures = entry.failures,
                    retry_in_ms = delay.as_millis(),
                    "reconcile failed"
                );
            }
        }
    }

    /// Stop the loop.
    pub fn stop(&self) {
        if self.stop_tx.send(true).is_err() {
            debug!("reconciliation loop already stopped");
        }
    }

    /// Get a stopper handle.
    pub fn stopper(&self) -> LoopStopper {
        LoopStopper {
            stop_tx: self.stop_tx.clone(),
        }
    }
}

/// Handle to stop a reconciliation loop.
#[derive(Debug, Clone)]
pub struct LoopStopper {
    stop_tx: watch::Sender<bool>,
}

impl LoopStopper {
    /// Stop the loop.
    pub fn stop(&self) {
        if self.stop_tx.send(true).is_err() {
            debug!("reconciliation loop already stopped");
        }
    }
}

/// Delay after `failures` consecutive failures: base, doubling, capped.
fn backoff_delay(config: &LoopConfig, failures: u32) -> Duration {
    let factor = 2_u32.saturating_pow(failures.saturating_sub(1));
    config
        .backoff_base
        .saturating_mul(factor)
        .min(config.backoff_max)
}

fn later(now: Instant, delay: Duration) -> Instant {
    now.checked_add(delay).unwrap_or(now)
}
