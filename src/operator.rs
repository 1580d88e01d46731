//! Process bootstrap for the `run`, `validate` and `channels` commands.
//!
//! `run` starts in this order:
//!
//! 1. **Registry** - bind the `Check` kind
//! 2. **Client** - healthchecks.io API client
//! 3. **Store** - open the state file and apply the manifest once
//! 4. **Reconciler** - wired to the store, client and system clock
//! 5. **Loop and manifest poller** - run until the shutdown future resolves

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use vigil_core::{Check, Registry, load_manifest_file, scheme};
use vigil_healthchecks::{HealthcheckChannel, HealthchecksClient, HealthchecksConfig};
use vigil_reconciler::{ReconcilerBuilder, ReconciliationLoop};

use crate::config::OperatorConfig;
use crate::store::{FileStore, SyncReport};

/// Parse and validate a manifest. Returns the declared checks.
///
/// # Errors
///
/// Returns an error if the file cannot be read or a document is invalid.
pub fn validate(manifest: &Path) -> Result<Vec<Check>> {
    load_manifest_file(manifest, &scheme())
        .with_context(|| format!("invalid manifest {}", manifest.display()))
}

/// List the notification channels of the project.
///
/// # Errors
///
/// Returns an error if the client cannot be built or the request fails.
pub async fn list_channels(config: HealthchecksConfig) -> Result<Vec<HealthcheckChannel>> {
    let client = HealthchecksClient::with_config(config).context("failed to build healthchecks client")?;
    client.list_channels().await.context("failed to list channels")
}

/// Reconcile until `shutdown` resolves, then stop gracefully.
///
/// # Errors
///
/// Returns an error if any startup step fails. Errors after startup are
/// logged and retried.
pub async fn run<F>(config: OperatorConfig, shutdown: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    info!(
        manifest = %config.manifest.display(),
        state_file = %config.state_file.display(),
        reconcile_interval = ?config.reconciler.requeue_after,
        name_prefix = %config.reconciler.name_prefix,
        max_concurrent = config.reconciliation.max_concurrent,
        "configuration"
    );

    let registry = scheme();
    let client = HealthchecksClient::with_config(config.healthchecks.clone())
        .context("failed to build healthchecks client")?;

    let store = Arc::new(
        FileStore::open(&config.state_file)
            .await
            .context("failed to open state file")?,
    );
    sync_manifest(&store, &config.manifest, &registry)
        .await
        .context("initial manifest sync failed")?;

    let reconciler = ReconcilerBuilder::new()
        .with_store(store.clone())
        .with_monitor(Arc::new(client))
        .with_config(config.reconciler.clone())
        .build(&registry)
        .context("failed to build reconciler")?;

    let mut reconciliation = ReconciliationLoop::new(
        Arc::new(reconciler),
        store.clone(),
        config.reconciliation.clone(),
    );
    let stopper = reconciliation.stopper();
    let loop_handle = tokio::spawn(async move { reconciliation.run().await });

    let (stop_tx, stop_rx) = watch::channel(false);
    let poll_handle = tokio::spawn(poll_manifest(
        store,
        config.manifest.clone(),
        registry,
        config.manifest_poll_interval,
        stop_rx,
    ));

    info!("vigil is running");
    shutdown.await;

    info!("shutting down");
    stopper.stop();
    let _ = stop_tx.send(true);
    loop_handle.await.context("reconciliation loop panicked")?;
    poll_handle.await.context("manifest poller panicked")?;

    info!("vigil stopped gracefully");
    Ok(())
}

/// Read the manifest and apply it to the store.
async fn sync_manifest(store: &FileStore, manifest: &Path, registry: &Registry) -> Result<SyncReport> {
    let declared = load_manifest_file(manifest, registry)?;
    debug!(declared = declared.len(), "loaded manifest");
    Ok(store.sync_manifest(declared, Utc::now()).await?)
}

/// Re-apply the manifest every `interval` until stopped.
///
/// A manifest that fails to parse leaves the store untouched.
async fn poll_manifest(
    store: Arc<FileStore>,
    manifest: PathBuf,
    registry: Registry,
    interval: Duration,
    mut stop_rx: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = sync_manifest(&store, &manifest, &registry).await {
                    warn!(error = %format!("{e:#}"), "manifest sync failed, keeping current records");
                }
            }
            changed = stop_rx.changed() => {
                if changed.is_err() || *stop_rx.borrow() {
                    debug!("manifest poller stopped");
                    return;
                }
            }
        }
    }
}
