//! # Permission Service
//!
//! Owns the live snapshot handle and the refresh cycle.
//!
//! ## Refresh Cycle
//!
//! 1. Fetch the full record list from the `AuthorizationSource` (no lock held)
//! 2. Build a complete `PermissionSnapshot` off to the side
//! 3. Publish it with a single pointer swap
//!
//! A failure at step 1 leaves the previous snapshot in effect.

use crate::domain::authorizer::{Decision, ParcelAuthorizer};
use crate::domain::errors::PermissionError;
use crate::domain::snapshot::PermissionSnapshot;
use crate::ports::inbound::PermissionApi;
use crate::ports::outbound::AuthorizationSource;
use chrono::Utc;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info};

/// Summary of a successful refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshReport {
    pub generation: u64,
    pub records: usize,
    pub active_records: usize,
    pub identities: usize,
    pub plots_dropped: usize,
}

/// Live permission table plus the source it is refreshed from.
pub struct PermissionService {
    current: RwLock<Arc<PermissionSnapshot>>,
    source: Arc<dyn AuthorizationSource>,
    next_generation: AtomicU64,
    authorizer: ParcelAuthorizer,
}

impl PermissionService {
    /// Create a service whose table is empty until the first refresh.
    pub fn new(source: Arc<dyn AuthorizationSource>) -> Self {
        Self {
            current: RwLock::new(Arc::new(PermissionSnapshot::empty())),
            source,
            next_generation: AtomicU64::new(1),
            authorizer: ParcelAuthorizer::new(),
        }
    }

    /// Replace the live snapshot.
    ///
    /// The write lock covers only the pointer assignment; readers holding the
    /// previous `Arc` keep using it undisturbed.
    pub fn publish(&self, snapshot: PermissionSnapshot) {
        let snapshot = Arc::new(snapshot);
        *self.current.write() = snapshot;
    }

    /// Fetch, rebuild and publish. On failure the old snapshot is kept.
    pub async fn refresh(&self) -> Result<RefreshReport, PermissionError> {
        let records = match self.source.fetch().await {
            Ok(records) => records,
            Err(source) => {
                return Err(PermissionError::SnapshotRefreshFailed {
                    kept_generation: self.snapshot().generation(),
                    source,
                });
            }
        };

        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let snapshot = PermissionSnapshot::build(&records, Utc::now(), generation);
        let stats = snapshot.stats();
        let report = RefreshReport {
            generation,
            records: stats.records_total,
            active_records: stats.records_active,
            identities: snapshot.identity_count(),
            plots_dropped: stats.plots_dropped,
        };

        self.publish(snapshot);
        Ok(report)
    }

    /// Refresh and log the outcome. Never fails.
    pub async fn refresh_logged(&self) {
        match self.refresh().await {
            Ok(report) => info!(
                source = %self.source.describe(),
                generation = report.generation,
                records = report.records,
                active = report.active_records,
                identities = report.identities,
                plots_dropped = report.plots_dropped,
                "Permission snapshot refreshed"
            ),
            Err(e) => error!(
                source = %self.source.describe(),
                error = %e,
                "Permission snapshot refresh failed"
            ),
        }
    }
}

impl PermissionApi for PermissionService {
    fn snapshot(&self) -> Arc<PermissionSnapshot> {
        Arc::clone(&self.current.read())
    }

    fn authorize(&self, identity: &str, claimed: &[String]) -> Decision {
        let snapshot = self.snapshot();
        self.authorizer.authorize(&snapshot, identity, claimed)
    }
}

/// Background task: refresh on a fixed interval until shutdown is signalled.
///
/// The startup load is expected to have happened already, so the first
/// immediate tick is skipped.
pub async fn refresh_task(
    service: Arc<PermissionService>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                service.refresh_logged().await;
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    debug!("Permission refresh task stopping");
                    break;
                }
            }
        }
    }
}
