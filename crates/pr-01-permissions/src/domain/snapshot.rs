//! # Permission Snapshot
//!
//! Immutable mapping from normalized signer identity to the parcels it may
//! publish to. Built in one pass from the currently-valid records and never
//! mutated afterwards; a refresh produces a whole new snapshot.
//!
//! ## Invariants
//!
//! - Keys are lower-cased, trimmed identity strings.
//! - Values contain only coordinates that passed `ParcelCoord` validation.

use crate::domain::record::AuthorizationRecord;
use chrono::{DateTime, Utc};
use shared_types::ParcelCoord;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Counters collected while deriving a snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapshotStats {
    pub records_total: usize,
    pub records_active: usize,
    pub plots_dropped: usize,
}

/// An immutable, fully-built permission table.
#[derive(Debug, Clone)]
pub struct PermissionSnapshot {
    generation: u64,
    loaded_at: DateTime<Utc>,
    grants: HashMap<String, HashSet<ParcelCoord>>,
    stats: SnapshotStats,
}

/// Canonical lookup key for an identity.
pub fn normalize_identity(identity: &str) -> String {
    identity.trim().to_lowercase()
}

impl PermissionSnapshot {
    /// The table in effect before the first successful load: nobody is authorized.
    pub fn empty() -> Self {
        Self {
            generation: 0,
            loaded_at: Utc::now(),
            grants: HashMap::new(),
            stats: SnapshotStats::default(),
        }
    }

    /// Flatten the records that are active at `now` into a new snapshot.
    pub fn build(records: &[AuthorizationRecord], now: DateTime<Utc>, generation: u64) -> Self {
        let mut grants: HashMap<String, HashSet<ParcelCoord>> = HashMap::new();
        let mut stats = SnapshotStats {
            records_total: records.len(),
            ..SnapshotStats::default()
        };

        for record in records.iter().filter(|r| r.is_active_at(now)) {
            stats.records_active += 1;

            let mut parcels = HashSet::with_capacity(record.plots.len());
            for plot in &record.plots {
                match plot.parse::<ParcelCoord>() {
                    Ok(coord) => {
                        parcels.insert(coord);
                    }
                    Err(e) => {
                        stats.plots_dropped += 1;
                        debug!(record = %record.name, plot = %plot, error = %e, "Dropping invalid plot");
                    }
                }
            }

            for address in &record.addresses {
                grants
                    .entry(normalize_identity(address))
                    .or_default()
                    .extend(parcels.iter().copied());
            }
        }

        Self {
            generation,
            loaded_at: now,
            grants,
            stats,
        }
    }

    /// Parcels granted to `identity`, or `None` if it is not in the table.
    pub fn parcels_for(&self, identity: &str) -> Option<&HashSet<ParcelCoord>> {
        self.grants.get(&normalize_identity(identity))
    }

    pub fn contains_identity(&self, identity: &str) -> bool {
        self.grants.contains_key(&normalize_identity(identity))
    }

    pub fn identity_count(&self) -> usize {
        self.grants.len()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn stats(&self) -> SnapshotStats {
        self.stats
    }
}
