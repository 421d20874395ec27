//! Cache lifecycle for stateless invocations.
//!
//! Each invocation either reuses the persisted record verbatim, when it is
//! younger than the TTL, or compares it against a fresh snapshot and writes
//! the result back. The TTL sits just under the polling interval of the
//! monitor so each poll normally recomputes once.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::clock::Clock;
use crate::compare;
use crate::error::Result;
use crate::stats::{Snapshot, StatsRecord};
use crate::store::RecordStore;

/// Default freshness window in seconds.
pub const DEFAULT_CACHE_TTL: u64 = 55;

/// True iff `now - modified <= ttl`. A timestamp in the future counts as fresh.
pub fn is_fresh_at(modified: DateTime<Utc>, now: DateTime<Utc>, ttl: Duration) -> bool {
    match (now - modified).to_std() {
        Ok(age) => age <= ttl,
        Err(_) => true,
    }
}

/// Owns the stats record of one or more cache paths.
pub struct CacheManager<S, C> {
    store: S,
    clock: C,
    ttl: Duration,
}

impl<S: RecordStore, C: Clock> CacheManager<S, C> {
    pub fn new(store: S, clock: C, ttl: Duration) -> Self {
        Self { store, clock, ttl }
    }

    /// Loads the record at `path`, first persisting a zero record if none exists.
    pub fn load(&self, path: &Path) -> Result<StatsRecord> {
        if !self.store.exists(path) {
            debug!("No cache at {}, initializing", path.display());
            self.store.write(path, &StatsRecord::new())?;
        }
        self.store.read(path)
    }

    pub fn is_fresh(&self, path: &Path) -> Result<bool> {
        let modified = self.store.modified_time(path)?;
        Ok(is_fresh_at(modified, self.clock.now(), self.ttl))
    }

    /// Returns the cached record if fresh, otherwise the compared and persisted one.
    pub fn refresh(
        &self,
        path: &Path,
        snapshot: &Snapshot,
        params: &BTreeMap<String, String>,
    ) -> Result<StatsRecord> {
        let prev = self.load(path)?;

        if self.is_fresh(path)? {
            debug!(
                "Cache {} is younger than {}s, reusing",
                path.display(),
                self.ttl.as_secs()
            );
            return Ok(prev);
        }

        let mut next = compare::update(&prev, snapshot.parent_pid, &snapshot.child_pids);
        next.set_snapshot(snapshot.parent_pid, &snapshot.child_pids);
        next.params = params.clone();

        self.store.write(path, &next)?;
        Ok(next)
    }
}
