//! The persisted stats record.
//!
//! One record exists per monitored target. It holds the last observed PID
//! snapshot together with the cumulative restart and crash counters.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A point-in-time observation of a parent and its direct children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub parent_pid: u32,
    pub child_pids: Vec<u32>,
}

/// Cumulative counters plus the most recent snapshot of a monitored target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsRecord {
    /// Last observed parent PID (`None` until the first comparison).
    pub parent_pid: Option<u32>,
    pub parent_restart_count: u64,
    /// Always `child_pids.len()`.
    pub child_count: usize,
    pub child_crash_count: u64,
    /// Last observed child set, never a history.
    pub child_pids: Vec<u32>,
    /// Acquisition method name mapped to the value it was given.
    pub params: BTreeMap<String, String>,
}

impl StatsRecord {
    /// A zero-valued record, as written when no cache exists yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the stored snapshot, keeping `child_count` in step.
    pub fn set_snapshot(&mut self, parent_pid: u32, child_pids: &[u32]) {
        self.parent_pid = Some(parent_pid);
        self.child_pids = child_pids.to_vec();
        self.child_count = self.child_pids.len();
    }

    /// Looks up a single field by its serialized name.
    pub fn field(&self, key: &str) -> Option<serde_json::Value> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(mut map)) => map.remove(key),
            _ => None,
        }
    }
}
