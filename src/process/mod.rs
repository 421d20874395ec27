//! Snapshot acquisition from the process table.
//!
//! This module provides:
//! - `scanner`: /proc traversal, stat parsing, child discovery
//! - `source`: the four parent PID acquisition methods
//! - `systemd`: MainPID lookup via systemctl

pub mod scanner;
pub mod source;
pub mod systemd;

use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::error::{ProbeError, Result};
use crate::stats::Snapshot;

// Re-export commonly used types
pub use scanner::{collect_proc_entries, find_children, is_alive, read_stat, DEFAULT_PROC_ROOT};
pub use source::PidSource;
pub use systemd::SystemdQuery;

/// Produces the current parent/children observation.
pub trait SnapshotProvider {
    fn provide(&self) -> Result<Snapshot>;

    /// Acquisition provenance stored alongside the record.
    fn params(&self) -> BTreeMap<String, String>;
}

/// Snapshot provider backed by a /proc filesystem.
#[derive(Debug, Clone)]
pub struct ProcSnapshotProvider {
    pub source: PidSource,
    pub proc_root: PathBuf,
    pub systemd: SystemdQuery,
}

impl ProcSnapshotProvider {
    pub fn new(source: PidSource) -> Self {
        Self {
            source,
            proc_root: PathBuf::from(DEFAULT_PROC_ROOT),
            systemd: SystemdQuery::default(),
        }
    }

    pub fn with_proc_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.proc_root = root.into();
        self
    }

    pub fn with_systemd(mut self, systemd: SystemdQuery) -> Self {
        self.systemd = systemd;
        self
    }
}

impl SnapshotProvider for ProcSnapshotProvider {
    fn provide(&self) -> Result<Snapshot> {
        let parent_pid = self.source.resolve(&self.proc_root, &self.systemd)?;

        if !is_alive(&self.proc_root, parent_pid) {
            return Err(ProbeError::TargetNotFound(format!(
                "pid {} ({} {}) is not running",
                parent_pid,
                self.source.method(),
                self.source.value()
            )));
        }

        let child_pids = find_children(&self.proc_root, parent_pid);
        if child_pids.is_empty() {
            warn!("No child processes found for pid {}", parent_pid);
        } else {
            debug!("pid {} has {} children", parent_pid, child_pids.len());
        }

        Ok(Snapshot {
            parent_pid,
            child_pids,
        })
    }

    fn params(&self) -> BTreeMap<String, String> {
        let mut params = BTreeMap::new();
        params.insert(self.source.method().to_string(), self.source.value());
        params
    }
}
