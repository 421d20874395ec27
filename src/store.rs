//! Persistence for the stats record.
//!
//! The record is written as pretty-printed JSON and always replaced in full.
//! There is no locking: concurrent writers to one path can lose updates.

use chrono::{DateTime, Utc};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::{ProbeError, Result};
use crate::stats::StatsRecord;

/// Storage backend for stats records, addressed by path.
pub trait RecordStore {
    fn exists(&self, path: &Path) -> bool;

    /// Reads the record, failing with `CacheCorrupt` on unparseable content.
    fn read(&self, path: &Path) -> Result<StatsRecord>;

    /// Overwrites whatever is stored at `path`.
    fn write(&self, path: &Path, record: &StatsRecord) -> Result<()>;

    fn modified_time(&self, path: &Path) -> Result<DateTime<Utc>>;
}

/// Stores each record as a JSON file on disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFileStore;

impl RecordStore for JsonFileStore {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read(&self, path: &Path) -> Result<StatsRecord> {
        let content = fs::read_to_string(path).map_err(|e| ProbeError::io(path, e))?;
        serde_json::from_str(&content).map_err(|e| ProbeError::CacheCorrupt {
            path: path.to_path_buf(),
            source: e,
        })
    }

    fn write(&self, path: &Path, record: &StatsRecord) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            if !dir.exists() {
                fs::create_dir_all(dir).map_err(|e| ProbeError::io(dir, e))?;
            }
        }

        let mut content = serde_json::to_string_pretty(record).map_err(|e| {
            ProbeError::Serialize {
                path: path.to_path_buf(),
                source: e,
            }
        })?;
        content.push('\n');

        fs::write(path, content).map_err(|e| ProbeError::io(path, e))?;
        debug!("Wrote stats record to {}", path.display());
        Ok(())
    }

    fn modified_time(&self, path: &Path) -> Result<DateTime<Utc>> {
        let modified = fs::metadata(path)
            .and_then(|meta| meta.modified())
            .map_err(|e| ProbeError::io(path, e))?;
        Ok(DateTime::<Utc>::from(modified))
    }
}
