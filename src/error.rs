//! Error taxonomy for the probe.
//!
//! Usage errors are reported by clap before any of these can occur.

use std::path::PathBuf;

/// Fatal conditions raised while acquiring a snapshot or maintaining the cache.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("Target process not found: {0}")]
    TargetNotFound(String),

    #[error("Cache file {path} is corrupt: {source}")]
    CacheCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode stats record for {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid pid file {path}: {reason}")]
    InvalidPidFile { path: PathBuf, reason: String },

    #[error("systemd query for '{unit}' failed: {reason}")]
    Systemd { unit: String, reason: String },

    #[error("Invalid process match pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Unknown record field '{0}'")]
    UnknownKey(String),
}

impl ProbeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ProbeError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ProbeError>;
