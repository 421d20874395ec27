//! Herakles Process Probe Library
//!
//! Infers parent process restarts and child process crashes from two PID
//! snapshots: the one persisted by the previous invocation and the one
//! observed now. Designed for monitors that poll a short-lived probe on a
//! fixed interval.
//!
//! # Usage
//!
//! ```rust,no_run
//! use herakles_proc_probe::{
//!     CacheManager, JsonFileStore, PidSource, ProcSnapshotProvider, SnapshotProvider,
//!     SystemClock, DEFAULT_CACHE_TTL,
//! };
//! use std::path::Path;
//! use std::time::Duration;
//!
//! let provider = ProcSnapshotProvider::new(PidSource::Systemd("nginx".into()));
//! let snapshot = provider.provide()?;
//!
//! let manager = CacheManager::new(
//!     JsonFileStore,
//!     SystemClock,
//!     Duration::from_secs(DEFAULT_CACHE_TTL),
//! );
//! let record = manager.refresh(
//!     Path::new("/tmp/nginx-probe.json"),
//!     &snapshot,
//!     &provider.params(),
//! )?;
//! println!("restarts: {}", record.parent_restart_count);
//! # Ok::<(), herakles_proc_probe::ProbeError>(())
//! ```

pub mod clock;
pub mod compare;
pub mod error;
pub mod lifecycle;
pub mod process;
pub mod stats;
pub mod store;

// Re-export main types for convenience
pub use clock::{Clock, SystemClock};
pub use error::ProbeError;
pub use lifecycle::{is_fresh_at, CacheManager, DEFAULT_CACHE_TTL};
pub use process::{PidSource, ProcSnapshotProvider, SnapshotProvider, SystemdQuery};
pub use stats::{Snapshot, StatsRecord};
pub use store::{JsonFileStore, RecordStore};
