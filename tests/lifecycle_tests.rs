//! Integration tests for the cache lifecycle.
//!
//! An in-memory store and a manual clock make staleness deterministic; the
//! JSON file store is exercised against a temporary directory.

use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use herakles_proc_probe::error::Result;
use herakles_proc_probe::{
    CacheManager, Clock, JsonFileStore, ProbeError, RecordStore, Snapshot, StatsRecord,
    SystemClock, DEFAULT_CACHE_TTL,
};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;
use tempfile::TempDir;

/// Clock whose time only moves when a test advances it.
#[derive(Clone)]
struct ManualClock {
    now: Rc<Cell<DateTime<Utc>>>,
}

impl ManualClock {
    fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(
                Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap(),
            )),
        }
    }

    fn advance(&self, secs: i64) {
        self.now.set(self.now.get() + ChronoDuration::seconds(secs));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

/// Store keeping records in memory, stamped with the manual clock on write.
#[derive(Clone)]
struct MemoryStore {
    clock: ManualClock,
    records: Rc<RefCell<HashMap<PathBuf, (StatsRecord, DateTime<Utc>)>>>,
    writes: Rc<Cell<usize>>,
}

impl MemoryStore {
    fn new(clock: ManualClock) -> Self {
        Self {
            clock,
            records: Rc::new(RefCell::new(HashMap::new())),
            writes: Rc::new(Cell::new(0)),
        }
    }

    fn writes(&self) -> usize {
        self.writes.get()
    }
}

impl RecordStore for MemoryStore {
    fn exists(&self, path: &Path) -> bool {
        self.records.borrow().contains_key(path)
    }

    fn read(&self, path: &Path) -> Result<StatsRecord> {
        self.records
            .borrow()
            .get(path)
            .map(|(record, _)| record.clone())
            .ok_or_else(|| {
                ProbeError::TargetNotFound(format!("no record at {}", path.display()))
            })
    }

    fn write(&self, path: &Path, record: &StatsRecord) -> Result<()> {
        self.writes.set(self.writes.get() + 1);
        self.records
            .borrow_mut()
            .insert(path.to_path_buf(), (record.clone(), self.clock.now()));
        Ok(())
    }

    fn modified_time(&self, path: &Path) -> Result<DateTime<Utc>> {
        self.records
            .borrow()
            .get(path)
            .map(|(_, modified)| *modified)
            .ok_or_else(|| {
                ProbeError::TargetNotFound(format!("no record at {}", path.display()))
            })
    }
}

fn snapshot(parent: u32, children: &[u32]) -> Snapshot {
    Snapshot {
        parent_pid: parent,
        child_pids: children.to_vec(),
    }
}

fn params(method: &str, value: &str) -> BTreeMap<String, String> {
    let mut p = BTreeMap::new();
    p.insert(method.to_string(), value.to_string());
    p
}

fn manager() -> (CacheManager<MemoryStore, ManualClock>, MemoryStore, ManualClock) {
    let clock = ManualClock::new();
    let store = MemoryStore::new(clock.clone());
    let manager = CacheManager::new(
        store.clone(),
        clock.clone(),
        Duration::from_secs(DEFAULT_CACHE_TTL),
    );
    (manager, store, clock)
}

#[test]
fn test_load_initializes_missing_cache() {
    let (manager, store, _) = manager();
    let path = Path::new("/cache/a.json");

    let record = manager.load(path).unwrap();
    assert_eq!(record, StatsRecord::new());
    assert!(store.exists(path));
    assert_eq!(store.writes(), 1);

    // A second load reads without writing
    manager.load(path).unwrap();
    assert_eq!(store.writes(), 1);
}

#[test]
fn test_first_refresh_returns_fresh_zero_record() {
    let (manager, store, _) = manager();
    let path = Path::new("/cache/a.json");

    let record = manager
        .refresh(path, &snapshot(100, &[1, 2, 3]), &params("pid", "100"))
        .unwrap();

    // The cache was created just now, so it is fresh and returned as-is
    assert_eq!(record, StatsRecord::new());
    assert_eq!(store.writes(), 1);
}

#[test]
fn test_refresh_after_ttl_compares_and_persists() {
    let (manager, store, clock) = manager();
    let path = Path::new("/cache/a.json");
    manager.load(path).unwrap();

    clock.advance(60);
    let record = manager
        .refresh(path, &snapshot(100, &[1, 2, 3]), &params("pid", "100"))
        .unwrap();

    // Absent previous parent counts as a restart
    assert_eq!(record.parent_restart_count, 1);
    assert_eq!(record.parent_pid, Some(100));
    assert_eq!(record.child_pids, vec![1, 2, 3]);
    assert_eq!(record.child_count, 3);
    assert_eq!(record.params, params("pid", "100"));
    assert_eq!(store.read(path).unwrap(), record);
    assert_eq!(store.writes(), 2);
}

#[test]
fn test_refresh_within_ttl_is_gated() {
    let (manager, store, clock) = manager();
    let path = Path::new("/cache/a.json");
    manager.load(path).unwrap();

    clock.advance(60);
    let first = manager
        .refresh(path, &snapshot(100, &[1, 2, 3]), &params("pid", "100"))
        .unwrap();
    let writes = store.writes();

    clock.advance(30);
    let second = manager
        .refresh(path, &snapshot(200, &[7, 8]), &params("pid", "200"))
        .unwrap();

    assert_eq!(second, first);
    assert_eq!(store.writes(), writes);
}

#[test]
fn test_ttl_boundary_is_inclusive() {
    let (manager, _, clock) = manager();
    let path = Path::new("/cache/a.json");
    manager.load(path).unwrap();

    clock.advance(DEFAULT_CACHE_TTL as i64);
    assert!(manager.is_fresh(path).unwrap());

    clock.advance(1);
    assert!(!manager.is_fresh(path).unwrap());
}

#[test]
fn test_polling_sequence() {
    let (manager, _, clock) = manager();
    let path = Path::new("/cache/a.json");
    let p = params("systemd", "nginx");
    manager.load(path).unwrap();

    clock.advance(60);
    manager.refresh(path, &snapshot(100, &[1, 2, 3]), &p).unwrap();

    clock.advance(60);
    let reloaded = manager.refresh(path, &snapshot(100, &[4, 5, 6]), &p).unwrap();
    assert_eq!(reloaded.parent_restart_count, 2);

    clock.advance(60);
    let crashed = manager.refresh(path, &snapshot(100, &[4, 5, 9]), &p).unwrap();
    assert_eq!(crashed.parent_restart_count, 2);
    assert_eq!(crashed.child_crash_count, 1);

    clock.advance(60);
    let no_children = manager.refresh(path, &snapshot(100, &[]), &p).unwrap();
    assert_eq!(no_children.child_crash_count, 1);
    assert_eq!(no_children.child_count, 0);
    assert!(no_children.child_pids.is_empty());
}

#[test]
fn test_separate_paths_are_independent() {
    let (manager, _, clock) = manager();
    let a = Path::new("/cache/a.json");
    let b = Path::new("/cache/b.json");
    manager.load(a).unwrap();
    manager.load(b).unwrap();

    clock.advance(60);
    manager.refresh(a, &snapshot(1, &[2]), &params("pid", "1")).unwrap();

    assert_eq!(manager.load(b).unwrap(), StatsRecord::new());
}

#[test]
fn test_file_store_lifecycle() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("probe.json");
    let manager = CacheManager::new(JsonFileStore, SystemClock, Duration::from_secs(0));

    manager.load(&path).unwrap();
    assert!(path.is_file());

    // With a zero TTL the cache is stale once any time has passed
    std::thread::sleep(Duration::from_millis(50));
    let record = manager
        .refresh(&path, &snapshot(100, &[1, 2]), &params("pid", "100"))
        .unwrap();
    assert_eq!(record.parent_pid, Some(100));

    let on_disk: StatsRecord =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(on_disk, record);
}

#[test]
fn test_corrupt_cache_is_fatal() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("probe.json");
    fs::write(&path, "not a record").unwrap();

    let manager = CacheManager::new(
        JsonFileStore,
        SystemClock,
        Duration::from_secs(DEFAULT_CACHE_TTL),
    );

    let result = manager.refresh(&path, &snapshot(100, &[1]), &params("pid", "100"));
    assert!(matches!(result, Err(ProbeError::CacheCorrupt { .. })));

    // The corrupt file is left untouched
    assert_eq!(fs::read_to_string(&path).unwrap(), "not a record");
}

#[test]
fn test_cache_with_missing_fields_is_corrupt() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("probe.json");
    fs::write(&path, r#"{"parent_pid": 1}"#).unwrap();

    assert!(matches!(
        JsonFileStore.read(&path),
        Err(ProbeError::CacheCorrupt { .. })
    ));
}
