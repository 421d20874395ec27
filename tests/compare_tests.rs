//! Integration tests for the snapshot comparator.
//!
//! These tests walk through the restart/reload/crash scenarios and the
//! properties every update must keep.

use herakles_proc_probe::compare::{diff_count, update};
use herakles_proc_probe::StatsRecord;

/// Helper function to create a record with a known snapshot.
fn record(parent: u32, children: &[u32]) -> StatsRecord {
    let mut r = StatsRecord::new();
    r.set_snapshot(parent, children);
    r
}

#[test]
fn test_unchanged_snapshot() {
    let prev = record(100, &[1, 2, 3]);
    let next = update(&prev, 100, &[1, 2, 3]);

    assert_eq!(next.parent_restart_count, 0);
    assert_eq!(next.child_crash_count, 0);
    assert_eq!(next.child_pids, vec![1, 2, 3]);
    assert_eq!(next.child_count, 3);
}

#[test]
fn test_reload_recycles_all_children() {
    let prev = record(100, &[1, 2, 3]);
    let next = update(&prev, 100, &[4, 5, 6]);

    assert_eq!(next.parent_restart_count, 1);
    assert_eq!(next.child_crash_count, 0);
    assert_eq!(next.child_pids, vec![4, 5, 6]);
}

#[test]
fn test_child_crashed_not_replaced() {
    let prev = record(100, &[1, 2, 3]);
    let next = update(&prev, 100, &[1, 2]);

    assert_eq!(next.parent_restart_count, 0);
    assert_eq!(next.child_crash_count, 0);
    assert_eq!(next.child_count, 2);
}

#[test]
fn test_parent_restart_with_doubled_children() {
    let prev = record(100, &[1, 2]);
    let next = update(&prev, 200, &[10, 20, 30, 40]);

    // +1 for the PID change, +1 for the 4/2 ratio
    assert_eq!(next.parent_restart_count, 2);
    assert_eq!(next.child_crash_count, 0);
    assert_eq!(next.parent_pid, Some(200));
}

#[test]
fn test_crash_during_growth() {
    let prev = record(100, &[1, 2]);
    let next = update(&prev, 100, &[1, 3, 4]);

    assert_eq!(next.parent_restart_count, 0);
    assert_eq!(next.child_crash_count, 1);
    assert_eq!(next.child_count, 3);
}

#[test]
fn test_partial_replacement_same_size() {
    let prev = record(100, &[1, 2, 3, 4]);
    let next = update(&prev, 100, &[1, 2, 7, 8]);

    assert_eq!(next.parent_restart_count, 0);
    assert_eq!(next.child_crash_count, 2);
}

#[test]
fn test_first_comparison_counts_as_restart() {
    let prev = StatsRecord::new();
    let next = update(&prev, 100, &[1, 2]);

    assert_eq!(next.parent_restart_count, 1);
    assert_eq!(next.child_crash_count, 0);
    assert_eq!(next.parent_pid, Some(100));
}

#[test]
fn test_counters_accumulate_across_updates() {
    let mut r = record(100, &[1, 2, 3]);
    r.parent_restart_count = 7;
    r.child_crash_count = 11;

    let r = update(&r, 100, &[1, 2, 9]); // one crash
    let r = update(&r, 300, &[20, 21, 22]); // restart
    let r = update(&r, 300, &[20, 21, 22]); // nothing

    assert_eq!(r.parent_restart_count, 8);
    assert_eq!(r.child_crash_count, 12);
}

#[test]
fn test_monotonic_over_sequence() {
    let snapshots: &[(u32, &[u32])] = &[
        (100, &[1, 2, 3]),
        (100, &[]),
        (100, &[4]),
        (101, &[4, 5, 6, 7, 8, 9]),
        (101, &[4, 5]),
        (101, &[6, 7]),
        (102, &[6, 7, 6]),
        (102, &[1]),
        (100, &[1, 2, 3, 4, 5, 6, 7]),
        (100, &[]),
    ];

    let mut current = StatsRecord::new();
    for (parent, children) in snapshots {
        let next = update(&current, *parent, children);
        assert!(next.parent_restart_count >= current.parent_restart_count);
        assert!(next.child_crash_count >= current.child_crash_count);
        assert_eq!(next.child_count, next.child_pids.len());
        assert_eq!(next.child_pids, children.to_vec());
        current = next;
    }
}

#[test]
fn test_idempotent_for_unchanged_snapshots() {
    let cases: &[(u32, &[u32])] = &[(1, &[2]), (50, &[51, 52, 53]), (9, &[3, 3, 4])];

    for (parent, children) in cases {
        let mut r = record(*parent, children);
        r.parent_restart_count = 4;
        r.child_crash_count = 2;

        let next = update(&r, *parent, children);
        assert_eq!(next, r);
    }
}

#[test]
fn test_disjoint_equal_length_diff() {
    for n in 1..8u32 {
        let a: Vec<u32> = (0..n).collect();
        let b: Vec<u32> = (100..100 + n).collect();
        assert_eq!(diff_count(&a, &b), n as usize);
        assert_eq!(diff_count(&b, &a), n as usize);
    }
}

#[test]
fn test_params_carried_over() {
    let mut prev = record(100, &[1]);
    prev.params.insert("pid".into(), "100".into());

    let next = update(&prev, 100, &[1, 2]);
    assert_eq!(next.params, prev.params);
}
