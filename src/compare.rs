//! Snapshot comparison: infers parent restarts and child crashes.
//!
//! Only PID equality is available. A parent PID change is a restart. When
//! the child set keeps its size but no PID survives, the children were
//! recycled by a reload, which also counts as a restart. Children that
//! disappear beyond what growth or shrinkage explains count as crashes.
//! After a parent restart every vanished child belongs to the old
//! generation, so no crash is inferred for that update.

use crate::stats::StatsRecord;
use tracing::{debug, info};

/// Number of greedy one-to-one matches between `a` and `b`.
///
/// Each element of `b` is consumed at most once, so duplicate PIDs are
/// matched independently.
pub fn overlap(a: &[u32], b: &[u32]) -> usize {
    let mut consumed = vec![false; b.len()];
    let mut matched = 0;

    for pid in a {
        if let Some(idx) = (0..b.len()).find(|&i| !consumed[i] && b[i] == *pid) {
            consumed[idx] = true;
            matched += 1;
        }
    }

    matched
}

/// Elements of the longer side left without a partner.
pub fn diff_count(a: &[u32], b: &[u32]) -> usize {
    a.len().max(b.len()) - overlap(a, b)
}

/// Returns the record that follows `prev` after observing a new snapshot.
///
/// `prev` is left untouched. `params` are carried over unchanged.
pub fn update(prev: &StatsRecord, new_parent_pid: u32, new_child_pids: &[u32]) -> StatsRecord {
    let mut next = prev.clone();
    let mut restarted = false;

    if prev.parent_pid != Some(new_parent_pid) {
        restarted = true;
        next.parent_restart_count += 1;
        info!(
            "Parent PID changed: {:?} -> {}",
            prev.parent_pid, new_parent_pid
        );
    }

    // An empty child set carries no information.
    if !new_child_pids.is_empty() {
        let old_len = prev.child_pids.len();
        let new_len = new_child_pids.len();
        let diff = diff_count(&prev.child_pids, new_child_pids);

        if new_len == old_len {
            if diff == new_len {
                debug!("All {} children replaced, treating as reload", new_len);
                if !restarted {
                    next.parent_restart_count += 1;
                }
            } else if diff != 0 && !restarted {
                info!("{} children vanished without replacement growth", diff);
                next.child_crash_count += diff as u64;
            }
        } else if new_len > old_len {
            if old_len > 0 {
                let ratio = new_len / old_len;
                next.parent_restart_count += (ratio - 1) as u64;
            }
            let expected = new_len - old_len;
            if diff > expected && !restarted {
                info!("{} children crashed during growth", diff - expected);
                next.child_crash_count += (diff - expected) as u64;
            }
        } else {
            let expected = old_len - new_len;
            if diff > expected && !restarted {
                info!("{} children crashed during shrink", diff - expected);
                next.child_crash_count += (diff - expected) as u64;
            }
        }
    }

    next.set_snapshot(new_parent_pid, new_child_pids);
    next
}
