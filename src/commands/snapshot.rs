//! Snapshot command implementation.
//!
//! Resolves the target and prints what the probe currently observes,
//! without reading or writing any cache.

use std::time::Instant;

use herakles_proc_probe::{PidSource, ProcSnapshotProvider, SnapshotProvider, SystemdQuery};

use crate::config::Config;

/// Prints the current snapshot of the target.
pub fn command_snapshot(
    source: PidSource,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("🧪 Herakles Process Probe - Snapshot");
    println!("====================================");

    let provider = ProcSnapshotProvider::new(source)
        .with_proc_root(config.proc_root())
        .with_systemd(SystemdQuery::new(config.systemctl()));

    let start = Instant::now();
    let snapshot = provider.provide()?;
    let elapsed = start.elapsed();

    for (method, value) in provider.params() {
        println!("   🎯 Target: {} = {}", method, value);
    }
    println!("   🔢 Parent PID: {}", snapshot.parent_pid);
    println!("   👶 Children: {}", snapshot.child_pids.len());
    if !snapshot.child_pids.is_empty() {
        let pids: Vec<String> = snapshot.child_pids.iter().map(|p| p.to_string()).collect();
        println!("      {}", pids.join(" "));
    }
    println!("   ⏱️  Took {:.2}ms", elapsed.as_secs_f64() * 1000.0);

    Ok(())
}
