//! Process table scanning over a /proc-style filesystem.
//!
//! The root is a parameter so tests can point it at a synthetic tree.

use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_PROC_ROOT: &str = "/proc";

/// Process entry representing a directory in /proc filesystem.
#[derive(Debug, Clone)]
pub struct ProcEntry {
    pub pid: u32,
    pub proc_path: PathBuf,
}

/// Fields of /proc/<pid>/stat the probe cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcStat {
    pub comm: String,
    pub ppid: u32,
    /// Start time in clock ticks since boot.
    pub start_time: u64,
}

/// Scans the root directory for process entries with numeric PIDs.
pub fn collect_proc_entries(root: &Path) -> Vec<ProcEntry> {
    let mut out = Vec::new();
    if let Ok(entries) = fs::read_dir(root) {
        for entry in entries.flatten() {
            let p = entry.path();
            let name = match p.file_name().and_then(|s| s.to_str()) {
                Some(v) => v,
                None => continue,
            };
            if !name.chars().all(|c| c.is_ascii_digit()) {
                continue;
            }
            let pid: u32 = match name.parse() {
                Ok(v) => v,
                Err(_) => continue,
            };
            out.push(ProcEntry { pid, proc_path: p });
        }
    }
    out
}

/// Parses the content of a stat file.
///
/// `comm` may contain spaces and parentheses, so fields are taken after the
/// last closing parenthesis.
pub fn parse_stat(content: &str) -> Option<ProcStat> {
    let open = content.find('(')?;
    let close = content.rfind(')')?;
    if close < open {
        return None;
    }
    let comm = content[open + 1..close].to_string();

    // rest[0] is the state (field 3), so field N sits at rest[N - 3]
    let rest: Vec<&str> = content[close + 1..].split_whitespace().collect();
    let ppid = rest.get(1)?.parse().ok()?;
    let start_time = rest.get(19).and_then(|s| s.parse().ok()).unwrap_or(0);

    Some(ProcStat {
        comm,
        ppid,
        start_time,
    })
}

pub fn read_stat(proc_path: &Path) -> Option<ProcStat> {
    let content = fs::read_to_string(proc_path.join("stat")).ok()?;
    parse_stat(&content)
}

/// Reads the command line with NUL separators turned into spaces.
///
/// Kernel threads have an empty cmdline; their `comm` is returned instead.
pub fn read_cmdline(proc_path: &Path) -> Option<String> {
    if let Ok(content) = fs::read(proc_path.join("cmdline")) {
        let parts: Vec<String> = content
            .split(|&b| b == 0u8)
            .filter(|s| !s.is_empty())
            .map(|s| String::from_utf8_lossy(s).into_owned())
            .collect();
        if !parts.is_empty() {
            return Some(parts.join(" "));
        }
    }

    read_stat(proc_path).map(|stat| stat.comm)
}

/// Whether a process with this PID currently exists.
pub fn is_alive(root: &Path, pid: u32) -> bool {
    pid > 0 && root.join(pid.to_string()).is_dir()
}

/// PIDs of all direct children of `parent`, ascending.
pub fn find_children(root: &Path, parent: u32) -> Vec<u32> {
    let mut children: Vec<u32> = collect_proc_entries(root)
        .into_iter()
        .filter(|entry| entry.pid != parent)
        .filter_map(|entry| {
            read_stat(&entry.proc_path)
                .filter(|stat| stat.ppid == parent)
                .map(|_| entry.pid)
        })
        .collect();
    children.sort_unstable();
    children
}
