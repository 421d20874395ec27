//! Parent PID acquisition methods.

use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{ProbeError, Result};
use crate::process::scanner::{collect_proc_entries, read_cmdline, read_stat};
use crate::process::systemd::SystemdQuery;

/// How the parent PID is obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PidSource {
    Pid(u32),
    PidFile(PathBuf),
    Systemd(String),
    Grep(String),
}

impl PidSource {
    /// Name of the method, used as the key in the record's `params`.
    pub fn method(&self) -> &'static str {
        match self {
            PidSource::Pid(_) => "pid",
            PidSource::PidFile(_) => "pidfile",
            PidSource::Systemd(_) => "systemd",
            PidSource::Grep(_) => "grep",
        }
    }

    /// The value the method was given, as text.
    pub fn value(&self) -> String {
        match self {
            PidSource::Pid(pid) => pid.to_string(),
            PidSource::PidFile(path) => path.display().to_string(),
            PidSource::Systemd(unit) => unit.clone(),
            PidSource::Grep(pattern) => pattern.clone(),
        }
    }

    /// Resolves the parent PID. Liveness is checked by the caller.
    pub fn resolve(&self, proc_root: &Path, systemd: &SystemdQuery) -> Result<u32> {
        match self {
            PidSource::Pid(pid) => Ok(*pid),
            PidSource::PidFile(path) => read_pid_file(path),
            PidSource::Systemd(unit) => systemd.main_pid(unit),
            PidSource::Grep(pattern) => grep_process_table(proc_root, pattern),
        }
    }
}

/// Reads a PID from the first whitespace-separated token of a file.
pub fn read_pid_file(path: &Path) -> Result<u32> {
    let content = fs::read_to_string(path).map_err(|e| ProbeError::io(path, e))?;
    let token = content
        .split_whitespace()
        .next()
        .ok_or_else(|| ProbeError::InvalidPidFile {
            path: path.to_path_buf(),
            reason: "file is empty".to_string(),
        })?;

    match token.parse::<u32>() {
        Ok(pid) if pid > 0 => Ok(pid),
        _ => Err(ProbeError::InvalidPidFile {
            path: path.to_path_buf(),
            reason: format!("'{}' is not a process id", token),
        }),
    }
}

/// Finds the top-level process whose command line matches `pattern`.
///
/// The probe is skipped since its command line carries the pattern, and so
/// is the shell or wrapper that invoked it with the same arguments.
pub fn grep_process_table(proc_root: &Path, pattern: &str) -> Result<u32> {
    let own_pid = std::process::id();
    let own_arg0 = std::env::args_os()
        .next()
        .map(|arg0| arg0.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut skip = vec![own_pid];
    skip.extend(invoking_parent(proc_root, own_pid, &own_arg0));
    match_process_table(proc_root, pattern, &skip)
}

/// Parent of `pid` when its command line contains `arg0`, i.e. when it is
/// a shell running the probe rather than the monitored process itself.
pub fn invoking_parent(proc_root: &Path, pid: u32, arg0: &str) -> Option<u32> {
    if arg0.is_empty() {
        return None;
    }
    let ppid = read_stat(&proc_root.join(pid.to_string()))?.ppid;
    let cmdline = read_cmdline(&proc_root.join(ppid.to_string()))?;
    cmdline.contains(arg0).then_some(ppid)
}

/// Regex match over the process table, ignoring the PIDs in `skip`.
///
/// Matches whose parent also matches are dropped so a master is preferred
/// over its workers. The earliest started survivor wins, then the lowest PID.
pub fn match_process_table(proc_root: &Path, pattern: &str, skip: &[u32]) -> Result<u32> {
    let re = Regex::new(pattern)?;

    let matches: Vec<(u32, u32, u64)> = collect_proc_entries(proc_root)
        .into_iter()
        .filter(|entry| !skip.contains(&entry.pid))
        .filter_map(|entry| {
            let cmdline = read_cmdline(&entry.proc_path)?;
            if !re.is_match(&cmdline) {
                return None;
            }
            let stat = read_stat(&entry.proc_path)?;
            Some((entry.pid, stat.ppid, stat.start_time))
        })
        .collect();

    debug!("Pattern '{}' matched {} processes", pattern, matches.len());

    let matched: HashSet<u32> = matches.iter().map(|(pid, _, _)| *pid).collect();

    matches
        .iter()
        .filter(|(_, ppid, _)| !matched.contains(ppid))
        .min_by_key(|(pid, _, start)| (*start, *pid))
        .map(|(pid, _, _)| *pid)
        .ok_or_else(|| {
            ProbeError::TargetNotFound(format!("no process matches pattern '{}'", pattern))
        })
}
