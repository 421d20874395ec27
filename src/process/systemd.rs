//! MainPID lookup through systemctl.

use once_cell::sync::Lazy;
use regex::Regex;
use std::process::Command;
use tracing::debug;

use crate::error::{ProbeError, Result};

pub const DEFAULT_SYSTEMCTL: &str = "systemctl";

static MAIN_PID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:MainPID=)?(\d+)\s*$").expect("MainPID pattern is valid")
});

/// Extracts the MainPID from `systemctl show` output.
///
/// Accepts both `--value` output ("1234") and property form ("MainPID=1234").
pub fn parse_main_pid(output: &str) -> Option<u32> {
    output
        .lines()
        .find_map(|line| MAIN_PID_RE.captures(line))
        .and_then(|caps| caps[1].parse().ok())
}

/// Queries the service manager for a unit's main process.
#[derive(Debug, Clone)]
pub struct SystemdQuery {
    pub systemctl: String,
}

impl Default for SystemdQuery {
    fn default() -> Self {
        Self {
            systemctl: DEFAULT_SYSTEMCTL.to_string(),
        }
    }
}

impl SystemdQuery {
    pub fn new(systemctl: impl Into<String>) -> Self {
        Self {
            systemctl: systemctl.into(),
        }
    }

    /// Returns the unit's MainPID. A MainPID of 0 means the unit is not running.
    pub fn main_pid(&self, unit: &str) -> Result<u32> {
        let output = Command::new(&self.systemctl)
            .args(["show", "--property=MainPID", "--value", unit])
            .output()
            .map_err(|e| ProbeError::Systemd {
                unit: unit.to_string(),
                reason: format!("failed to run {}: {}", self.systemctl, e),
            })?;

        if !output.status.success() {
            return Err(ProbeError::Systemd {
                unit: unit.to_string(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        debug!("systemctl show {} -> {:?}", unit, stdout.trim());

        match parse_main_pid(&stdout) {
            Some(0) => Err(ProbeError::TargetNotFound(format!(
                "systemd unit '{}' has no running main process",
                unit
            ))),
            Some(pid) => Ok(pid),
            None => Err(ProbeError::Systemd {
                unit: unit.to_string(),
                reason: format!("unexpected output: {}", stdout.trim()),
            }),
        }
    }

    /// Whether the configured systemctl binary can be executed.
    pub fn is_available(&self) -> bool {
        Command::new(&self.systemctl)
            .arg("--version")
            .output()
            .map(|out| out.status.success())
            .unwrap_or(false)
    }
}
