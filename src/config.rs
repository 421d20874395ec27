//! Configuration management for herakles-proc-probe.
//!
//! This module handles loading, merging, and validating configuration from files
//! and CLI arguments. It supports YAML, JSON, and TOML formats.

use crate::cli::{Args, ConfigFormat, LogLevel};
use clap::ValueEnum;
use herakles_proc_probe::process::systemd::DEFAULT_SYSTEMCTL;
use herakles_proc_probe::process::DEFAULT_PROC_ROOT;
use herakles_proc_probe::{PidSource, DEFAULT_CACHE_TTL};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_LOG_LEVEL: &str = "warn";
pub const FALLBACK_PROBE_NAME: &str = "herakles-proc-probe";

/// File stem of the running executable, used to name default cache files.
pub static PROBE_NAME: Lazy<String> = Lazy::new(|| {
    std::env::args_os()
        .next()
        .and_then(|arg0| {
            Path::new(&arg0)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
        })
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| FALLBACK_PROBE_NAME.to_string())
});

/// Probe configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory for default cache files
    #[serde(alias = "cache-dir")]
    pub cache_dir: Option<PathBuf>,

    /// Seconds a cached record is reused before recomputing
    #[serde(alias = "cache-ttl")]
    pub cache_ttl: Option<u64>,

    /// Root of the process filesystem
    #[serde(alias = "proc-root")]
    pub proc_root: Option<PathBuf>,

    /// systemctl binary used for --systemd
    pub systemctl: Option<String>,

    // Logging
    #[serde(alias = "log-level")]
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_dir: Some(std::env::temp_dir()),
            cache_ttl: Some(DEFAULT_CACHE_TTL),
            proc_root: Some(PathBuf::from(DEFAULT_PROC_ROOT)),
            systemctl: Some(DEFAULT_SYSTEMCTL.to_string()),
            log_level: Some(DEFAULT_LOG_LEVEL.into()),
        }
    }
}

impl Config {
    pub fn cache_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    pub fn cache_ttl(&self) -> u64 {
        self.cache_ttl.unwrap_or(DEFAULT_CACHE_TTL)
    }

    pub fn proc_root(&self) -> PathBuf {
        self.proc_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PROC_ROOT))
    }

    pub fn systemctl(&self) -> &str {
        self.systemctl.as_deref().unwrap_or(DEFAULT_SYSTEMCTL)
    }

    /// Effective log level; unknown names fall back to the default.
    pub fn log_level(&self) -> LogLevel {
        self.log_level
            .as_deref()
            .and_then(|s| LogLevel::from_str(s, true).ok())
            .unwrap_or(LogLevel::Warn)
    }
}

/// Replaces every character outside `[A-Za-z0-9._-]` with `_`.
fn slug(value: &str) -> String {
    let s: String = value
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if s.is_empty() {
        "_".to_string()
    } else {
        s
    }
}

/// Default cache file: `<cache_dir>/<probe>-<method>-<slug>.json`.
pub fn default_cache_path(cache_dir: &Path, probe_name: &str, source: &PidSource) -> PathBuf {
    cache_dir.join(format!(
        "{}-{}-{}.json",
        probe_name,
        source.method(),
        slug(&source.value())
    ))
}

/// Validate effective config (used by --check-config and at startup)
pub fn validate_effective_config(cfg: &Config) -> Result<(), Box<dyn std::error::Error>> {
    if cfg.cache_ttl == Some(0) {
        return Err("cache_ttl must be greater than 0".into());
    }

    if let Some(systemctl) = cfg.systemctl.as_deref() {
        if systemctl.trim().is_empty() {
            return Err("systemctl must not be empty".into());
        }
    }

    if let Some(level) = cfg.log_level.as_deref() {
        if LogLevel::from_str(level, true).is_err() {
            return Err(format!(
                "Invalid log_level '{}', expected one of off/error/warn/info/debug/trace",
                level
            )
            .into());
        }
    }

    if let Some(dir) = cfg.cache_dir.as_deref() {
        if dir.as_os_str().is_empty() {
            return Err("cache_dir must not be empty".into());
        }
    }

    Ok(())
}

/// Resolves configuration from CLI args, config file, and defaults.
/// This enforces precedence: CLI (if provided) > config file > default.
pub fn resolve_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        load_config(args.config.as_deref())?
    };

    if let Some(cache_ttl) = args.cache_ttl {
        config.cache_ttl = Some(cache_ttl);
    }

    if let Some(level) = args.log_level {
        config.log_level = level
            .to_possible_value()
            .map(|v| v.get_name().to_string());
    }

    Ok(config)
}

/// Configuration loading with multiple format support
pub fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let path = if let Some(p) = path {
        if !p.exists() {
            return Err(format!("Config file not found: {}", p.display()).into());
        }
        p.to_path_buf()
    } else {
        // Try default locations
        let defaults = [
            "/etc/herakles/proc-probe.yaml",
            "/etc/herakles/proc-probe.yml",
            "/etc/herakles/proc-probe.json",
            "./herakles-proc-probe.yaml",
            "./herakles-proc-probe.yml",
            "./herakles-proc-probe.json",
        ];

        match defaults.iter().map(Path::new).find(|p| p.exists()) {
            Some(p) => p.to_path_buf(),
            None => return Ok(Config::default()),
        }
    };

    let content = fs::read_to_string(&path)?;

    // Missing keys keep their defaults
    let config = match path.extension().and_then(|s| s.to_str()) {
        Some("json") => {
            let config: Config = serde_json::from_str(&content)?;
            info!("Loaded JSON configuration from: {}", path.display());
            config
        }
        Some("toml") => {
            let config: Config = toml::from_str(&content)?;
            info!("Loaded TOML configuration from: {}", path.display());
            config
        }
        _ => {
            // Default to YAML
            let config: Config = serde_yaml::from_str(&content)?;
            info!("Loaded YAML configuration from: {}", path.display());
            config
        }
    };

    Ok(merge_defaults(config))
}

fn merge_defaults(cfg: Config) -> Config {
    let defaults = Config::default();
    Config {
        cache_dir: cfg.cache_dir.or(defaults.cache_dir),
        cache_ttl: cfg.cache_ttl.or(defaults.cache_ttl),
        proc_root: cfg.proc_root.or(defaults.proc_root),
        systemctl: cfg.systemctl.or(defaults.systemctl),
        log_level: cfg.log_level.or(defaults.log_level),
    }
}

/// Renders configuration in the requested format
pub fn render_config(
    config: &Config,
    format: &ConfigFormat,
) -> Result<String, Box<dyn std::error::Error>> {
    let output = match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    };
    Ok(output)
}

/// Shows configuration in requested format
pub fn show_config(config: &Config, format: ConfigFormat) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", render_config(config, &format)?);
    Ok(())
}
