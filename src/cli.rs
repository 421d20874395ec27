//! CLI arguments and subcommands for herakles-proc-probe.
//!
//! This module defines the command-line interface structure using the clap library,
//! including the target selection flags, cache options, and subcommands.

use clap::{Parser, Subcommand, ValueEnum};
use herakles_proc_probe::PidSource;
use std::path::PathBuf;

/// Log level options for CLI parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Configuration format options for output
#[derive(Debug, Clone, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

/// Parent process selection. At most one may be given.
#[derive(clap::Args, Debug, Clone, Default)]
#[group(id = "target", multiple = false)]
pub struct TargetArgs {
    /// Read the parent PID from this file
    #[arg(short = 'f', long)]
    pub pidfile: Option<PathBuf>,

    /// Parent PID given directly
    #[arg(short = 'p', long)]
    pub pid: Option<u32>,

    /// Use the MainPID of this systemd unit
    #[arg(short = 's', long)]
    pub systemd: Option<String>,

    /// Match this regex against the process table command lines
    #[arg(short = 'g', long)]
    pub grep: Option<String>,
}

impl TargetArgs {
    /// The acquisition method selected on the command line, if any.
    pub fn to_source(&self) -> Option<PidSource> {
        if let Some(path) = &self.pidfile {
            return Some(PidSource::PidFile(path.clone()));
        }
        if let Some(pid) = self.pid {
            return Some(PidSource::Pid(pid));
        }
        if let Some(unit) = &self.systemd {
            return Some(PidSource::Systemd(unit.clone()));
        }
        self.grep.clone().map(PidSource::Grep)
    }
}

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "herakles-proc-probe",
    about = "Process health probe counting parent restarts and child crashes",
    long_about = "Process health probe counting parent restarts and child crashes.\n\n\
                  Each run inspects a parent process and its direct children, compares the \
                  PIDs with the snapshot cached by the previous run, and updates two cumulative \
                  counters. Meant to be polled by a monitoring agent on a fixed interval.",
    author = "Michael Moll <exporter@herakles.now> - Herakles",
    version = "0.1.0",
    propagate_version = true,
    args_conflicts_with_subcommands = true,
    after_help = "Exactly one of --pidfile, --pid, --systemd or --grep is required.\n\
                  Project: https://github.com/cansp-dev/herakles-proc-probe — Support: exporter@herakles.now"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub target: TargetArgs,

    /// Print only this field of the resulting record
    #[arg(short = 'k', long)]
    pub key: Option<String>,

    /// Cache file path (default derived from the probe name and target)
    #[arg(short = 'c', long)]
    pub cache: Option<PathBuf>,

    /// Reuse the cached record for N seconds
    #[arg(long)]
    pub cache_ttl: Option<u64>,

    /// Log level (logs go to stderr)
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Config file (YAML/JSON/TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Disable all config file loading
    #[arg(long)]
    pub no_config: bool,

    /// Print effective merged config and exit
    #[arg(long)]
    pub show_config: bool,

    /// Output format for --show-config
    #[arg(long, value_enum, default_value = "yaml")]
    pub config_format: ConfigFormat,

    /// Validate config and exit (return code 1 on error)
    #[arg(long)]
    pub check_config: bool,
}

/// Subcommands for additional functionality
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate configuration and system requirements
    Check,

    /// Generate configuration files
    Config {
        /// Output file path ("-" for stdout)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "yaml")]
        format: ConfigFormat,

        /// Include comments and examples
        #[arg(long)]
        commented: bool,
    },

    /// Print the current snapshot without touching the cache
    Snapshot {
        #[command(flatten)]
        target: TargetArgs,
    },
}
