//! CLI command implementations for herakles-proc-probe.
//!
//! This module provides implementations for all CLI subcommands:
//! - `check`: System validation
//! - `config`: Configuration file generation
//! - `snapshot`: One-off snapshot acquisition

pub mod check;
pub mod config;
pub mod snapshot;

// Re-export command functions
pub use check::command_check;
pub use config::command_config;
pub use snapshot::command_snapshot;
