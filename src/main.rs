//! herakles-proc-probe - version 0.1.0
//!
//! Stateless process-health probe with tracing logging.
//! This is the main entry point that resolves the target, refreshes the cache and
//! prints the resulting record or one of its fields.

mod cli;
mod commands;
mod config;
mod output;

use clap::{error::ErrorKind, CommandFactory, Parser};
use std::path::PathBuf;
use std::time::Duration;
use tracing::level_filters::LevelFilter;
use tracing::{debug, info};

use cli::{Args, Commands, LogLevel};
use commands::{command_check, command_config, command_snapshot};
use config::{
    default_cache_path, resolve_config, show_config, validate_effective_config, Config,
    PROBE_NAME,
};
use herakles_proc_probe::{
    CacheManager, JsonFileStore, PidSource, ProcSnapshotProvider, SnapshotProvider, SystemClock,
    SystemdQuery,
};
use output::{check_key, render_field, render_record};

/// Initializes tracing logging subsystem with configured log level.
///
/// Logs go to stderr; stdout carries only the probe output.
fn setup_logging(config: &Config) {
    let level = match config.log_level() {
        LogLevel::Off => LevelFilter::OFF,
        LogLevel::Error => LevelFilter::ERROR,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Trace => LevelFilter::TRACE,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("⚠️  Tracing subscriber already set");
    }

    debug!("Logging initialized with level: {}", level);
}

/// Helper function to load and validate configuration.
/// Exits the process with error code 1 if validation fails.
fn load_validated_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let config = resolve_config(args)?;
    if let Err(e) = validate_effective_config(&config) {
        eprintln!("❌ Configuration invalid: {}", e);
        std::process::exit(1);
    }
    Ok(config)
}

/// Reports a missing target the way clap reports usage errors (exit code 2).
fn require_source(source: Option<PidSource>) -> PidSource {
    match source {
        Some(source) => source,
        None => Args::command()
            .error(
                ErrorKind::MissingRequiredArgument,
                "one of --pidfile, --pid, --systemd or --grep is required",
            )
            .exit(),
    }
}

/// One probe invocation: snapshot, cache refresh, output.
fn run_probe(
    source: PidSource,
    args: &Args,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    // A bad key must not cost a refresh window
    if let Some(key) = args.key.as_deref() {
        check_key(key)?;
    }

    let cache_path: PathBuf = args
        .cache
        .clone()
        .unwrap_or_else(|| default_cache_path(&config.cache_dir(), &PROBE_NAME, &source));

    let provider = ProcSnapshotProvider::new(source)
        .with_proc_root(config.proc_root())
        .with_systemd(SystemdQuery::new(config.systemctl()));

    let snapshot = provider.provide()?;
    debug!(
        "Snapshot: parent={} children={:?}",
        snapshot.parent_pid, snapshot.child_pids
    );

    let manager = CacheManager::new(
        JsonFileStore,
        SystemClock,
        Duration::from_secs(config.cache_ttl()),
    );
    let record = manager.refresh(&cache_path, &snapshot, &provider.params())?;

    info!(
        "{}: restarts={} crashes={} children={}",
        cache_path.display(),
        record.parent_restart_count,
        record.child_crash_count,
        record.child_count
    );

    let rendered = match args.key.as_deref() {
        Some(key) => render_field(&record, key)?,
        None => render_record(&record)?,
    };
    println!("{}", rendered);

    Ok(())
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    // Config-only modes need no target
    if args.show_config || args.check_config {
        let config = resolve_config(&args)?;

        if args.check_config {
            if let Err(e) = validate_effective_config(&config) {
                eprintln!("❌ Configuration invalid: {}", e);
                std::process::exit(1);
            }
            println!("✅ Configuration is valid");
            return Ok(());
        }

        return show_config(&config, args.config_format.clone());
    }

    // Handle subcommands
    if let Some(command) = &args.command {
        if let Commands::Config {
            output,
            format,
            commented,
        } = command
        {
            return command_config(output.clone(), format.clone(), *commented);
        }

        let config = load_validated_config(&args)?;
        setup_logging(&config);

        return match command {
            Commands::Check => command_check(&config),
            Commands::Snapshot { target } => {
                command_snapshot(require_source(target.to_source()), &config)
            }
            Commands::Config { .. } => unreachable!("Config handled above"),
        };
    }

    let source = require_source(args.target.to_source());
    let config = load_validated_config(&args)?;
    setup_logging(&config);

    run_probe(source, &args, &config)
}

/// Main application entry point.
fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
}
