//! Config command implementation.
//!
//! Generates configuration files in various formats.

use std::fs;
use std::path::PathBuf;

use crate::cli::ConfigFormat;
use crate::config::{render_config, Config};

/// Generates configuration files.
pub fn command_config(
    output: Option<PathBuf>,
    format: ConfigFormat,
    commented: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    let output = match output {
        Some(path) => path,
        None => PathBuf::from("herakles-proc-probe.yaml"),
    };

    let mut content = render_config(&config, &format)?;
    if commented && matches!(format, ConfigFormat::Yaml) {
        content = add_config_comments(content);
    }

    if output.to_string_lossy() == "-" {
        print!("{}", content);
    } else {
        fs::write(&output, content)?;
        println!("✅ Configuration written to: {}", output.display());
    }

    Ok(())
}

/// Adds comments to YAML configuration.
fn add_config_comments(yaml: String) -> String {
    let comments = r#"# Herakles Process Probe Configuration
# =====================================
#
# cache_dir: /tmp              # Directory for default cache files
#                              # (<cache_dir>/<probe>-<method>-<target>.json)
# cache_ttl: 55                # Seconds a cached record is reused; keep it
#                              # just under the monitor's polling interval
# proc_root: /proc             # Process filesystem root
# systemctl: systemctl         # Binary used for --systemd lookups
# log_level: warn              # off | error | warn | info | debug | trace
#                              # (logs go to stderr, stdout stays clean)
#
"#;
    format!("{}{}", comments, yaml)
}
