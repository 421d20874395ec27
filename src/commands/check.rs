//! Check command implementation.
//!
//! Validates system requirements and configuration.

use std::fs;

use herakles_proc_probe::process::{collect_proc_entries, read_stat};
use herakles_proc_probe::SystemdQuery;

use crate::config::{validate_effective_config, Config, PROBE_NAME};

/// Validates system requirements and configuration.
pub fn command_check(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Herakles Process Probe - System Check");
    println!("========================================");

    let mut all_ok = true;

    // Check process filesystem
    let proc_root = config.proc_root();
    println!("\n📁 Checking {}...", proc_root.display());
    if proc_root.is_dir() {
        let entries = collect_proc_entries(&proc_root);
        if entries.is_empty() {
            println!("   ❌ Cannot read any process entries");
            all_ok = false;
        } else {
            println!("   ✅ Can read {} process entries", entries.len());
        }

        let own = proc_root.join(std::process::id().to_string());
        match read_stat(&own) {
            Some(stat) => println!("   ✅ stat parsing works (own ppid={})", stat.ppid),
            None => {
                println!("   ❌ Cannot parse {}/stat", own.display());
                all_ok = false;
            }
        }
    } else {
        println!("   ❌ {} not found", proc_root.display());
        all_ok = false;
    }

    // systemd is optional: only --systemd needs it
    println!("\n🧩 Checking systemctl...");
    let systemd = SystemdQuery::new(config.systemctl());
    if systemd.is_available() {
        println!("   ✅ {} is callable", config.systemctl());
    } else {
        println!(
            "   ⚠️  {} not available - --systemd will not work",
            config.systemctl()
        );
    }

    // Check cache directory
    let cache_dir = config.cache_dir();
    println!("\n💾 Checking cache directory {}...", cache_dir.display());
    let probe_file = cache_dir.join(format!(".{}-check", PROBE_NAME.as_str()));
    match fs::create_dir_all(&cache_dir).and_then(|_| fs::write(&probe_file, b"ok")) {
        Ok(()) => {
            let _ = fs::remove_file(&probe_file);
            println!("   ✅ Cache directory is writable");
        }
        Err(e) => {
            println!("   ❌ Cache directory not writable: {}", e);
            all_ok = false;
        }
    }

    // Check configuration
    println!("\n⚙️  Checking configuration...");
    match validate_effective_config(config) {
        Ok(_) => {
            println!("   ✅ Configuration is valid (cache_ttl={}s)", config.cache_ttl());
        }
        Err(e) => {
            println!("   ❌ Configuration invalid: {}", e);
            all_ok = false;
        }
    }

    println!("\n📋 Summary:");
    if all_ok {
        println!("   ✅ All checks passed - probe is ready");
        Ok(())
    } else {
        println!("   ❌ Some checks failed - please review warnings");
        std::process::exit(1);
    }
}
