use anyhow::Result;
use colored::Colorize;

use crate::{
    app::{get_config_dir, init_config, Config},
    backend::{check_health, BackendStatus, HttpBackend},
};

use super::Commands;

/// Handle CLI subcommands
///
/// Returns `true` when the command was fully handled and the process should exit.
pub async fn handle_command(command: &Commands, config: &Config) -> Result<bool> {
    match command {
        Commands::Init => {
            let (path, created) = init_config()?;
            if created {
                println!("Created default configuration at: {}", path.display());
            } else {
                println!("Configuration already exists at: {}", path.display());
            }
            Ok(true)
        }
        Commands::Status => {
            show_status(config).await?;
            Ok(true)
        }
        Commands::Version => {
            show_version();
            Ok(true)
        }
        Commands::Wizard => Ok(false),
    }
}

/// Show version information
pub fn show_version() {
    println!("mailwizard v{}", env!("CARGO_PKG_VERSION"));
    println!("   Generate, refine and send AI-written emails");
}

/// Probe the backend and print what the wizard would connect to
pub async fn show_status(config: &Config) -> Result<()> {
    let backend = HttpBackend::new(&config.backend)?;

    println!("mailwizard status:");
    println!();

    match check_health(&backend).await {
        BackendStatus::Online => {
            println!("  [OK] Backend: reachable at {}", backend.base_url().green())
        }
        _ => println!(
            "  [ERROR] Backend: unreachable at {}",
            backend.base_url().red()
        ),
    }

    println!(
        "  Timeouts: {}s per request, {}s per health probe",
        config.backend.timeout_secs, config.backend.health_timeout_secs
    );

    match get_config_dir() {
        Ok(dir) => {
            let path = dir.join("config.toml");
            if path.exists() {
                println!("  [OK] Configuration: {}", path.display());
            } else {
                println!("  [WARNING] Configuration: Not found (using defaults)");
            }
        }
        Err(e) => println!("  [WARNING] Configuration directory unavailable: {}", e),
    }

    println!();
    Ok(())
}
