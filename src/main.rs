use anyhow::Result;
use clap::Parser;
use std::sync::Arc;

use mailwizard::{
    app::{load_config, load_config_from, Config},
    backend::HttpBackend,
    cli::{handle_command, Cli},
    runtime::{NonInteractiveRunner, RunPlan, Wizard},
    utils::{init_logger, log_info, log_warn},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    init_logger(cli.verbose);

    let config = resolve_config(&cli)?;

    if cli.no_color || !config.ui.color {
        colored::control::set_override(false);
    }

    // Check if running in non-interactive mode
    if let Some(topic) = cli.topic.clone() {
        return run_non_interactive(cli, config, topic).await;
    }

    if let Some(command) = &cli.command {
        if handle_command(command, &config).await? {
            return Ok(());
        }
    }

    let backend = HttpBackend::new(&config.backend)?;
    log_info("backend", format!("Using {}", backend.base_url()));

    let mut wizard = Wizard::new(Arc::new(backend), config.ui.clone());
    wizard.run().await
}

/// Config file (explicit or discovered), then the `--api-url` override
fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = if let Some(config_path) = &cli.config {
        load_config_from(config_path)?
    } else {
        match load_config() {
            Ok(cfg) => cfg,
            Err(e) => {
                log_warn("config", format!("Failed to load config: {}. Using defaults.", e));
                Config::default()
            }
        }
    };

    if let Some(api_url) = &cli.api_url {
        config.backend.base_url = api_url.clone();
    }

    Ok(config)
}

/// Run in non-interactive mode
async fn run_non_interactive(cli: Cli, config: Config, topic: String) -> Result<()> {
    let backend = HttpBackend::new(&config.backend)?;
    let backend_url = backend.base_url().to_string();

    let mut runner = NonInteractiveRunner::new(Arc::new(backend), backend_url);
    let report = runner
        .execute(RunPlan {
            topic,
            feedback: cli.feedback,
            send_to: cli.send_to,
        })
        .await;

    println!("{}", runner.format_result(&report, cli.output_format));

    // Exit with appropriate code
    if !report.succeeded() {
        std::process::exit(1);
    }

    Ok(())
}
