use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::constants::ENV_API_URL;

#[derive(Parser, Debug)]
#[command(name = "mailwizard")]
#[command(version)]
#[command(about = "Generate, refine and send AI-written emails from the terminal", long_about = None)]
pub struct Cli {
    /// Backend base URL (empty means the local proxy address)
    #[arg(long, env = ENV_API_URL)]
    pub api_url: Option<String>,

    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Topic for a one-shot, non-interactive run
    #[arg(short, long)]
    pub topic: Option<String>,

    /// Feedback to apply before finalizing (repeatable, applied in order)
    #[arg(short, long, requires = "topic")]
    pub feedback: Vec<String>,

    /// Send the finalized email to this address (non-interactive mode)
    #[arg(long, requires = "topic")]
    pub send_to: Option<String>,

    /// Output format for non-interactive mode
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, requires = "topic")]
    pub output_format: OutputFormat,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a default configuration file
    Init,
    /// Check whether the backend is reachable
    Status,
    /// Show version information
    Version,
    /// Start the interactive wizard (default)
    Wizard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    Text,
    /// JSON structured output
    Json,
}
