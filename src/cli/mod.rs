//! CLI Module
//!
//! Command-line interface for WhoIsWrong using Clap v4.

mod commands;

use crate::logging;
use anyhow::Result;
use clap::{Parser, Subcommand};

/// WhoIsWrong - settle everyday disputes with an LLM verdict
#[derive(Parser, Debug)]
#[command(name = "whoiswrong")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Judge a single dispute
    Judge {
        /// First side of the dispute
        #[arg(short = 'a', long)]
        option_a: String,

        /// Second side of the dispute
        #[arg(short = 'b', long)]
        option_b: String,

        /// Background for the disagreement
        #[arg(long)]
        context: Option<String>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Run the HTTP gateway
    Serve {
        /// Bind address (overrides config)
        #[arg(long)]
        bind: Option<String>,

        /// Listen port (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show configuration
    Config {
        /// Show full configuration including secrets
        #[arg(short, long)]
        show_secrets: bool,
    },
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Main CLI entry point
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = commands::load_config(cli.config.as_deref())?;

    // Held until exit so buffered file logs are flushed
    let _log_guard = logging::init(&config.logging, cli.debug)?;
    if cli.debug {
        tracing::debug!("Debug mode enabled");
    }

    config.validate()?;

    match cli.command {
        Commands::Judge {
            option_a,
            option_b,
            context,
            format,
        } => commands::cmd_judge(&config, option_a, option_b, context, format).await,
        Commands::Serve { bind, port } => commands::cmd_serve(&config, bind, port).await,
        Commands::Config { show_secrets } => commands::cmd_config(&config, show_secrets).await,
    }
}
