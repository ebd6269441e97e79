//! Command-line interface for pantryd

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Policy-gated tool-calling agent for household inventory
#[derive(Debug, Parser)]
#[command(name = "pd", version, about = "Household inventory agent")]
pub struct Cli {
    /// Path to a config file (defaults: .pantryd.yml, then ~/.config/pantryd/pantryd.yml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Ask the agent a question or request an action
    Chat {
        /// The message to send
        message: String,

        /// Override the configured model round-trip cap
        #[arg(long)]
        max_iterations: Option<u32>,

        /// Attach an approval token for the named tool (e.g. place_order)
        #[arg(long)]
        approve: Option<String>,
    },

    /// Run the autonomous restock cycle
    Cycle {
        /// Keep running cycles on the configured interval until Ctrl+C
        #[arg(long)]
        watch: bool,
    },

    /// Show tracked items
    Items {
        /// Only show items at or below their restock threshold
        #[arg(long)]
        low: bool,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Show recorded orders
    Orders {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

/// Output format for listing commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Path of the log file pd writes to
pub fn get_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pantryd")
        .join("logs")
        .join("pantryd.log")
}
