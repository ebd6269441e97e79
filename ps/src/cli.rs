//! Command-line interface for pantrystore

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Inspect and seed a pantry store
#[derive(Debug, Parser)]
#[command(name = "pantrystore", version, about = "Household inventory store")]
pub struct Cli {
    /// Store directory (defaults to ~/.local/share/pantryd/store)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List all items
    Items {
        /// Only show items at or below their restock threshold
        #[arg(long)]
        low: bool,
    },

    /// Add or replace an item
    Add {
        /// Item name
        name: String,

        /// Current quantity on hand
        #[arg(long)]
        quantity: f64,

        /// Unit of measure
        #[arg(long, default_value = "count")]
        unit: String,

        /// Restock threshold
        #[arg(long, default_value_t = 0.0)]
        min: f64,

        /// Average consumption per day
        #[arg(long, default_value_t = 0.0)]
        daily_use: f64,
    },

    /// List all preferences
    Prefs,

    /// Set a preference value (parsed as JSON, falling back to a string)
    SetPref { key: String, value: String },

    /// List recorded orders
    Orders,

    /// List recent cycle summaries
    Cycles {
        /// Maximum number of cycles to show
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

/// Default store directory when none is given
pub fn default_store_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pantryd")
        .join("store")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_add() {
        let cli = Cli::parse_from(["pantrystore", "add", "rice", "--quantity", "5", "--unit", "kg", "--min", "2"]);
        match cli.command {
            Command::Add {
                name, quantity, min, ..
            } => {
                assert_eq!(name, "rice");
                assert_eq!(quantity, 5.0);
                assert_eq!(min, 2.0);
            }
            _ => panic!("Expected Add command"),
        }
    }

    #[test]
    fn test_cli_parses_items_low() {
        let cli = Cli::parse_from(["pantrystore", "items", "--low"]);
        match cli.command {
            Command::Items { low } => assert!(low),
            _ => panic!("Expected Items command"),
        }
    }
}
