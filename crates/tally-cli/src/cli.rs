//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tally - Forecast monthly income and spending
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Monthly income/expense forecasting from transaction history", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Forecast config file (defaults to ~/.local/share/tally/config/forecast.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the monthly series built from a transaction file
    Series {
        /// Transaction file (CSV or .json)
        #[arg(short, long)]
        file: PathBuf,

        /// Transaction type: expense, income
        #[arg(short, long, default_value = "expense")]
        kind: String,

        /// Number of trailing months to include
        #[arg(short, long, default_value = "12")]
        months: usize,

        /// Treat this date (YYYY-MM-DD) as today
        #[arg(long)]
        as_of: Option<String>,

        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Forecast future months
    Forecast {
        /// Transaction file (CSV or .json)
        #[arg(short, long)]
        file: PathBuf,

        /// Transaction type: expense, income, both
        #[arg(short, long, default_value = "expense")]
        kind: String,

        /// Number of trailing months of history to use
        #[arg(short, long, default_value = "12")]
        months: usize,

        /// Number of months to forecast
        #[arg(short = 'n', long, default_value = "6")]
        horizon: usize,

        /// Method: linear, exponential, moving_average, ensemble
        #[arg(long, default_value = "ensemble")]
        method: String,

        /// Treat this date (YYYY-MM-DD) as today
        #[arg(long)]
        as_of: Option<String>,

        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Score every method against the most recent months of history
    Backtest {
        /// Transaction file (CSV or .json)
        #[arg(short, long)]
        file: PathBuf,

        /// Transaction type: expense, income
        #[arg(short, long, default_value = "expense")]
        kind: String,

        /// Number of trailing months of history to use
        #[arg(short, long, default_value = "24")]
        months: usize,

        /// Number of most recent months held back for scoring
        #[arg(long, default_value = "3")]
        holdout: usize,

        /// Treat this date (YYYY-MM-DD) as today
        #[arg(long)]
        as_of: Option<String>,
    },

    /// Show the effective forecast configuration
    Config,
}
