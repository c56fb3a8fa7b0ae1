//! Tally CLI - Monthly income/expense forecasting
//!
//! Usage:
//!   tally series --file tx.csv               Show the monthly series
//!   tally forecast --file tx.csv -n 6        Forecast the next 6 months
//!   tally backtest --file tx.csv --holdout 3 Compare methods on recent history
//!   tally config                             Show effective configuration

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Series {
            file,
            kind,
            months,
            as_of,
            json,
        } => {
            let as_of = commands::resolve_as_of(as_of.as_deref())?;
            commands::cmd_series(&file, &kind, months, as_of, json)
        }
        Commands::Forecast {
            file,
            kind,
            months,
            horizon,
            method,
            as_of,
            json,
        } => {
            let config = commands::load_config(cli.config.as_deref())?;
            let as_of = commands::resolve_as_of(as_of.as_deref())?;
            let request = commands::ForecastRequest {
                months,
                horizon,
                method: commands::parse_method(&method)?,
                as_of,
            };
            commands::cmd_forecast(&file, &kind, request, config, json).await
        }
        Commands::Backtest {
            file,
            kind,
            months,
            holdout,
            as_of,
        } => {
            let config = commands::load_config(cli.config.as_deref())?;
            let as_of = commands::resolve_as_of(as_of.as_deref())?;
            commands::cmd_backtest(&file, &kind, months, holdout, as_of, config).await
        }
        Commands::Config => commands::cmd_config(cli.config.as_deref()),
    }
}
