//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `backtest` - Method comparison on held-back history
//! - `config` - Effective configuration display
//! - `core` - Shared utilities (config loading, argument parsing, series building)
//! - `forecast` - Series display and forecasting

pub mod backtest;
pub mod config;
pub mod core;
pub mod forecast;

// Re-export command functions for main.rs
pub use backtest::*;
pub use config::*;
pub use core::*;
pub use forecast::*;
