//! Suze Service Library
//!
//! Configuration, logging and command handling for the `suze` binary, which
//! chains the Fantasy Premier League fetcher and the odds engine.

use anyhow::{Context, Result};
use std::path::Path;

pub mod cli;
pub mod config;
pub mod logging;

pub use cli::{Cli, CliHandler, Commands};
pub use config::ServiceConfig;
pub use logging::initialize_logging;

/// Load configuration from `.env`, the configuration file and environment variables
pub fn load_configuration(path: Option<&Path>) -> Result<ServiceConfig> {
    dotenv::dotenv().ok();
    config::load_config(path).context("Failed to load service configuration")
}
