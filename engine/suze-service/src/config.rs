//! Service configuration management
//!
//! Built-in defaults, then an optional TOML file, then `SUZE__` environment
//! variables (`SUZE__SERVICE__DATA_DIR`, `SUZE__SCORING__ONE_SEASON_PENALTY`, ...).

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use fpl_fetcher::FetcherConfig;
use odds_engine::ScoringProfile;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration file read when none is given on the command line
pub const DEFAULT_CONFIG_FILE: &str = "suze.toml";

/// Prefix of configuration environment variables
const ENV_PREFIX: &str = "SUZE";

/// Main service configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Service-level settings
    pub service: ServiceSettings,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// API client configuration
    pub fetcher: FetcherConfig,

    /// Odds scoring profile
    pub scoring: ScoringProfile,
}

/// Service-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Directory holding every JSON-lines and CSV file
    pub data_dir: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` takes precedence
    pub level: String,

    /// Log format (pretty, compact, json)
    pub format: String,

    /// Log file path (if None, logs to stdout)
    pub file: Option<PathBuf>,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self { data_dir: PathBuf::from("./data") }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "pretty".to_string(), file: None }
    }
}

/// Load configuration from a file and environment variables
///
/// An explicitly given file must exist; the default `suze.toml` is optional.
pub fn load_config(path: Option<&Path>) -> Result<ServiceConfig> {
    load_config_with_env(path, environment())
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX).prefix_separator("__").separator("__").try_parsing(true)
}

fn load_config_with_env(path: Option<&Path>, env: Environment) -> Result<ServiceConfig> {
    let file = match path {
        Some(path) => File::from(path).required(true),
        None => File::from(Path::new(DEFAULT_CONFIG_FILE)).required(false),
    };

    let config: ServiceConfig = Config::builder()
        .add_source(file)
        .add_source(env)
        .build()
        .context("Failed to read configuration")?
        .try_deserialize()
        .context("Invalid configuration")?;

    validate_config(&config)?;
    Ok(config)
}

/// Validate configuration
pub fn validate_config(config: &ServiceConfig) -> Result<()> {
    match config.logging.level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow::anyhow!("Invalid log level: {}", config.logging.level)),
    }

    match config.logging.format.as_str() {
        "json" | "pretty" | "compact" => {}
        _ => return Err(anyhow::anyhow!("Invalid log format: {}", config.logging.format)),
    }

    if config.service.data_dir.as_os_str().is_empty() {
        return Err(anyhow::anyhow!("service.data_dir must not be empty"));
    }

    config.fetcher.validate().context("Invalid fetcher configuration")?;
    config.scoring.validate().context("Invalid scoring profile")?;

    Ok(())
}
