use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Configuration for the Fantasy Premier League fetcher
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// Public API configuration
    pub api: ApiConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL, without a trailing slash
    pub base_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://fantasy.premierleague.com/api".to_string(),
            timeout_secs: 30,
            user_agent: concat!("suze/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl FetcherConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Ok(base_url) = std::env::var("FPL_BASE_URL") {
            config.api.base_url = base_url;
        }

        if let Ok(timeout) = std::env::var("FPL_TIMEOUT_SECS") {
            config.api.timeout_secs =
                timeout.parse().context("FPL_TIMEOUT_SECS must be a whole number of seconds")?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(self.api.base_url.starts_with("http://") || self.api.base_url.starts_with("https://")) {
            anyhow::bail!("api.base_url must be an http(s) URL, got '{}'", self.api.base_url);
        }
        if self.api.base_url.ends_with('/') {
            anyhow::bail!("api.base_url must not end with '/'");
        }
        if self.api.timeout_secs == 0 {
            anyhow::bail!("api.timeout_secs must be greater than 0");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = FetcherConfig::default();
        config.validate().unwrap();
        assert_eq!(config.api.base_url, "https://fantasy.premierleague.com/api");
    }

    #[test]
    fn test_trailing_slash_is_rejected() {
        let mut config = FetcherConfig::default();
        config.api.base_url.push('/');
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let mut config = FetcherConfig::default();
        config.api.timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
