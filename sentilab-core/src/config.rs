//! Client configuration.
//!
//! Every field has a default, so an empty TOML file (or none at all) yields a
//! working client that falls back to synthetic data until API keys are set.
//!
//! ```toml
//! provider = "yahoo"
//! indicator = "series_proxy"
//! request_timeout_secs = 15
//!
//! [cache]
//! quotes_ms = 300000
//!
//! [yahoo]
//! api_key = "..."
//! ```

use crate::data::cache::CacheTtls;
use crate::data::{alpha_vantage, yahoo};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Environment variable holding the Alpha Vantage API key.
pub const ALPHA_VANTAGE_KEY_ENV: &str = "ALPHA_VANTAGE_API_KEY";

/// Environment variable holding the RapidAPI key used for Yahoo Finance.
pub const RAPIDAPI_KEY_ENV: &str = "RAPIDAPI_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Which quote/chart provider the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    #[default]
    AlphaVantage,
    Yahoo,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProviderKind::AlphaVantage => "alpha-vantage",
            ProviderKind::Yahoo => "yahoo",
        })
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "alpha-vantage" | "alpha_vantage" | "alphavantage" => Ok(ProviderKind::AlphaVantage),
            "yahoo" => Ok(ProviderKind::Yahoo),
            other => Err(ConfigError::Invalid(format!("unknown provider: {other}"))),
        }
    }
}

/// Where the consumer confidence proxy comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorKind {
    /// Alpha Vantage `RETAIL_SALES`.
    #[default]
    RetailSales,
    /// SPY monthly closes from the active market provider.
    SeriesProxy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlphaVantageConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub batch_cap: Option<usize>,
}

impl Default for AlphaVantageConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: alpha_vantage::DEFAULT_BASE_URL.to_string(),
            batch_cap: Some(alpha_vantage::DEFAULT_BATCH_CAP),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct YahooConfig {
    pub api_key: Option<String>,
    pub host: String,
    pub base_url: String,
    pub batch_cap: Option<usize>,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            host: yahoo::DEFAULT_HOST.to_string(),
            base_url: yahoo::DEFAULT_BASE_URL.to_string(),
            batch_cap: None,
        }
    }
}

/// Top-level client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub provider: ProviderKind,
    pub indicator: IndicatorKind,
    pub request_timeout_secs: u64,
    pub cache: CacheTtls,
    pub alpha_vantage: AlphaVantageConfig,
    pub yahoo: YahooConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            indicator: IndicatorKind::default(),
            request_timeout_secs: 30,
            cache: CacheTtls::default(),
            alpha_vantage: AlphaVantageConfig::default(),
            yahoo: YahooConfig::default(),
        }
    }
}

impl ClientConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Fill API keys from the environment. Keys already set in the file win.
    pub fn with_env(self) -> Self {
        self.apply_env(|name| std::env::var(name).ok())
    }

    /// Fill API keys from `lookup`, which maps a variable name to its value.
    pub fn apply_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let nonempty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        if self.alpha_vantage.api_key.is_none() {
            self.alpha_vantage.api_key = nonempty(ALPHA_VANTAGE_KEY_ENV);
        }
        if self.yahoo.api_key.is_none() {
            self.yahoo.api_key = nonempty(RAPIDAPI_KEY_ENV);
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid("request_timeout_secs must be > 0".into()));
        }
        for (name, cap) in [
            ("alpha_vantage", self.alpha_vantage.batch_cap),
            ("yahoo", self.yahoo.batch_cap),
        ] {
            if cap == Some(0) {
                return Err(ConfigError::Invalid(format!(
                    "{name}.batch_cap must be at least 1"
                )));
            }
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
