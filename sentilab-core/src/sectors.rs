//! Sector reference table: the ETFs the dashboard tracks.
//!
//! The built-in table lists the six SPDR sector funds. An alternative table
//! can be loaded from TOML:
//!
//! ```toml
//! [[sectors]]
//! name = "Technology"
//! ticker = "XLK"
//! volatility = 24.5
//! sentiment_correlation = 0.68
//! noise_factor = 1.5
//! ```
//!
//! `volatility` and `sentiment_correlation` are illustrative figures for
//! display; `noise_factor` scales synthetic returns for the sector.

use crate::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One tracked sector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    pub name: String,
    pub ticker: String,
    pub volatility: f64,
    pub sentiment_correlation: f64,
    #[serde(default = "default_noise_factor")]
    pub noise_factor: f64,
}

fn default_noise_factor() -> f64 {
    1.0
}

/// (name, ticker, volatility, sentiment correlation, noise factor)
const SPDR_SECTORS: [(&str, &str, f64, f64, f64); 6] = [
    ("Technology", "XLK", 24.5, 0.68, 1.5),
    ("Healthcare", "XLV", 18.2, 0.43, 1.2),
    ("Financials", "XLF", 22.8, 0.71, 1.8),
    ("Consumer Staples", "XLP", 12.4, 0.24, 0.8),
    ("Energy", "XLE", 27.1, 0.52, 2.0),
    ("Utilities", "XLU", 15.3, 0.17, 0.7),
];

/// Ordered list of tracked sectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorTable {
    pub sectors: Vec<Sector>,
}

impl SectorTable {
    /// Load a sector table from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a sector table from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let table: Self = toml::from_str(content)?;
        if table.sectors.is_empty() {
            return Err(ConfigError::Invalid("sector table is empty".into()));
        }
        Ok(table)
    }

    /// The six SPDR sector ETFs.
    pub fn default_spdr() -> Self {
        let sectors = SPDR_SECTORS
            .iter()
            .map(|&(name, ticker, volatility, sentiment_correlation, noise_factor)| Sector {
                name: name.to_string(),
                ticker: ticker.to_string(),
                volatility,
                sentiment_correlation,
                noise_factor,
            })
            .collect();
        Self { sectors }
    }

    /// Tickers in table order.
    pub fn tickers(&self) -> Vec<String> {
        self.sectors.iter().map(|s| s.ticker.clone()).collect()
    }

    pub fn get(&self, ticker: &str) -> Option<&Sector> {
        self.sectors.iter().find(|s| s.ticker == ticker)
    }

    pub fn len(&self) -> usize {
        self.sectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sectors.is_empty()
    }
}

impl Default for SectorTable {
    fn default() -> Self {
        Self::default_spdr()
    }
}
