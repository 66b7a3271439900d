//! Provider traits and structured error types.
//!
//! Two capabilities sit behind traits so adapters can be swapped at
//! construction time and mocked in tests:
//! - [`MarketDataProvider`]: quotes and price series (Yahoo, Alpha Vantage)
//! - [`IndicatorProvider`]: the consumer confidence proxy series
//!
//! The cache and the fallback tiers live above these traits; adapters never
//! see the cache and never invent data.

use crate::domain::{ConfidencePoint, HistoricalPoint, Interval, Quote, Range};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Failure of a single adapter call.
///
/// Every variant degrades to synthetic data in the orchestrator; none is
/// surfaced to the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("network failure: {0}")]
    NetworkFailure(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("rate limited by provider: {0}")]
    RateLimited(String),

    #[error("partial data: no quote for {}", missing.join(", "))]
    PartialData { missing: Vec<String> },

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("provider misconfigured: {0}")]
    Config(String),
}

impl DataError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, DataError::RateLimited(_))
    }
}

/// How a provider sequences a multi-symbol quote request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestShape {
    /// One request carries every symbol.
    Batched,
    /// One request per symbol.
    PerSymbol,
}

/// Where a piece of returned data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Cache,
    Live,
    Synthetic,
}

/// Quote/chart provider adapter.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Whether quotes are fetched in one batched call or one call per symbol.
    fn request_shape(&self) -> RequestShape;

    /// Maximum number of symbols attempted live per quote request.
    /// Symbols beyond the cap go straight to fallback. `None` means unlimited.
    fn batch_cap(&self) -> Option<usize>;

    /// Fetch quotes for `symbols`.
    ///
    /// Symbols the provider did not return are absent from the map; that is
    /// not an error. A response without the expected envelope is.
    async fn fetch_quotes(&self, symbols: &[String]) -> Result<HashMap<String, Quote>, DataError>;

    /// Fetch a monthly-keyed, ascending price series.
    async fn fetch_series(
        &self,
        symbol: &str,
        interval: Interval,
        range: Range,
    ) -> Result<Vec<HistoricalPoint>, DataError>;
}

/// Economic indicator adapter producing the consumer confidence proxy.
#[async_trait]
pub trait IndicatorProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Fetch the confidence series, ascending by month.
    async fn fetch_confidence(&self) -> Result<Vec<ConfidencePoint>, DataError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_data_lists_missing_symbols() {
        let err = DataError::PartialData {
            missing: vec!["XLE".into(), "XLU".into()],
        };
        assert_eq!(err.to_string(), "partial data: no quote for XLE, XLU");
    }

    #[test]
    fn rate_limit_detection() {
        assert!(DataError::RateLimited("quota".into()).is_rate_limited());
        assert!(!DataError::NetworkFailure("dns".into()).is_rate_limited());
    }
}
