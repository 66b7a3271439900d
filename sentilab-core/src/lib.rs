//! SentiLab Core: market data acquisition for the sentiment dashboard.
//!
//! This crate fetches sector ETF quotes, price series and a consumer
//! confidence proxy, and normalizes them into one schema:
//! - Domain types (quotes, monthly series points, request parameters)
//! - Provider adapters for Yahoo Finance and Alpha Vantage behind async traits
//! - Per-kind TTL cache with an injectable clock
//! - Synthetic fallback data so every request yields something renderable
//! - Date-keyed join of the confidence index with sector returns

pub mod config;
pub mod correlation;
pub mod data;
pub mod domain;
pub mod sectors;

pub use config::{ClientConfig, ConfigError, IndicatorKind, ProviderKind};
pub use data::{DataError, MarketDataClient, ProviderStatus};
pub use domain::{ConfidencePoint, CorrelationPoint, HistoricalPoint, Interval, Quote, Range};
pub use sectors::{Sector, SectorTable};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: the client and everything it hands out can cross
    /// task boundaries.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Domain types
        require_send::<Quote>();
        require_sync::<Quote>();
        require_send::<HistoricalPoint>();
        require_sync::<HistoricalPoint>();
        require_send::<ConfidencePoint>();
        require_sync::<ConfidencePoint>();
        require_send::<CorrelationPoint>();
        require_sync::<CorrelationPoint>();

        // Client and its parts
        require_send::<MarketDataClient>();
        require_sync::<MarketDataClient>();
        require_send::<data::MarketCache>();
        require_sync::<data::MarketCache>();
        require_send::<data::AlphaVantageProvider>();
        require_sync::<data::AlphaVantageProvider>();
        require_send::<data::YahooProvider>();
        require_sync::<data::YahooProvider>();
        require_send::<data::FetchNotice>();
        require_sync::<data::FetchNotice>();
        require_send::<DataError>();
        require_sync::<DataError>();
    }

    /// The client is usable behind a trait object for either provider.
    #[test]
    fn providers_are_object_safe() {
        fn _market(_: &dyn data::MarketDataProvider) {}
        fn _indicator(_: &dyn data::IndicatorProvider) {}
        fn _observer(_: &dyn data::FetchObserver) {}
    }
}
