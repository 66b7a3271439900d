//! Data acquisition: provider adapters, caching, synthetic fallback.

pub mod alpha_vantage;
pub mod cache;
pub mod clock;
pub mod fetcher;
mod http;
pub mod notice;
pub mod provider;
pub mod proxy;
pub mod synthetic;
pub mod yahoo;

pub use alpha_vantage::AlphaVantageProvider;
pub use cache::{CacheEntry, CacheTtls, MarketCache, TtlCache};
pub use clock::{Clock, ManualClock, SystemClock};
pub use fetcher::{MarketDataClient, ProviderStatus};
pub use notice::{ChannelObserver, FetchNotice, FetchObserver, LogObserver, Operation, Severity};
pub use provider::{DataError, DataSource, IndicatorProvider, MarketDataProvider, RequestShape};
pub use proxy::SeriesProxyIndicator;
pub use synthetic::{
    fallback_confidence, fallback_quote, generate_series, generate_series_at, seeded_rng,
    synthetic_correlation, CorrelationProfile,
};
pub use yahoo::YahooProvider;
