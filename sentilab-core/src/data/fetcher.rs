//! Fetch orchestrator.
//!
//! Every public fetch walks the same tiers, first success wins:
//!
//! 1. fresh cache entry
//! 2. live provider call, written through to the cache
//! 3. synthetic fallback, never cached
//!
//! The fetch methods are infallible. Provider errors are logged, reported to
//! the [`FetchObserver`] and replaced with synthetic data, so a caller always
//! gets something it can render.
//!
//! Sector correlation joins the live confidence index with live closes. If
//! either side degraded, the joined series is synthetic too, shaped by the
//! sector's profile in the client's [`SectorTable`].

use super::alpha_vantage::AlphaVantageProvider;
use super::cache::{history_key, quotes_key, MarketCache, TtlCache, CONFIDENCE_KEY};
use super::notice::{FetchNotice, FetchObserver, LogObserver, Operation};
use super::provider::{DataError, DataSource, IndicatorProvider, MarketDataProvider, RequestShape};
use super::proxy::SeriesProxyIndicator;
use super::synthetic::{
    fallback_confidence, fallback_quote, generate_series, synthetic_correlation,
    CorrelationProfile, DEFAULT_MONTHS, INDEX_TICKER,
};
use super::yahoo::YahooProvider;
use crate::config::{ClientConfig, IndicatorKind, ProviderKind};
use crate::correlation::join_with_profile;
use crate::domain::{ConfidencePoint, CorrelationPoint, HistoricalPoint, Interval, Quote, Range};
use crate::sectors::SectorTable;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

/// Result of a provider health probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProviderStatus {
    Online { provider: String },
    RateLimited { provider: String, message: String },
    Offline { provider: String, reason: String },
}

impl ProviderStatus {
    pub fn is_online(&self) -> bool {
        matches!(self, ProviderStatus::Online { .. })
    }
}

/// Outcome of the live tier of a quote request.
#[derive(Debug, Default)]
struct LiveQuotes {
    quotes: HashMap<String, Quote>,
    /// Symbols that degraded, grouped by the error that degraded them.
    failures: Vec<(Vec<String>, DataError)>,
}

/// Market data client: cache, live provider and synthetic fallback.
pub struct MarketDataClient {
    market: Arc<dyn MarketDataProvider>,
    indicator: Arc<dyn IndicatorProvider>,
    cache: MarketCache,
    observer: Arc<dyn FetchObserver>,
    sectors: SectorTable,
}

impl MarketDataClient {
    pub fn new(
        market: Arc<dyn MarketDataProvider>,
        indicator: Arc<dyn IndicatorProvider>,
        cache: MarketCache,
    ) -> Self {
        Self {
            market,
            indicator,
            cache,
            observer: Arc::new(LogObserver),
            sectors: SectorTable::default(),
        }
    }

    /// Build the providers named in `config` with a system-clock cache.
    pub fn from_config(config: &ClientConfig) -> Result<Self, DataError> {
        let timeout = config.request_timeout();
        let av = &config.alpha_vantage;

        let market: Arc<dyn MarketDataProvider> = match config.provider {
            ProviderKind::AlphaVantage => Arc::new(AlphaVantageProvider::new(
                av.api_key.clone(),
                av.base_url.clone(),
                timeout,
                av.batch_cap,
            )?),
            ProviderKind::Yahoo => {
                let y = &config.yahoo;
                Arc::new(YahooProvider::new(
                    y.api_key.clone(),
                    y.base_url.clone(),
                    y.host.clone(),
                    timeout,
                    y.batch_cap,
                )?)
            }
        };

        let indicator: Arc<dyn IndicatorProvider> = match config.indicator {
            IndicatorKind::RetailSales => Arc::new(AlphaVantageProvider::new(
                av.api_key.clone(),
                av.base_url.clone(),
                timeout,
                av.batch_cap,
            )?),
            IndicatorKind::SeriesProxy => Arc::new(SeriesProxyIndicator::new(Arc::clone(&market))),
        };

        Ok(Self::new(
            market,
            indicator,
            MarketCache::with_system_clock(config.cache),
        ))
    }

    pub fn with_observer(mut self, observer: Arc<dyn FetchObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Replace the sector table that drives correlation profiles.
    pub fn with_sectors(mut self, sectors: SectorTable) -> Self {
        self.sectors = sectors;
        self
    }

    pub fn sectors(&self) -> &SectorTable {
        &self.sectors
    }

    pub fn cache(&self) -> &MarketCache {
        &self.cache
    }

    pub fn provider_name(&self) -> &str {
        self.market.name()
    }

    fn notify(&self, notice: FetchNotice) {
        self.observer.on_notice(&notice);
    }

    /// Quotes for every symbol in `symbols`.
    ///
    /// Symbols past the provider's batch cap are served from the fallback
    /// table without a network call. The result is cached only when every
    /// symbol inside the cap resolved live.
    pub async fn fetch_stock_data(&self, symbols: &[String]) -> HashMap<String, Quote> {
        if symbols.is_empty() {
            return HashMap::new();
        }

        let cap = self
            .market
            .batch_cap()
            .unwrap_or(symbols.len())
            .min(symbols.len());
        let (window, capped) = symbols.split_at(cap);
        let key = quotes_key(symbols);

        if let Some(mut cached) = self.cache.quotes.get(&key) {
            debug!(key = %key, "quote cache hit");
            for symbol in capped {
                cached
                    .entry(symbol.clone())
                    .or_insert_with(|| fallback_quote(symbol));
            }
            return cached;
        }

        let LiveQuotes { quotes, failures } = self.fetch_live_quotes(window).await;

        if !quotes.is_empty() {
            let resolved: Vec<String> = window
                .iter()
                .filter(|s| quotes.contains_key(s.as_str()))
                .cloned()
                .collect();
            self.notify(FetchNotice::Live {
                operation: Operation::StockData,
                provider: self.market.name().to_string(),
                symbols: resolved,
            });
            if failures.is_empty() {
                self.cache.quotes.set(key, quotes.clone());
            }
        }

        let mut result = quotes;
        for (degraded, err) in failures {
            for symbol in &degraded {
                result.insert(symbol.clone(), fallback_quote(symbol));
            }
            self.notify(FetchNotice::Fallback {
                operation: Operation::StockData,
                symbols: degraded,
                reason: err.to_string(),
            });
        }

        if !capped.is_empty() {
            for symbol in capped {
                result
                    .entry(symbol.clone())
                    .or_insert_with(|| fallback_quote(symbol));
            }
            self.notify(FetchNotice::Fallback {
                operation: Operation::StockData,
                symbols: capped.to_vec(),
                reason: format!("beyond batch cap of {cap}"),
            });
        }

        result
    }

    async fn fetch_live_quotes(&self, window: &[String]) -> LiveQuotes {
        let mut live = LiveQuotes::default();
        if window.is_empty() {
            return live;
        }

        let batches: Vec<Vec<String>> = match self.market.request_shape() {
            RequestShape::Batched => vec![window.to_vec()],
            RequestShape::PerSymbol => window.iter().map(|s| vec![s.clone()]).collect(),
        };
        debug!(provider = self.market.name(), calls = batches.len(), "fetching live quotes");

        let results = join_all(batches.iter().map(|b| self.market.fetch_quotes(b))).await;

        for (batch, result) in batches.into_iter().zip(results) {
            match result {
                Ok(quotes) => {
                    let mut missing = Vec::new();
                    for symbol in batch {
                        match quotes.get(&symbol) {
                            Some(quote) => {
                                live.quotes.insert(symbol, quote.clone());
                            }
                            None => missing.push(symbol),
                        }
                    }
                    if !missing.is_empty() {
                        let err = DataError::PartialData {
                            missing: missing.clone(),
                        };
                        live.failures.push((missing, err));
                    }
                }
                Err(err) => live.failures.push((batch, err)),
            }
        }
        live
    }

    /// Monthly price series for `symbol`.
    pub async fn fetch_historical_data(
        &self,
        symbol: &str,
        interval: Interval,
        range: Range,
    ) -> Vec<HistoricalPoint> {
        self.historical_with_source(symbol, interval, range).await.0
    }

    async fn historical_with_source(
        &self,
        symbol: &str,
        interval: Interval,
        range: Range,
    ) -> (Vec<HistoricalPoint>, DataSource) {
        let key = history_key(symbol, interval.as_str(), range.as_str());
        self.tiered(
            &self.cache.history,
            &key,
            Operation::HistoricalData,
            vec![symbol.to_string()],
            self.market.name(),
            self.market.fetch_series(symbol, interval, range),
            || generate_series(symbol, range.months()),
        )
        .await
    }

    /// Consumer confidence proxy series.
    pub async fn fetch_consumer_confidence_index(&self) -> Vec<ConfidencePoint> {
        self.confidence_with_source().await.0
    }

    async fn confidence_with_source(&self) -> (Vec<ConfidencePoint>, DataSource) {
        self.tiered(
            &self.cache.confidence,
            CONFIDENCE_KEY,
            Operation::ConfidenceIndex,
            Vec::new(),
            self.indicator.name(),
            self.indicator.fetch_confidence(),
            || fallback_confidence(DEFAULT_MONTHS),
        )
        .await
    }

    /// Confidence index joined with two years of monthly closes for `ticker`.
    pub async fn fetch_sector_correlation(&self, ticker: &str) -> Vec<CorrelationPoint> {
        let ((confidence, cci_source), (history, history_source)) = tokio::join!(
            self.confidence_with_source(),
            self.historical_with_source(ticker, Interval::Monthly, Range::TwoYears),
        );
        let profile = CorrelationProfile::for_ticker(&self.sectors, ticker);

        if cci_source == DataSource::Synthetic || history_source == DataSource::Synthetic {
            debug!(ticker, "correlation input degraded, using synthetic series");
            return synthetic_correlation(profile, DEFAULT_MONTHS);
        }
        join_with_profile(&confidence, &history, profile, &mut rand::thread_rng())
    }

    /// Probe the market provider with one live index quote, bypassing the cache.
    pub async fn check_status(&self) -> ProviderStatus {
        let provider = self.market.name().to_string();
        let symbols = [INDEX_TICKER.to_string()];
        match self.market.fetch_quotes(&symbols).await {
            Ok(quotes) if quotes.contains_key(INDEX_TICKER) => ProviderStatus::Online { provider },
            Ok(_) => ProviderStatus::Offline {
                provider,
                reason: DataError::PartialData {
                    missing: symbols.to_vec(),
                }
                .to_string(),
            },
            Err(DataError::RateLimited(message)) => {
                ProviderStatus::RateLimited { provider, message }
            }
            Err(e) => ProviderStatus::Offline {
                provider,
                reason: e.to_string(),
            },
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn tiered<T, Fut, F>(
        &self,
        cache: &TtlCache<Vec<T>>,
        key: &str,
        operation: Operation,
        symbols: Vec<String>,
        provider: &str,
        live: Fut,
        fallback: F,
    ) -> (Vec<T>, DataSource)
    where
        T: Clone,
        Fut: Future<Output = Result<Vec<T>, DataError>>,
        F: FnOnce() -> Vec<T>,
    {
        if let Some(hit) = cache.get(key) {
            debug!(key, "cache hit");
            return (hit, DataSource::Cache);
        }

        let reason = match live.await {
            Ok(data) if !data.is_empty() => {
                cache.set(key, data.clone());
                self.notify(FetchNotice::Live {
                    operation,
                    provider: provider.to_string(),
                    symbols,
                });
                return (data, DataSource::Live);
            }
            Ok(_) => "provider returned no data".to_string(),
            Err(e) => e.to_string(),
        };

        self.notify(FetchNotice::Fallback {
            operation,
            symbols,
            reason,
        });
        (fallback(), DataSource::Synthetic)
    }
}
