//! Yahoo Finance data provider (RapidAPI `yh-finance` gateway).
//!
//! Quotes are fetched in one batched call; chart series carry unix-second
//! timestamps with a parallel `close` array. The API key and gateway host are
//! sent as `X-RapidAPI-*` headers.

use super::http::{build_http_client, get_json};
use super::provider::{DataError, MarketDataProvider, RequestShape};
use crate::domain::{collapse_monthly, date_from_unix, HistoricalPoint, Interval, Quote, Range};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://yh-finance.p.rapidapi.com";
pub const DEFAULT_HOST: &str = "yh-finance.p.rapidapi.com";

/// `GET /market/v2/get-quotes` response.
#[derive(Debug, Deserialize)]
struct QuotesEnvelope {
    #[serde(rename = "quoteResponse")]
    quote_response: Option<QuoteResponse>,
}

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    result: Option<Vec<RawQuote>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuote {
    symbol: String,
    regular_market_price: Option<f64>,
    regular_market_change_percent: Option<f64>,
    regular_market_volume: Option<f64>,
    regular_market_day_high: Option<f64>,
    regular_market_day_low: Option<f64>,
}

/// `GET /stock/v3/get-chart` response.
#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Option<ChartBody>,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Option<Indicators>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Option<Vec<CloseData>>,
}

#[derive(Debug, Deserialize)]
struct CloseData {
    close: Option<Vec<Option<f64>>>,
}

/// Yahoo Finance provider.
pub struct YahooProvider {
    client: reqwest::Client,
    base_url: String,
    host: String,
    api_key: Option<String>,
    batch_cap: Option<usize>,
}

impl YahooProvider {
    pub fn new(
        api_key: Option<String>,
        base_url: impl Into<String>,
        host: impl Into<String>,
        timeout: Duration,
        batch_cap: Option<usize>,
    ) -> Result<Self, DataError> {
        Ok(Self {
            client: build_http_client(timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            host: host.into(),
            api_key,
            batch_cap,
        })
    }

    fn get(&self, path: &str) -> Result<reqwest::RequestBuilder, DataError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| DataError::Config("no RapidAPI key configured".into()))?;
        Ok(self
            .client
            .get(format!("{}{path}", self.base_url))
            .header("X-RapidAPI-Key", key)
            .header("X-RapidAPI-Host", &self.host))
    }

    /// Parse a batched quote response. Entries without a price are skipped.
    fn parse_quotes(body: Value) -> Result<HashMap<String, Quote>, DataError> {
        let envelope: QuotesEnvelope = serde_json::from_value(body)
            .map_err(|e| DataError::MalformedResponse(format!("quote envelope: {e}")))?;

        let results = envelope
            .quote_response
            .and_then(|r| r.result)
            .ok_or_else(|| DataError::MalformedResponse("missing quoteResponse.result".into()))?;

        let mut quotes = HashMap::with_capacity(results.len());
        for raw in results {
            let Some(price) = raw.regular_market_price.filter(|p| p.is_finite()) else {
                debug!(symbol = %raw.symbol, "quote without price skipped");
                continue;
            };
            let quote = Quote::from_market(
                raw.symbol.clone(),
                price,
                raw.regular_market_change_percent.unwrap_or(0.0),
                raw.regular_market_volume
                    .filter(|v| v.is_finite() && *v >= 0.0)
                    .map(|v| v as u64),
                raw.regular_market_day_high,
                raw.regular_market_day_low,
            );
            quotes.insert(raw.symbol, quote);
        }
        Ok(quotes)
    }

    /// Parse a chart response into a monthly series.
    fn parse_chart(symbol: &str, body: Value) -> Result<Vec<HistoricalPoint>, DataError> {
        let envelope: ChartEnvelope = serde_json::from_value(body)
            .map_err(|e| DataError::MalformedResponse(format!("chart envelope: {e}")))?;
        let chart = envelope
            .chart
            .ok_or_else(|| DataError::MalformedResponse("missing chart".into()))?;

        let data = match (chart.result, chart.error) {
            (Some(result), _) => result.into_iter().next(),
            (None, Some(err)) if err.code == "Not Found" => {
                return Err(DataError::SymbolNotFound {
                    symbol: symbol.to_string(),
                })
            }
            (None, Some(err)) => {
                return Err(DataError::MalformedResponse(format!(
                    "{}: {}",
                    err.code, err.description
                )))
            }
            (None, None) => None,
        }
        .ok_or_else(|| DataError::MalformedResponse("empty chart result".into()))?;

        let timestamps = data
            .timestamp
            .ok_or_else(|| DataError::MalformedResponse("no timestamps".into()))?;
        let closes = data
            .indicators
            .and_then(|i| i.quote)
            .and_then(|q| q.into_iter().next())
            .and_then(|q| q.close)
            .ok_or_else(|| DataError::MalformedResponse("no close prices".into()))?;

        let dated = timestamps.iter().enumerate().filter_map(|(i, &ts)| {
            Some((date_from_unix(ts)?, closes.get(i).copied().flatten()))
        });
        Ok(collapse_monthly(dated))
    }
}

#[async_trait]
impl MarketDataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn request_shape(&self) -> RequestShape {
        RequestShape::Batched
    }

    fn batch_cap(&self) -> Option<usize> {
        self.batch_cap
    }

    async fn fetch_quotes(&self, symbols: &[String]) -> Result<HashMap<String, Quote>, DataError> {
        if symbols.is_empty() {
            return Ok(HashMap::new());
        }
        let joined = symbols.join(",");
        debug!(symbols = %joined, "fetching batched quotes");
        let request = self
            .get("/market/v2/get-quotes")?
            .query(&[("region", "US"), ("symbols", joined.as_str())]);
        let body = get_json(request, "yahoo quotes").await?;
        Self::parse_quotes(body)
    }

    async fn fetch_series(
        &self,
        symbol: &str,
        interval: Interval,
        range: Range,
    ) -> Result<Vec<HistoricalPoint>, DataError> {
        debug!(symbol, %interval, %range, "fetching chart");
        let request = self.get("/stock/v3/get-chart")?.query(&[
            ("interval", interval.as_str()),
            ("symbol", symbol),
            ("range", range.as_str()),
            ("includePrePost", "false"),
            ("useYfid", "true"),
            ("includeAdjustedClose", "true"),
        ]);
        let body = get_json(request, &format!("yahoo chart {symbol}")).await?;
        Self::parse_chart(symbol, body)
    }
}
