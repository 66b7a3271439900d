//! Alpha Vantage data provider.
//!
//! Quotes come from `GLOBAL_QUOTE`, one request per symbol. Price series come
//! from `TIME_SERIES_{DAILY,WEEKLY,MONTHLY}` with explicit `YYYY-MM-DD` keys.
//! The confidence proxy is scaled from the `RETAIL_SALES` economic series.
//!
//! Alpha Vantage reports throttling and bad symbols with HTTP 200 and a
//! diagnostic field in the body, so every response is checked for `Note`,
//! `Information` and `Error Message` before the payload is read.

use super::http::{build_http_client, get_json, loose_number};
use super::provider::{DataError, IndicatorProvider, MarketDataProvider, RequestShape};
use crate::domain::{
    collapse_monthly, month_key_from_date_str, retail_sales_to_cci, ConfidencePoint,
    HistoricalPoint, Interval, Quote, Range,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use futures::future::join_all;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co";

/// Free-tier allowance per minute.
pub const DEFAULT_BATCH_CAP: usize = 5;

/// Newest retail-sales points kept for the confidence proxy.
const CONFIDENCE_MONTHS: usize = 24;

/// Alpha Vantage provider.
pub struct AlphaVantageProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    batch_cap: Option<usize>,
}

impl AlphaVantageProvider {
    pub fn new(
        api_key: Option<String>,
        base_url: impl Into<String>,
        timeout: Duration,
        batch_cap: Option<usize>,
    ) -> Result<Self, DataError> {
        Ok(Self {
            client: build_http_client(timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            batch_cap,
        })
    }

    /// Issue `GET /query` with `function` and extra parameters, returning the
    /// body after the in-band diagnostics have been checked.
    async fn query(&self, function: &str, params: &[(&str, &str)]) -> Result<Value, DataError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| DataError::Config("no Alpha Vantage API key configured".into()))?;

        let request = self
            .client
            .get(format!("{}/query", self.base_url))
            .query(&[("function", function)])
            .query(params)
            .query(&[("apikey", key)]);

        let body = get_json(request, function).await?;
        let symbol = params
            .iter()
            .find(|(k, _)| *k == "symbol")
            .map(|(_, v)| *v);
        check_diagnostics(&body, symbol)?;
        Ok(body)
    }

    async fn fetch_one_quote(&self, symbol: &str) -> Result<Option<Quote>, DataError> {
        let body = self.query("GLOBAL_QUOTE", &[("symbol", symbol)]).await?;
        parse_global_quote(symbol, &body)
    }
}

/// Map in-band provider diagnostics to errors.
fn check_diagnostics(body: &Value, symbol: Option<&str>) -> Result<(), DataError> {
    for field in ["Note", "Information"] {
        if let Some(msg) = body.get(field).and_then(Value::as_str) {
            return Err(DataError::RateLimited(msg.to_string()));
        }
    }
    if let Some(msg) = body.get("Error Message").and_then(Value::as_str) {
        return Err(match symbol {
            Some(symbol) => DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            },
            None => DataError::MalformedResponse(msg.to_string()),
        });
    }
    Ok(())
}

fn object<'a>(body: &'a Value, key: &str) -> Result<&'a Map<String, Value>, DataError> {
    body.get(key)
        .and_then(Value::as_object)
        .ok_or_else(|| DataError::MalformedResponse(format!("missing \"{key}\"")))
}

/// `Ok(None)` when the quote object is present but empty, which is how the
/// provider answers for a symbol it has no quote for.
fn parse_global_quote(symbol: &str, body: &Value) -> Result<Option<Quote>, DataError> {
    let quote = object(body, "Global Quote")?;
    if quote.is_empty() {
        return Ok(None);
    }

    let Some(price) = loose_number(quote.get("05. price")) else {
        return Err(DataError::MalformedResponse(format!(
            "quote for {symbol} has no price"
        )));
    };
    let volume = loose_number(quote.get("06. volume"))
        .filter(|v| *v >= 0.0)
        .map(|v| v as u64);

    Ok(Some(Quote::from_market(
        symbol,
        price,
        loose_number(quote.get("10. change percent")).unwrap_or(0.0),
        volume,
        loose_number(quote.get("03. high")),
        loose_number(quote.get("04. low")),
    )))
}

fn series_function(interval: Interval) -> &'static str {
    match interval {
        Interval::Daily => "TIME_SERIES_DAILY",
        Interval::Weekly => "TIME_SERIES_WEEKLY",
        Interval::Monthly => "TIME_SERIES_MONTHLY",
    }
}

/// `compact` holds the newest 100 rows: about four months of daily closes,
/// and well over a year of weekly or monthly ones.
fn output_size(interval: Interval, range: Range) -> &'static str {
    let compact_months = match interval {
        Interval::Daily => 4,
        Interval::Weekly | Interval::Monthly => 12,
    };
    if range.months() > compact_months {
        "full"
    } else {
        "compact"
    }
}

/// Parse a `TIME_SERIES_*` body into the last `range.months()` monthly points.
fn parse_time_series(body: &Value, range: Range) -> Result<Vec<HistoricalPoint>, DataError> {
    let series = body
        .as_object()
        .and_then(|obj| {
            obj.iter()
                .find(|(k, _)| k.contains("Time Series"))
                .and_then(|(_, v)| v.as_object())
        })
        .ok_or_else(|| DataError::MalformedResponse("missing time series".into()))?;

    let dated = series.iter().filter_map(|(date, values)| {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
        Some((date, loose_number(values.get("4. close"))))
    });

    let mut points = collapse_monthly(dated);
    let keep = range.months();
    if points.len() > keep {
        points.drain(..points.len() - keep);
    }
    Ok(points)
}

/// Parse a `RETAIL_SALES` body (newest first) into an ascending confidence series.
fn parse_retail_sales(body: &Value) -> Result<Vec<ConfidencePoint>, DataError> {
    let data = body
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| DataError::MalformedResponse("missing \"data\"".into()))?;

    let mut points: Vec<ConfidencePoint> = data
        .iter()
        .take(CONFIDENCE_MONTHS)
        .filter_map(|item| {
            let date = month_key_from_date_str(item.get("date")?.as_str()?)?;
            let sales = loose_number(item.get("value"))?;
            Some(ConfidencePoint {
                date,
                cci: retail_sales_to_cci(sales),
            })
        })
        .collect();
    points.sort_by(|a, b| a.date.cmp(&b.date));
    Ok(points)
}

#[async_trait]
impl MarketDataProvider for AlphaVantageProvider {
    fn name(&self) -> &str {
        "alpha_vantage"
    }

    fn request_shape(&self) -> RequestShape {
        RequestShape::PerSymbol
    }

    fn batch_cap(&self) -> Option<usize> {
        self.batch_cap
    }

    /// One concurrent request per symbol. Per-symbol failures leave the
    /// symbol absent; the call fails only if every request failed.
    async fn fetch_quotes(&self, symbols: &[String]) -> Result<HashMap<String, Quote>, DataError> {
        let results = join_all(symbols.iter().map(|s| self.fetch_one_quote(s))).await;

        let mut quotes = HashMap::with_capacity(symbols.len());
        let mut first_error = None;
        let mut failures = 0;
        for (symbol, result) in symbols.iter().zip(results) {
            match result {
                Ok(Some(quote)) => {
                    quotes.insert(symbol.clone(), quote);
                }
                Ok(None) => debug!(symbol = %symbol, "empty quote"),
                Err(e) => {
                    warn!(symbol = %symbol, error = %e, "quote request failed");
                    failures += 1;
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        match first_error {
            Some(e) if failures == symbols.len() => Err(e),
            _ => Ok(quotes),
        }
    }

    async fn fetch_series(
        &self,
        symbol: &str,
        interval: Interval,
        range: Range,
    ) -> Result<Vec<HistoricalPoint>, DataError> {
        debug!(symbol, %interval, %range, "fetching time series");
        let body = self
            .query(
                series_function(interval),
                &[("symbol", symbol), ("outputsize", output_size(interval, range))],
            )
            .await?;
        parse_time_series(&body, range)
    }
}

#[async_trait]
impl IndicatorProvider for AlphaVantageProvider {
    fn name(&self) -> &str {
        "alpha_vantage_retail_sales"
    }

    async fn fetch_confidence(&self) -> Result<Vec<ConfidencePoint>, DataError> {
        let body = self.query("RETAIL_SALES", &[]).await?;
        parse_retail_sales(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn global_quote_parses_string_fields() {
        let body = json!({
            "Global Quote": {
                "01. symbol": "XLK",
                "03. high": "190.00",
                "04. low": "186.20",
                "05. price": "190.00",
                "06. volume": "5123400",
                "10. change percent": "1.2500%"
            }
        });
        let quote = parse_global_quote("XLK", &body).unwrap().unwrap();
        assert_eq!(quote.price, 190.0);
        assert_eq!(quote.change_percent, 1.25);
        assert_eq!(quote.volume, Some(5_123_400));
        assert!((quote.volatility.unwrap() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn empty_global_quote_is_absent() {
        let body = json!({ "Global Quote": {} });
        assert_eq!(parse_global_quote("XLK", &body).unwrap(), None);
    }

    #[test]
    fn missing_envelope_is_malformed() {
        assert!(matches!(
            parse_global_quote("XLK", &json!({})),
            Err(DataError::MalformedResponse(_))
        ));
    }

    #[test]
    fn diagnostics_map_to_errors() {
        let note = json!({ "Note": "Our standard API rate limit is 25 requests per day." });
        assert!(check_diagnostics(&note, Some("XLK")).unwrap_err().is_rate_limited());

        let info = json!({ "Information": "premium endpoint" });
        assert!(check_diagnostics(&info, None).unwrap_err().is_rate_limited());

        let bad = json!({ "Error Message": "Invalid API call." });
        assert_eq!(
            check_diagnostics(&bad, Some("NOPE")).unwrap_err(),
            DataError::SymbolNotFound {
                symbol: "NOPE".into(),
            }
        );
    }

    #[test]
    fn daily_series_collapses_to_months_and_trims() {
        let body = json!({
            "Meta Data": { "2. Symbol": "XLK" },
            "Time Series (Daily)": {
                "2024-03-28": { "4. close": "210.00" },
                "2024-03-01": { "4. close": "205.00" },
                "2024-02-29": { "4. close": "200.00" },
                "2024-01-31": { "4. close": "195.00" },
                "2023-12-29": { "4. close": "bad" }
            }
        });
        let series = parse_time_series(&body, Range::OneMonth).unwrap();
        assert_eq!(
            series,
            vec![HistoricalPoint {
                date: "2024-03".into(),
                value: 210.0,
            }]
        );

        let series = parse_time_series(&body, Range::OneYear).unwrap();
        let dates: Vec<&str> = series.iter().map(|p| p.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-01", "2024-02", "2024-03"]);
    }

    #[test]
    fn series_without_time_series_key_is_malformed() {
        let body = json!({ "Meta Data": {} });
        assert!(matches!(
            parse_time_series(&body, Range::TwoYears),
            Err(DataError::MalformedResponse(_))
        ));
    }

    #[test]
    fn retail_sales_scaled_and_sorted() {
        let body = json!({
            "name": "Advance Retail Sales",
            "data": [
                { "date": "2024-02-01", "value": "700000" },
                { "date": "2024-01-01", "value": "650000" },
                { "date": "2023-12-01", "value": "." }
            ]
        });
        let cci = parse_retail_sales(&body).unwrap();
        assert_eq!(
            cci,
            vec![
                ConfidencePoint {
                    date: "2024-01".into(),
                    cci: 115.0,
                },
                ConfidencePoint {
                    date: "2024-02".into(),
                    cci: 120.0,
                },
            ]
        );
    }

    #[test]
    fn retail_sales_keeps_newest_24() {
        let data: Vec<Value> = (0..30)
            .map(|i| {
                let date = NaiveDate::from_ymd_opt(2024, 6, 1)
                    .unwrap()
                    .checked_sub_months(chrono::Months::new(i))
                    .unwrap();
                json!({ "date": date.format("%Y-%m-%d").to_string(), "value": "500000" })
            })
            .collect();
        let cci = parse_retail_sales(&json!({ "data": data })).unwrap();
        assert_eq!(cci.len(), 24);
        assert_eq!(cci.last().unwrap().date, "2024-06");
        assert_eq!(cci.first().unwrap().date, "2022-07");
    }

    #[test]
    fn output_size_follows_interval_and_range() {
        assert_eq!(output_size(Interval::Daily, Range::ThreeMonths), "compact");
        assert_eq!(output_size(Interval::Daily, Range::SixMonths), "full");
        assert_eq!(output_size(Interval::Daily, Range::OneYear), "full");
        assert_eq!(output_size(Interval::Weekly, Range::OneYear), "compact");
        assert_eq!(output_size(Interval::Monthly, Range::OneYear), "compact");
        assert_eq!(output_size(Interval::Monthly, Range::TwoYears), "full");
    }
}
