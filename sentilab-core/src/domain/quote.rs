//! Quote: a point-in-time market snapshot for one symbol.

use serde::{Deserialize, Serialize};

/// Normalized quote shared by every provider.
///
/// `volatility` is never taken from the wire: it is the intraday range as a
/// percentage of price, and is only present when both day bounds are known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
    pub change_percent: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_high: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_low: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volatility: Option<f64>,
}

impl Quote {
    /// Build a quote from raw market fields, deriving volatility from the day range.
    pub fn from_market(
        symbol: impl Into<String>,
        price: f64,
        change_percent: f64,
        volume: Option<u64>,
        day_high: Option<f64>,
        day_low: Option<f64>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            change_percent,
            volume,
            day_high,
            day_low,
            volatility: intraday_volatility(price, day_high, day_low),
        }
    }
}

/// `(high - low) / price * 100`, or `None` when a bound is missing or price is zero.
pub fn intraday_volatility(price: f64, high: Option<f64>, low: Option<f64>) -> Option<f64> {
    let (high, low) = (high?, low?);
    if price == 0.0 || !price.is_finite() || !high.is_finite() || !low.is_finite() {
        return None;
    }
    Some((high - low) / price * 100.0)
}
