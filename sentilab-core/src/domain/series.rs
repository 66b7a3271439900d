//! Monthly time series points and the `YYYY-MM` month key.

use chrono::{DateTime, Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One point of a price series, keyed by month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPoint {
    pub date: String,
    pub value: f64,
}

/// One point of the consumer confidence proxy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidencePoint {
    pub date: String,
    pub cci: f64,
}

/// A confidence point joined with the sector value for the same month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationPoint {
    pub date: String,
    pub cci: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<f64>,
}

/// Format a date as its `YYYY-MM` month key.
pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// UTC calendar date of a unix timestamp in seconds.
pub fn date_from_unix(secs: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(secs, 0).map(|dt| dt.date_naive())
}

/// Month key for a `YYYY-MM-DD` date string.
pub fn month_key_from_date_str(s: &str) -> Option<String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .ok()
        .map(month_key)
}

/// True if `s` has the exact `YYYY-MM` shape with a valid month.
pub fn is_month_key(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() != 7 || bytes[4] != b'-' {
        return false;
    }
    if !bytes[..4].iter().chain(&bytes[5..]).all(u8::is_ascii_digit) {
        return false;
    }
    matches!(s[5..].parse::<u32>(), Ok(1..=12))
}

/// Collapse dated observations into an ascending monthly series.
///
/// Missing and non-finite values are dropped. When several observations fall
/// into the same month, the chronologically last one wins.
pub fn collapse_monthly<I>(raw: I) -> Vec<HistoricalPoint>
where
    I: IntoIterator<Item = (NaiveDate, Option<f64>)>,
{
    let mut dated: Vec<(NaiveDate, f64)> = raw
        .into_iter()
        .filter_map(|(d, v)| v.filter(|v| v.is_finite()).map(|v| (d, v)))
        .collect();
    dated.sort_by_key(|(d, _)| *d);

    let mut by_month: BTreeMap<String, f64> = BTreeMap::new();
    for (date, value) in dated {
        by_month.insert(month_key(date), value);
    }

    by_month
        .into_iter()
        .map(|(date, value)| HistoricalPoint { date, value })
        .collect()
}

/// Scale an index level (SPY trades around 400) onto the confidence range around 100.
pub fn index_level_to_cci(level: f64) -> f64 {
    round_to(100.0 + (level - 400.0) / 10.0, 1)
}

/// Scale a monthly retail sales figure (millions of USD) onto the confidence range around 100.
pub fn retail_sales_to_cci(sales: f64) -> f64 {
    round_to(100.0 + (sales - 500_000.0) / 10_000.0, 1)
}

/// Round to a fixed number of decimal places.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn month_key_pads() {
        assert_eq!(month_key(d(2024, 3, 15)), "2024-03");
    }

    #[test]
    fn unix_seconds_map_to_utc_date() {
        // 2024-02-29T12:00:00Z
        let date = date_from_unix(1_709_208_000).unwrap();
        assert_eq!(date, d(2024, 2, 29));
        assert_eq!(month_key(date), "2024-02");
    }

    #[test]
    fn date_string_truncates_to_month() {
        assert_eq!(month_key_from_date_str("2023-11-30").as_deref(), Some("2023-11"));
        assert_eq!(month_key_from_date_str("not a date"), None);
    }

    #[test]
    fn month_key_shape() {
        assert!(is_month_key("2024-01"));
        assert!(!is_month_key("2024-13"));
        assert!(!is_month_key("2024-1"));
        assert!(!is_month_key("2024/01"));
    }

    #[test]
    fn collapse_keeps_last_in_month_and_sorts() {
        let series = collapse_monthly(vec![
            (d(2024, 2, 28), Some(12.0)),
            (d(2024, 1, 31), Some(11.0)),
            (d(2024, 1, 2), Some(10.0)),
            (d(2024, 3, 1), None),
            (d(2024, 4, 1), Some(f64::NAN)),
        ]);
        assert_eq!(
            series,
            vec![
                HistoricalPoint {
                    date: "2024-01".into(),
                    value: 11.0,
                },
                HistoricalPoint {
                    date: "2024-02".into(),
                    value: 12.0,
                },
            ]
        );
    }

    #[test]
    fn correlation_point_omits_missing_returns() {
        let p = CorrelationPoint {
            date: "2024-01".into(),
            cci: 101.5,
            returns: None,
        };
        let json = serde_json::to_string(&p).unwrap();
        assert!(!json.contains("returns"));
    }

    #[test]
    fn confidence_scaling() {
        assert_eq!(index_level_to_cci(400.0), 100.0);
        assert_eq!(index_level_to_cci(420.0), 102.0);
        assert_eq!(retail_sales_to_cci(700_000.0), 120.0);
        assert_eq!(retail_sales_to_cci(512_345.0), 101.2);
    }

    #[test]
    fn rounding() {
        assert_eq!(round_to(1.23456, 2), 1.23);
        assert_eq!(round_to(99.96, 1), 100.0);
    }
}
