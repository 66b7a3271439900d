//! Synthetic data generator.
//!
//! Produces shape-plausible stand-ins when no real data is available: smooth
//! oscillation with a mild downward drift going back in time. The numbers are
//! not meant to be statistically meaningful, only renderable.
//!
//! The series generators are pure functions of (ticker, months, anchor month).
//! The correlation variant draws noise from an RNG; default entry points use
//! the thread RNG, and [`seeded_rng`] gives a reproducible one.

use crate::domain::series::round_to;
use crate::domain::{
    index_level_to_cci, month_key, ConfidencePoint, CorrelationPoint, HistoricalPoint, Quote,
};
use crate::sectors::{Sector, SectorTable};
use chrono::{Datelike, Months, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Ticker whose synthetic series sits on the index tier (~400).
pub const INDEX_TICKER: &str = "SPY";

/// Default length of a synthetic series, in months.
pub const DEFAULT_MONTHS: usize = 24;

/// (symbol, price, change %, volatility)
const FALLBACK_QUOTES: [(&str, f64, f64, f64); 6] = [
    ("XLK", 187.45, 0.75, 1.2),
    ("XLV", 142.31, -0.32, 0.8),
    ("XLF", 39.87, 1.05, 1.5),
    ("XLP", 76.23, 0.21, 0.5),
    ("XLE", 92.68, -1.25, 2.1),
    ("XLU", 68.45, 0.43, 0.7),
];

/// First day of the current UTC month.
pub fn current_month() -> NaiveDate {
    first_of_month(Utc::now().date_naive())
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Base level `i` months back: the index tier starts at 400, everything else at 100.
fn base_value(seed_ticker: &str, step: f64) -> f64 {
    if seed_ticker == INDEX_TICKER {
        400.0 - 2.0 * step
    } else {
        100.0 - step
    }
}

/// `months` points ending at the current month, ascending.
pub fn generate_series(seed_ticker: &str, months: usize) -> Vec<HistoricalPoint> {
    generate_series_at(seed_ticker, months, current_month())
}

/// `months` points ending at the month containing `anchor`, ascending.
pub fn generate_series_at(
    seed_ticker: &str,
    months: usize,
    anchor: NaiveDate,
) -> Vec<HistoricalPoint> {
    let anchor = first_of_month(anchor);
    let mut points: Vec<HistoricalPoint> = (0..months)
        .filter_map(|i| {
            let date = anchor.checked_sub_months(Months::new(u32::try_from(i).ok()?))?;
            let step = i as f64;
            let value = base_value(seed_ticker, step) * (1.0 + (step * 0.5).sin() * 0.1 + 0.05);
            Some(HistoricalPoint {
                date: month_key(date),
                value: round_to(value, 2),
            })
        })
        .collect();
    points.reverse();
    points
}

/// Fixed stand-in quote; unknown tickers get a neutral 100 / 0% / 1.
pub fn fallback_quote(symbol: &str) -> Quote {
    let (price, change_percent, volatility) = FALLBACK_QUOTES
        .iter()
        .find(|(s, ..)| *s == symbol)
        .map(|&(_, p, c, v)| (p, c, v))
        .unwrap_or((100.0, 0.0, 1.0));

    Quote {
        symbol: symbol.to_string(),
        price,
        change_percent,
        volume: None,
        day_high: None,
        day_low: None,
        volatility: Some(volatility),
    }
}

/// Confidence proxy derived from the synthetic index series.
pub fn fallback_confidence(months: usize) -> Vec<ConfidencePoint> {
    fallback_confidence_at(months, current_month())
}

/// Index levels go through [`index_level_to_cci`], the same one-decimal
/// scaling the live series proxy applies, so fallback and live points share
/// a precision.
pub fn fallback_confidence_at(months: usize, anchor: NaiveDate) -> Vec<ConfidencePoint> {
    generate_series_at(INDEX_TICKER, months, anchor)
        .into_iter()
        .map(|p| ConfidencePoint {
            date: p.date,
            cci: index_level_to_cci(p.value),
        })
        .collect()
}

/// How strongly a sector's synthetic returns follow the confidence index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrelationProfile {
    pub correlation: f64,
    pub noise_factor: f64,
}

impl Default for CorrelationProfile {
    fn default() -> Self {
        Self {
            correlation: 0.5,
            noise_factor: 1.0,
        }
    }
}

impl CorrelationProfile {
    pub fn from_sector(sector: &Sector) -> Self {
        Self {
            correlation: sector.sentiment_correlation,
            noise_factor: sector.noise_factor,
        }
    }

    /// Profile of `ticker` in `sectors`, or the default for anything else.
    pub fn for_ticker(sectors: &SectorTable, ticker: &str) -> Self {
        sectors
            .get(ticker)
            .map(Self::from_sector)
            .unwrap_or_default()
    }
}

/// Joined confidence/returns series with random noise, ending at the current month.
pub fn synthetic_correlation(profile: CorrelationProfile, months: usize) -> Vec<CorrelationPoint> {
    synthetic_correlation_at(profile, months, current_month(), &mut rand::thread_rng())
}

/// Joined confidence/returns series ending at `anchor`, noise drawn from `rng`.
///
/// `returns = cci_norm * corr * 5 * k + (u - 0.5) * (1 - |corr|) * 6 * k`
/// where `cci_norm = (cci - 100) / 50`, `k` is the noise factor and `u` is
/// uniform in `[0, 1)`.
pub fn synthetic_correlation_at<R: Rng + ?Sized>(
    profile: CorrelationProfile,
    months: usize,
    anchor: NaiveDate,
    rng: &mut R,
) -> Vec<CorrelationPoint> {
    let CorrelationProfile {
        correlation,
        noise_factor,
    } = profile;

    fallback_confidence_at(months, anchor)
        .into_iter()
        .map(|c| {
            let normalized = (c.cci - 100.0) / 50.0;
            let noise = (rng.gen::<f64>() - 0.5) * (1.0 - correlation.abs()) * 6.0 * noise_factor;
            let returns = normalized * correlation * 5.0 * noise_factor + noise;
            CorrelationPoint {
                date: c.date,
                cci: c.cci,
                returns: Some(round_to(returns, 2)),
            }
        })
        .collect()
}

/// Deterministic RNG derived from a label via BLAKE3.
pub fn seeded_rng(label: &str) -> StdRng {
    let seed: [u8; 32] = *blake3::hash(label.as_bytes()).as_bytes();
    StdRng::from_seed(seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::is_month_key;

    fn anchor() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 17).unwrap()
    }

    #[test]
    fn series_has_requested_length_ending_at_anchor() {
        let series = generate_series_at("XLK", 24, anchor());
        assert_eq!(series.len(), 24);
        assert_eq!(series.first().unwrap().date, "2022-04");
        assert_eq!(series.last().unwrap().date, "2024-03");
        for w in series.windows(2) {
            assert!(w[0].date < w[1].date);
        }
        assert!(series.iter().all(|p| is_month_key(&p.date)));
    }

    #[test]
    fn series_values_follow_tiered_formula() {
        let spy = generate_series_at("SPY", 3, anchor());
        // i = 0 is the newest point: 400 * 1.05
        assert_eq!(spy[2].value, 420.0);
        // i = 1: 398 * (1 + sin(0.5) * 0.1 + 0.05)
        let expected = 398.0 * (1.0 + 0.5f64.sin() * 0.1 + 0.05);
        assert_eq!(spy[1].value, (expected * 100.0).round() / 100.0);

        let other = generate_series_at("XLE", 1, anchor());
        assert_eq!(other[0].value, 105.0);
    }

    #[test]
    fn zero_months_is_empty() {
        assert!(generate_series("XLK", 0).is_empty());
    }

    #[test]
    fn live_anchor_ends_at_current_month() {
        let series = generate_series("XLV", 2);
        assert_eq!(series[1].date, month_key(current_month()));
    }

    #[test]
    fn fallback_quote_table_and_default() {
        let xlu = fallback_quote("XLU");
        assert_eq!(xlu.price, 68.45);
        assert_eq!(xlu.change_percent, 0.43);
        assert_eq!(xlu.volatility, Some(0.7));

        let unknown = fallback_quote("ZZZZ");
        assert_eq!(unknown.symbol, "ZZZZ");
        assert_eq!(unknown.price, 100.0);
        assert_eq!(unknown.change_percent, 0.0);
        assert_eq!(unknown.volatility, Some(1.0));
    }

    #[test]
    fn fallback_confidence_maps_index_series() {
        let cci = fallback_confidence_at(24, anchor());
        assert_eq!(cci.len(), 24);
        // newest point: 100 + (420 - 400) / 10
        assert_eq!(cci.last().unwrap().cci, 102.0);
    }

    #[test]
    fn seeded_correlation_is_reproducible() {
        let profile = CorrelationProfile::for_ticker(&SectorTable::default(), "XLF");
        let a = synthetic_correlation_at(profile, 24, anchor(), &mut seeded_rng("xlf"));
        let b = synthetic_correlation_at(profile, 24, anchor(), &mut seeded_rng("xlf"));
        assert_eq!(a, b);
        assert_eq!(a.len(), 24);
        assert!(a.iter().all(|p| p.returns.is_some()));
    }

    #[test]
    fn correlation_noise_is_bounded() {
        let profile = CorrelationProfile::default();
        let points = synthetic_correlation_at(profile, 24, anchor(), &mut seeded_rng("bounds"));
        for p in points {
            let signal = (p.cci - 100.0) / 50.0 * profile.correlation * 5.0;
            // |noise| <= 0.5 * (1 - 0.5) * 6 = 1.5, plus rounding
            assert!((p.returns.unwrap() - signal).abs() <= 1.5 + 0.01);
        }
    }

    #[test]
    fn live_correlation_has_requested_months() {
        let points = synthetic_correlation(CorrelationProfile::default(), 12);
        assert_eq!(points.len(), 12);
        assert_eq!(points.last().unwrap().date, month_key(current_month()));
        assert!(points.iter().all(|p| is_month_key(&p.date) && p.returns.is_some()));
    }

    #[test]
    fn fallback_confidence_has_one_decimal() {
        for p in fallback_confidence_at(24, anchor()) {
            assert_eq!(p.cci, (p.cci * 10.0).round() / 10.0, "{}", p.date);
        }
    }

    #[test]
    fn profile_comes_from_the_given_table() {
        let spdr = SectorTable::default();
        assert_eq!(
            CorrelationProfile::for_ticker(&spdr, "SPY"),
            CorrelationProfile::default()
        );
        assert_eq!(CorrelationProfile::for_ticker(&spdr, "XLK").noise_factor, 1.5);

        let custom = SectorTable {
            sectors: vec![Sector {
                name: "Semis".into(),
                ticker: "SMH".into(),
                volatility: 30.0,
                sentiment_correlation: 0.9,
                noise_factor: 3.0,
            }],
        };
        assert_eq!(
            CorrelationProfile::for_ticker(&custom, "SMH"),
            CorrelationProfile {
                correlation: 0.9,
                noise_factor: 3.0,
            }
        );
        assert_eq!(
            CorrelationProfile::for_ticker(&custom, "XLK"),
            CorrelationProfile::default()
        );
    }
}
