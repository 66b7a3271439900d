//! Date-keyed join of the confidence index with a sector's price series.

use crate::data::synthetic::{
    current_month, synthetic_correlation_at, CorrelationProfile, DEFAULT_MONTHS,
};
use crate::domain::{ConfidencePoint, CorrelationPoint, HistoricalPoint};
use rand::Rng;
use std::collections::HashMap;

/// Join `confidence` with `returns` on the `YYYY-MM` key.
///
/// Output follows the confidence series point for point; months with no
/// matching return keep `returns: None`. If either input is empty the result
/// is a synthetic series under the default profile.
pub fn join(confidence: &[ConfidencePoint], returns: &[HistoricalPoint]) -> Vec<CorrelationPoint> {
    join_with_rng(confidence, returns, &mut rand::thread_rng())
}

/// [`join`] with the synthetic fallback drawn from `rng`.
pub fn join_with_rng<R: Rng + ?Sized>(
    confidence: &[ConfidencePoint],
    returns: &[HistoricalPoint],
    rng: &mut R,
) -> Vec<CorrelationPoint> {
    join_with_profile(confidence, returns, CorrelationProfile::default(), rng)
}

/// [`join_with_rng`] with a sector-specific profile for the synthetic fallback.
pub fn join_with_profile<R: Rng + ?Sized>(
    confidence: &[ConfidencePoint],
    returns: &[HistoricalPoint],
    profile: CorrelationProfile,
    rng: &mut R,
) -> Vec<CorrelationPoint> {
    if confidence.is_empty() || returns.is_empty() {
        return synthetic_correlation_at(profile, DEFAULT_MONTHS, current_month(), rng);
    }

    let by_month: HashMap<&str, f64> = returns
        .iter()
        .map(|p| (p.date.as_str(), p.value))
        .collect();

    confidence
        .iter()
        .map(|c| CorrelationPoint {
            date: c.date.clone(),
            cci: c.cci,
            returns: by_month.get(c.date.as_str()).copied(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::synthetic::seeded_rng;

    fn cci(date: &str, v: f64) -> ConfidencePoint {
        ConfidencePoint {
            date: date.into(),
            cci: v,
        }
    }

    fn hist(date: &str, v: f64) -> HistoricalPoint {
        HistoricalPoint {
            date: date.into(),
            value: v,
        }
    }

    #[test]
    fn unmatched_months_are_kept_without_returns() {
        let confidence = vec![cci("2024-01", 101.0), cci("2024-02", 99.5), cci("2024-03", 100.2)];
        let returns = vec![hist("2024-03", 212.0), hist("2024-01", 200.0), hist("2023-12", 1.0)];

        let joined = join(&confidence, &returns);
        assert_eq!(
            joined,
            vec![
                CorrelationPoint {
                    date: "2024-01".into(),
                    cci: 101.0,
                    returns: Some(200.0),
                },
                CorrelationPoint {
                    date: "2024-02".into(),
                    cci: 99.5,
                    returns: None,
                },
                CorrelationPoint {
                    date: "2024-03".into(),
                    cci: 100.2,
                    returns: Some(212.0),
                },
            ]
        );
    }

    #[test]
    fn empty_input_yields_synthetic_series() {
        let joined = join_with_rng(&[], &[hist("2024-01", 1.0)], &mut seeded_rng("empty"));
        assert_eq!(joined.len(), DEFAULT_MONTHS);
        assert!(joined.iter().all(|p| p.returns.is_some()));

        let joined = join(&[cci("2024-01", 100.0)], &[]);
        assert_eq!(joined.len(), DEFAULT_MONTHS);
    }

    #[test]
    fn seeded_fallback_is_reproducible() {
        let a = join_with_rng(&[], &[], &mut seeded_rng("x"));
        let b = join_with_rng(&[], &[], &mut seeded_rng("x"));
        assert_eq!(a, b);
    }
}
