//! Confidence proxy derived from an index price series.

use super::provider::{DataError, IndicatorProvider, MarketDataProvider};
use super::synthetic::INDEX_TICKER;
use crate::domain::{index_level_to_cci, ConfidencePoint, Interval, Range};
use async_trait::async_trait;
use std::sync::Arc;

/// Maps two years of monthly SPY closes onto the confidence scale.
pub struct SeriesProxyIndicator {
    source: Arc<dyn MarketDataProvider>,
}

impl SeriesProxyIndicator {
    pub fn new(source: Arc<dyn MarketDataProvider>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl IndicatorProvider for SeriesProxyIndicator {
    fn name(&self) -> &str {
        "index_series_proxy"
    }

    async fn fetch_confidence(&self) -> Result<Vec<ConfidencePoint>, DataError> {
        let series = self
            .source
            .fetch_series(INDEX_TICKER, Interval::Monthly, Range::TwoYears)
            .await?;
        Ok(series
            .into_iter()
            .map(|p| ConfidencePoint {
                date: p.date,
                cci: index_level_to_cci(p.value),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::provider::RequestShape;
    use crate::domain::{HistoricalPoint, Quote};
    use std::collections::HashMap;

    struct FixedSeries;

    #[async_trait]
    impl MarketDataProvider for FixedSeries {
        fn name(&self) -> &str {
            "fixed"
        }
        fn request_shape(&self) -> RequestShape {
            RequestShape::Batched
        }
        fn batch_cap(&self) -> Option<usize> {
            None
        }
        async fn fetch_quotes(&self, _: &[String]) -> Result<HashMap<String, Quote>, DataError> {
            Ok(HashMap::new())
        }
        async fn fetch_series(
            &self,
            symbol: &str,
            interval: Interval,
            range: Range,
        ) -> Result<Vec<HistoricalPoint>, DataError> {
            assert_eq!((symbol, interval, range), ("SPY", Interval::Monthly, Range::TwoYears));
            Ok(vec![
                HistoricalPoint {
                    date: "2024-01".into(),
                    value: 480.0,
                },
                HistoricalPoint {
                    date: "2024-02".into(),
                    value: 506.0,
                },
            ])
        }
    }

    #[tokio::test]
    async fn index_levels_become_cci() {
        let proxy = SeriesProxyIndicator::new(Arc::new(FixedSeries));
        let cci = proxy.fetch_confidence().await.unwrap();
        assert_eq!(cci[0].cci, 108.0);
        assert_eq!(cci[1].cci, 110.6);
    }
}
