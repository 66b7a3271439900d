//! Advisory notices emitted to the consuming layer.
//!
//! Notices are informational: they tell a UI whether it is showing live or
//! synthetic data. Cache hits emit nothing.

use super::provider::DataSource;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Public operation a notice refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    StockData,
    HistoricalData,
    ConfidenceIndex,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::StockData => "stock data",
            Operation::HistoricalData => "historical data",
            Operation::ConfidenceIndex => "confidence index",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FetchNotice {
    /// Fresh data came from the provider.
    Live {
        operation: Operation,
        provider: String,
        symbols: Vec<String>,
    },
    /// Synthetic data was substituted.
    Fallback {
        operation: Operation,
        symbols: Vec<String>,
        reason: String,
    },
}

impl FetchNotice {
    pub fn operation(&self) -> Operation {
        match self {
            FetchNotice::Live { operation, .. } | FetchNotice::Fallback { operation, .. } => {
                *operation
            }
        }
    }

    pub fn source(&self) -> DataSource {
        match self {
            FetchNotice::Live { .. } => DataSource::Live,
            FetchNotice::Fallback { .. } => DataSource::Synthetic,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            FetchNotice::Live { .. } => Severity::Info,
            FetchNotice::Fallback { .. } => Severity::Warning,
        }
    }

    pub fn symbols(&self) -> &[String] {
        match self {
            FetchNotice::Live { symbols, .. } | FetchNotice::Fallback { symbols, .. } => symbols,
        }
    }
}

impl fmt::Display for FetchNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchNotice::Live {
                operation,
                provider,
                ..
            } => write!(f, "using live {operation} from {provider}"),
            FetchNotice::Fallback {
                operation,
                symbols,
                reason,
            } if symbols.is_empty() => write!(f, "using fallback {operation}: {reason}"),
            FetchNotice::Fallback {
                operation,
                symbols,
                reason,
            } => write!(
                f,
                "using fallback {operation} for {}: {reason}",
                symbols.join(", ")
            ),
        }
    }
}

/// Receiver of advisory notices.
pub trait FetchObserver: Send + Sync {
    fn on_notice(&self, notice: &FetchNotice);
}

/// Observer that writes notices to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl FetchObserver for LogObserver {
    fn on_notice(&self, notice: &FetchNotice) {
        match notice.severity() {
            Severity::Info => info!(operation = ?notice.operation(), "{notice}"),
            Severity::Warning => warn!(operation = ?notice.operation(), "{notice}"),
        }
    }
}

/// Observer that forwards notices over an unbounded channel.
///
/// A dropped receiver is not an error; notices are advisory.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<FetchNotice>,
}

impl ChannelObserver {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<FetchNotice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl FetchObserver for ChannelObserver {
    fn on_notice(&self, notice: &FetchNotice) {
        let _ = self.tx.send(notice.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_is_a_warning_from_synthetic_source() {
        let notice = FetchNotice::Fallback {
            operation: Operation::StockData,
            symbols: vec!["XLU".into()],
            reason: "beyond batch cap".into(),
        };
        assert_eq!(notice.severity(), Severity::Warning);
        assert_eq!(notice.source(), DataSource::Synthetic);
        assert_eq!(
            notice.to_string(),
            "using fallback stock data for XLU: beyond batch cap"
        );
    }

    #[test]
    fn channel_observer_forwards_and_tolerates_dropped_receiver() {
        let (observer, mut rx) = ChannelObserver::channel();
        let notice = FetchNotice::Live {
            operation: Operation::ConfidenceIndex,
            provider: "alpha_vantage".into(),
            symbols: vec![],
        };
        observer.on_notice(&notice);
        assert_eq!(rx.try_recv().unwrap(), notice);

        drop(rx);
        observer.on_notice(&notice);
    }

    #[test]
    fn notice_serializes_with_kind_tag() {
        let notice = FetchNotice::Live {
            operation: Operation::HistoricalData,
            provider: "yahoo".into(),
            symbols: vec!["XLK".into()],
        };
        let json = serde_json::to_value(&notice).unwrap();
        assert_eq!(json["kind"], "live");
        assert_eq!(json["operation"], "historical_data");
    }
}
