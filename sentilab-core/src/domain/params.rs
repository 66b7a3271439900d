//! Request parameters for historical series.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
    #[error("unknown interval '{0}' (expected 1d, 1wk or 1mo)")]
    UnknownInterval(String),

    #[error("unknown range '{0}' (expected 1mo, 3mo, 6mo, 1y, 2y or 5y)")]
    UnknownRange(String),
}

/// Sampling interval of a historical series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Interval {
    Daily,
    Weekly,
    Monthly,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Daily => "1d",
            Interval::Weekly => "1wk",
            Interval::Monthly => "1mo",
        }
    }
}

impl Default for Interval {
    fn default() -> Self {
        Interval::Monthly
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1d" => Ok(Interval::Daily),
            "1wk" => Ok(Interval::Weekly),
            "1mo" => Ok(Interval::Monthly),
            other => Err(ParamError::UnknownInterval(other.to_string())),
        }
    }
}

impl TryFrom<String> for Interval {
    type Error = ParamError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Interval> for String {
    fn from(i: Interval) -> Self {
        i.as_str().to_string()
    }
}

/// Lookback window of a historical series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Range {
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    TwoYears,
    FiveYears,
}

impl Range {
    pub fn as_str(&self) -> &'static str {
        match self {
            Range::OneMonth => "1mo",
            Range::ThreeMonths => "3mo",
            Range::SixMonths => "6mo",
            Range::OneYear => "1y",
            Range::TwoYears => "2y",
            Range::FiveYears => "5y",
        }
    }

    /// Span of the window in months.
    pub fn months(&self) -> usize {
        match self {
            Range::OneMonth => 1,
            Range::ThreeMonths => 3,
            Range::SixMonths => 6,
            Range::OneYear => 12,
            Range::TwoYears => 24,
            Range::FiveYears => 60,
        }
    }
}

impl Default for Range {
    fn default() -> Self {
        Range::TwoYears
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Range {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1mo" => Ok(Range::OneMonth),
            "3mo" => Ok(Range::ThreeMonths),
            "6mo" => Ok(Range::SixMonths),
            "1y" => Ok(Range::OneYear),
            "2y" => Ok(Range::TwoYears),
            "5y" => Ok(Range::FiveYears),
            other => Err(ParamError::UnknownRange(other.to_string())),
        }
    }
}

impl TryFrom<String> for Range {
    type Error = ParamError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Range> for String {
    fn from(r: Range) -> Self {
        r.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_dashboard_request() {
        assert_eq!(Interval::default().to_string(), "1mo");
        assert_eq!(Range::default().to_string(), "2y");
        assert_eq!(Range::default().months(), 24);
    }

    #[test]
    fn parse_rejects_unknown() {
        assert_eq!(
            "2h".parse::<Interval>(),
            Err(ParamError::UnknownInterval("2h".into()))
        );
        assert!("10y".parse::<Range>().is_err());
    }

    #[test]
    fn serde_uses_wire_strings() {
        let json = serde_json::to_string(&Range::FiveYears).unwrap();
        assert_eq!(json, "\"5y\"");
        let back: Interval = serde_json::from_str("\"1wk\"").unwrap();
        assert_eq!(back, Interval::Weekly);
    }
}
