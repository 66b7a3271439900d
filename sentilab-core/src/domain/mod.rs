//! Domain types: quotes, monthly series points, request parameters.

pub mod params;
pub mod quote;
pub mod series;

pub use params::{Interval, ParamError, Range};
pub use quote::{intraday_volatility, Quote};
pub use series::{
    collapse_monthly, date_from_unix, index_level_to_cci, is_month_key, month_key,
    month_key_from_date_str, retail_sales_to_cci, ConfidencePoint, CorrelationPoint,
    HistoricalPoint,
};
