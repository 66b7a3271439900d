//! In-memory TTL cache, one typed store per data kind.
//!
//! Entries are stamped with the injected clock on write and ignored on read
//! once `now - timestamp >= ttl`. Stale entries are never deleted, only
//! overwritten by the next successful live fetch. There is no eviction and no
//! size bound: the key space is the set of distinct (operation, parameters)
//! pairs queried during a session, which is small for a dashboard but grows
//! without limit for an open-ended caller.

use super::clock::{Clock, SystemClock};
use crate::domain::{ConfidencePoint, HistoricalPoint, Quote};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// A cached value with its write time in epoch milliseconds.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub data: T,
    pub timestamp: i64,
}

/// Key/value store where every entry shares one time-to-live.
pub struct TtlCache<T> {
    ttl_ms: i64,
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<String, CacheEntry<T>>>,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(ttl_ms: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl_ms: i64::try_from(ttl_ms).unwrap_or(i64::MAX),
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Fresh value for `key`, or `None` if absent or expired.
    pub fn get(&self, key: &str) -> Option<T> {
        let now = self.clock.now_ms();
        let entries = self.entries.lock();
        entries
            .get(key)
            .filter(|entry| now.saturating_sub(entry.timestamp) < self.ttl_ms)
            .map(|entry| entry.data.clone())
    }

    /// Store `data` under `key`, replacing any previous entry.
    pub fn set(&self, key: impl Into<String>, data: T) {
        let entry = CacheEntry {
            data,
            timestamp: self.clock.now_ms(),
        };
        self.entries.lock().insert(key.into(), entry);
    }

    pub fn ttl_ms(&self) -> u64 {
        self.ttl_ms.max(0) as u64
    }

    /// Number of stored entries, fresh or stale.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Time-to-live per data kind, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheTtls {
    pub quotes_ms: u64,
    pub history_ms: u64,
    pub confidence_ms: u64,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            quotes_ms: 10 * 60 * 1000,
            history_ms: 10 * 60 * 1000,
            // The confidence proxy is a monthly series; a day is plenty.
            confidence_ms: 24 * 60 * 60 * 1000,
        }
    }
}

/// The client's cache: one store per kind of fetched data.
pub struct MarketCache {
    pub quotes: TtlCache<HashMap<String, Quote>>,
    pub history: TtlCache<Vec<HistoricalPoint>>,
    pub confidence: TtlCache<Vec<ConfidencePoint>>,
}

impl MarketCache {
    pub fn new(ttls: CacheTtls, clock: Arc<dyn Clock>) -> Self {
        Self {
            quotes: TtlCache::new(ttls.quotes_ms, Arc::clone(&clock)),
            history: TtlCache::new(ttls.history_ms, Arc::clone(&clock)),
            confidence: TtlCache::new(ttls.confidence_ms, clock),
        }
    }

    pub fn with_system_clock(ttls: CacheTtls) -> Self {
        Self::new(ttls, Arc::new(SystemClock))
    }

    /// Total stored entries across all kinds.
    pub fn len(&self) -> usize {
        self.quotes.len() + self.history.len() + self.confidence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MarketCache {
    fn default() -> Self {
        Self::with_system_clock(CacheTtls::default())
    }
}

/// Cache key for a quote batch: operation name plus symbols in request order.
pub fn quotes_key(symbols: &[String]) -> String {
    format!("stockData_{}", symbols.join("_"))
}

/// Cache key for a price series request.
pub fn history_key(symbol: &str, interval: &str, range: &str) -> String {
    format!("historical_{symbol}_{interval}_{range}")
}

/// Cache key for the confidence index.
pub const CONFIDENCE_KEY: &str = "cci_data";
