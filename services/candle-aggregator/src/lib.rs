//! Candle Aggregator Service
//!
//! Incrementally maintains fixed-width OHLCV candle series from a live trade
//! stream:
//! - maps trade timestamps to resolution-aligned buckets
//! - updates the open bucket in place, detecting rollover explicitly
//! - reconciles each just-closed bucket against authoritative exchange history
//!   and annotates it with open interest
//! - backfills recent history at startup and exports a CSV snapshot on shutdown

pub mod backfill;
pub mod config;
pub mod errors;
pub mod exchange;
pub mod export;
pub mod feed;
pub mod provider;
pub mod reconcile;
pub mod series;
pub mod store;

use candlestream_common::{Px, Qty, Ts, SECS_PER_DAY, SECS_PER_HOUR, SECS_PER_MIN};
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use errors::{AggregatorError, ProviderError};
pub use exchange::ExchangeRestClient;
pub use feed::TradeFeed;
pub use provider::{HistoricalBar, MarketDataSource};
pub use reconcile::Reconciliation;
pub use series::CandleSeries;
pub use store::CandleStore;

/// Candle resolution
///
/// Only resolutions with a defined truncation rule are representable; any other
/// duration fails at construction with [`AggregatorError::UnsupportedResolution`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resolution {
    /// 1 minute buckets
    M1,
    /// 1 hour buckets
    H1,
    /// 1 day buckets
    D1,
}

impl Resolution {
    /// Parse a resolution from its length in seconds.
    pub fn from_secs(secs: u32) -> Result<Self, AggregatorError> {
        match u64::from(secs) {
            SECS_PER_MIN => Ok(Self::M1),
            SECS_PER_HOUR => Ok(Self::H1),
            SECS_PER_DAY => Ok(Self::D1),
            _ => Err(AggregatorError::UnsupportedResolution(secs)),
        }
    }

    /// Bucket length in seconds
    #[must_use]
    pub const fn secs(&self) -> u64 {
        match self {
            Self::M1 => SECS_PER_MIN,
            Self::H1 => SECS_PER_HOUR,
            Self::D1 => SECS_PER_DAY,
        }
    }

    /// Floor a timestamp to the start of its bucket.
    ///
    /// The epoch is midnight UTC, so integer division aligns minute buckets to
    /// the top of the minute, hour buckets to the top of the hour and day
    /// buckets to midnight UTC. Idempotent and cheap enough to run per trade.
    #[must_use]
    pub const fn bucket_start(&self, ts: Ts) -> Ts {
        let secs = self.secs();
        Ts::from_secs((ts.as_secs() / secs) * secs)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.secs())
    }
}

/// One OHLCV bucket
///
/// `bucket_start` is the inclusive lower bound of the interval, aligned by
/// [`Resolution::bucket_start`]. `reconciliation` is populated once the bucket
/// has closed and the authoritative comparison succeeded; it stays `None` for
/// the open bucket and for buckets whose reconciliation failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Bucket start timestamp (inclusive)
    pub bucket_start: Ts,
    /// First traded price of the bucket, or previous close on rollover
    pub open: Px,
    /// Highest traded price
    pub high: Px,
    /// Lowest traded price
    pub low: Px,
    /// Last traded price
    pub close: Px,
    /// Cumulative traded size
    pub volume: Qty,
    /// Variance annotations, present only after successful reconciliation
    pub reconciliation: Option<Reconciliation>,
}

impl Candle {
    /// Open a fresh bucket from its first trade.
    ///
    /// On rollover `prev_close` carries the close of the bucket that just
    /// closed and becomes the new open; a series with no history opens at the
    /// trade price itself.
    #[must_use]
    pub fn opening(bucket_start: Ts, prev_close: Option<Px>, price: Px, size: Qty) -> Self {
        Self {
            bucket_start,
            open: prev_close.unwrap_or(price),
            high: price,
            low: price,
            close: price,
            volume: size,
            reconciliation: None,
        }
    }

    /// Merge a trade into this bucket in place.
    ///
    /// Never resets high/low: a backfilled seed bucket keeps its historical
    /// extremes and only widens them.
    pub fn apply_trade(&mut self, price: Px, size: Qty) {
        if price > self.high {
            self.high = price;
        }
        if price < self.low {
            self.low = price;
        }
        self.close = price;
        self.volume = self.volume.add(size);
    }
}

/// A single validated trade event
///
/// Ephemeral: consumed once by each series, never retained.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeEvent {
    /// Execution timestamp
    pub ts: Ts,
    /// Trade price, strictly positive
    pub price: Px,
    /// Trade size, non-negative
    pub size: Qty,
}

impl TradeEvent {
    /// Validate raw feed fields into a trade event.
    ///
    /// Rejects non-positive or non-finite prices, negative or non-finite
    /// sizes, and timestamps that do not parse as RFC 3339.
    pub fn from_parts(time: &str, price: f64, size: f64) -> Result<Self, AggregatorError> {
        let dt = DateTime::parse_from_rfc3339(time)
            .map_err(|e| AggregatorError::InvalidTrade(format!("bad timestamp {time:?}: {e}")))?;
        if !price.is_finite() || price <= 0.0 {
            return Err(AggregatorError::InvalidTrade(format!(
                "price must be positive, got {price}"
            )));
        }
        if !size.is_finite() || size < 0.0 {
            return Err(AggregatorError::InvalidTrade(format!(
                "size must be non-negative, got {size}"
            )));
        }
        Ok(Self {
            ts: Ts::from_datetime(dt.with_timezone(&chrono::Utc)),
            price: Px::new(price),
            size: Qty::new(size),
        })
    }
}
