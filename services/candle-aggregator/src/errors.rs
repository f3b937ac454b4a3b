//! Error taxonomy for the aggregation core
//!
//! Per-event failures (invalid trades, late trades, provider faults) are
//! isolated to that event or bucket and logged by the caller; construction-time
//! and store-invariant failures are fatal and propagate.

use candlestream_common::Ts;
use thiserror::Error;

/// Aggregation errors
#[derive(Debug, Error)]
pub enum AggregatorError {
    /// No truncation rule defined for the requested resolution; fatal at
    /// series construction, never recoverable mid-stream.
    #[error("unsupported resolution: {0}s (supported: 60, 3600, 86400)")]
    UnsupportedResolution(u32),

    /// Malformed trade event; the event is dropped and the stream continues.
    #[error("invalid trade event: {0}")]
    InvalidTrade(String),

    /// Trade maps to an already-closed bucket. Policy: reject rather than
    /// rewrite reported history; the event is dropped and logged.
    #[error("trade at {trade_ts} falls in closed bucket {bucket_start}")]
    LateTrade {
        /// Timestamp of the offending trade
        trade_ts: Ts,
        /// The closed bucket it truncates into
        bucket_start: Ts,
    },

    /// Out-of-order append into the candle store. Indicates a rollover
    /// detection bug; fatal, never swallowed.
    #[error("bucket {bucket_start} does not follow latest stored bucket {latest}")]
    OrderingViolation {
        /// Key of the rejected append
        bucket_start: Ts,
        /// Greatest key currently in the store
        latest: Ts,
    },
}

/// Historical/auxiliary provider errors
///
/// Transport faults and application-level rejections are surfaced as distinct
/// variants so operators can tell a dead endpoint from a refused request.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network or protocol failure reaching the provider
    #[error("provider transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// Provider reached but the request was rejected at the application level
    #[error("provider rejected request: {0}")]
    Rejected(String),

    /// The authoritative window did not contain the requested bucket
    #[error("no authoritative candle for bucket {0}")]
    MissingBucket(Ts),
}
