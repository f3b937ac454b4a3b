//! Seam to the historical/auxiliary data provider
//!
//! The aggregation core only ever issues two read-only queries: recent
//! authoritative candles and the current open interest. Keeping them behind a
//! trait lets tests drive the series with canned data.

use crate::errors::ProviderError;
use crate::Resolution;
use async_trait::async_trait;
use candlestream_common::{Px, Qty, Ts};

/// One authoritative OHLCV period as reported by the provider
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalBar {
    /// Period start timestamp as reported; callers re-truncate before keying
    pub start: Ts,
    /// Open price
    pub open: Px,
    /// High price
    pub high: Px,
    /// Low price
    pub low: Px,
    /// Close price
    pub close: Px,
    /// Period volume
    pub volume: Qty,
}

/// Read-only market data queries against the authoritative provider
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Fetch the most recent `n` OHLCV periods ending now.
    async fn recent_candles(
        &self,
        instrument: &str,
        resolution: Resolution,
        n: usize,
    ) -> Result<Vec<HistoricalBar>, ProviderError>;

    /// Fetch the current open interest for the instrument.
    async fn open_interest(&self, instrument: &str) -> Result<Qty, ProviderError>;
}
