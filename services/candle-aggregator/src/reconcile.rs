//! Closed-bucket reconciliation
//!
//! Runs exactly once per bucket, at the moment rollover is detected. Compares
//! the internally aggregated candle against the authoritative provider record
//! and annotates the closed bucket with signed variances plus the current open
//! interest. A direct stateless query, never a second series instance.

use crate::errors::ProviderError;
use crate::provider::MarketDataSource;
use crate::{Candle, Resolution};
use candlestream_common::Qty;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// How many recent authoritative periods to request when looking up one
/// just-closed bucket. Two covers the closed bucket plus the period now open.
const RECONCILE_WINDOW: usize = 2;

/// Variance annotations attached to a closed candle
///
/// Variances are signed fixed-point differences, internal − authoritative.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    /// Open variance in price ticks
    pub open_var: i64,
    /// High variance in price ticks
    pub high_var: i64,
    /// Low variance in price ticks
    pub low_var: i64,
    /// Close variance in price ticks
    pub close_var: i64,
    /// Volume variance in quantity units
    pub volume_var: i64,
    /// Open interest at close time; absent when the stats fetch failed
    pub open_interest: Option<Qty>,
}

/// Reconcile one just-closed candle against the authoritative provider.
///
/// Fails with a [`ProviderError`] when the historical fetch fails or the
/// window does not contain the bucket; the caller closes the bucket anyway. A
/// failed open-interest fetch only leaves that field empty, since the variance
/// comparison has already succeeded. Idempotent for a fixed authoritative
/// snapshot.
pub async fn reconcile_closed(
    source: &dyn MarketDataSource,
    instrument: &str,
    resolution: Resolution,
    closed: &Candle,
) -> Result<Reconciliation, ProviderError> {
    let window = source
        .recent_candles(instrument, resolution, RECONCILE_WINDOW)
        .await?;

    let authoritative = window
        .iter()
        .find(|bar| resolution.bucket_start(bar.start) == closed.bucket_start)
        .ok_or(ProviderError::MissingBucket(closed.bucket_start))?;

    let open_interest = match source.open_interest(instrument).await {
        Ok(oi) => Some(oi),
        Err(err) => {
            warn!(
                instrument,
                %resolution,
                bucket_start = %closed.bucket_start,
                error = %err,
                "open interest fetch failed; closing bucket without it"
            );
            None
        }
    };

    let rec = Reconciliation {
        open_var: closed.open.diff(authoritative.open),
        high_var: closed.high.diff(authoritative.high),
        low_var: closed.low.diff(authoritative.low),
        close_var: closed.close.diff(authoritative.close),
        volume_var: closed.volume.diff(authoritative.volume),
        open_interest,
    };

    info!(
        instrument,
        %resolution,
        bucket_start = %closed.bucket_start,
        open = %closed.open,
        high = %closed.high,
        low = %closed.low,
        close = %closed.close,
        volume = %closed.volume,
        open_var = rec.open_var,
        high_var = rec.high_var,
        low_var = rec.low_var,
        close_var = rec.close_var,
        volume_var = rec.volume_var,
        "bucket closed and reconciled"
    );

    Ok(rec)
}
