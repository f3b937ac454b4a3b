//! Historical backfill
//!
//! Seeds a series with the most recent N buckets before any live trade is
//! processed. Bucket keys are re-truncated through the series' own resolution
//! so reconciliation lookups can never misalign with provider-reported starts.

use crate::errors::ProviderError;
use crate::provider::MarketDataSource;
use crate::{Candle, Resolution};
use tracing::info;

/// Load the most recent `depth` buckets ending now, ascending by bucket start.
pub async fn load(
    source: &dyn MarketDataSource,
    instrument: &str,
    resolution: Resolution,
    depth: usize,
) -> Result<Vec<Candle>, ProviderError> {
    if depth == 0 {
        return Ok(Vec::new());
    }

    let bars = source.recent_candles(instrument, resolution, depth).await?;

    let mut candles: Vec<Candle> = bars
        .into_iter()
        .map(|bar| Candle {
            bucket_start: resolution.bucket_start(bar.start),
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
            reconciliation: None,
        })
        .collect();

    candles.sort_by_key(|c| c.bucket_start);
    candles.dedup_by_key(|c| c.bucket_start);

    info!(
        instrument,
        %resolution,
        buckets = candles.len(),
        "backfilled candle history"
    );

    Ok(candles)
}
