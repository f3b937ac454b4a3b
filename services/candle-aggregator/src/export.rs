//! CSV snapshot export
//!
//! One row per bucket, ascending by bucket start. Variance and open-interest
//! columns are empty for buckets that were never reconciled; export never
//! waits on reconciliation.

use crate::store::CandleStore;
use crate::{Candle, Resolution};
use anyhow::{Context, Result};
use candlestream_common::FIXED_POINT_SCALE_F64;
use chrono::Utc;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// One exported candle row
#[derive(Debug, Serialize)]
pub struct CandleRow {
    /// Bucket start, RFC 3339
    pub bucket_start: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub open_var: Option<f64>,
    pub high_var: Option<f64>,
    pub low_var: Option<f64>,
    pub close_var: Option<f64>,
    pub volume_var: Option<f64>,
    pub open_interest: Option<f64>,
}

impl From<&Candle> for CandleRow {
    fn from(candle: &Candle) -> Self {
        let rec = candle.reconciliation.as_ref();
        let ticks = |v: i64| v as f64 / FIXED_POINT_SCALE_F64;
        Self {
            bucket_start: candle.bucket_start.to_datetime().to_rfc3339(),
            open: candle.open.as_f64(),
            high: candle.high.as_f64(),
            low: candle.low.as_f64(),
            close: candle.close.as_f64(),
            volume: candle.volume.as_f64(),
            open_var: rec.map(|r| ticks(r.open_var)),
            high_var: rec.map(|r| ticks(r.high_var)),
            low_var: rec.map(|r| ticks(r.low_var)),
            close_var: rec.map(|r| ticks(r.close_var)),
            volume_var: rec.map(|r| ticks(r.volume_var)),
            open_interest: rec.and_then(|r| r.open_interest.map(|oi| oi.as_f64())),
        }
    }
}

/// Write all buckets of a store to `{epoch}_{instrument}_{secs}sec_candles.csv`
/// under `dir`, returning the path written.
pub fn write_csv(
    instrument: &str,
    resolution: Resolution,
    store: &CandleStore,
    dir: &Path,
) -> Result<PathBuf> {
    let filename = format!(
        "{}_{}_{}sec_candles.csv",
        Utc::now().timestamp(),
        instrument,
        resolution.secs()
    );
    let path = dir.join(filename);

    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("creating export file {}", path.display()))?;
    for candle in store.iter() {
        writer.serialize(CandleRow::from(candle))?;
    }
    writer.flush()?;

    info!(
        instrument,
        %resolution,
        buckets = store.len(),
        path = %path.display(),
        "candle data exported"
    );

    Ok(path)
}
