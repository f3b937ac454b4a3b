//! Per-resolution trade aggregation
//!
//! One `CandleSeries` per (instrument, resolution), driven by exactly one
//! sequential consumer. The currently open bucket is tracked as an explicit
//! field and compared against each trade's truncated timestamp; rollover is
//! never inferred from a failed store lookup.

use crate::backfill;
use crate::errors::AggregatorError;
use crate::export;
use crate::provider::MarketDataSource;
use crate::reconcile;
use crate::store::CandleStore;
use crate::{Candle, Resolution, TradeEvent};
use anyhow::{Context, Result};
use candlestream_common::Ts;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// A live OHLCV candle series for one instrument at one resolution
pub struct CandleSeries {
    instrument: String,
    resolution: Resolution,
    store: CandleStore,
    /// Start of the currently open bucket; `None` only when backfill yielded
    /// zero rows and no trade has arrived yet.
    open_bucket: Option<Ts>,
    source: Arc<dyn MarketDataSource>,
}

impl CandleSeries {
    /// Construct a series seeded with the most recent `backfill_depth` buckets.
    ///
    /// The latest backfilled bucket becomes the open bucket. Fatal on
    /// provider failure: a series must not start from a silently empty
    /// history it was asked to have.
    pub async fn new(
        instrument: impl Into<String>,
        resolution: Resolution,
        backfill_depth: usize,
        source: Arc<dyn MarketDataSource>,
    ) -> Result<Self> {
        let instrument = instrument.into();
        let seeded = backfill::load(source.as_ref(), &instrument, resolution, backfill_depth)
            .await
            .with_context(|| {
                format!("backfill failed for {instrument} at {resolution}")
            })?;

        let mut store = CandleStore::new();
        for candle in seeded {
            store
                .append(candle)
                .context("backfill produced out-of-order buckets")?;
        }
        let open_bucket = store.latest().map(|c| c.bucket_start);

        Ok(Self {
            instrument,
            resolution,
            store,
            open_bucket,
            source,
        })
    }

    /// Instrument identifier
    #[must_use]
    pub fn instrument(&self) -> &str {
        &self.instrument
    }

    /// Series resolution
    #[must_use]
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Read access to the underlying store
    #[must_use]
    pub fn store(&self) -> &CandleStore {
        &self.store
    }

    /// Start of the currently open bucket, if any
    #[must_use]
    pub fn open_bucket(&self) -> Option<Ts> {
        self.open_bucket
    }

    /// Fold one trade into the series.
    ///
    /// The common case is an O(1) in-place update of the open bucket. A trade
    /// truncating to a newer bucket triggers rollover: the previous bucket is
    /// reconciled (best effort) and a new bucket opens at the previous close.
    /// A trade truncating to an older bucket is rejected with
    /// [`AggregatorError::LateTrade`].
    pub async fn update(&mut self, trade: &TradeEvent) -> Result<(), AggregatorError> {
        let bucket = self.resolution.bucket_start(trade.ts);

        match self.open_bucket {
            Some(open) if bucket == open => {
                // In-place merge; backfilled seed extremes are preserved.
                if let Some(candle) = self.store.latest_mut() {
                    candle.apply_trade(trade.price, trade.size);
                }
                debug!(
                    instrument = self.instrument,
                    resolution = %self.resolution,
                    bucket_start = %bucket,
                    price = %trade.price,
                    "trade merged into open bucket"
                );
                Ok(())
            }
            Some(open) if bucket > open => self.roll_over(open, bucket, trade).await,
            Some(_) => Err(AggregatorError::LateTrade {
                trade_ts: trade.ts,
                bucket_start: bucket,
            }),
            None => {
                // Empty backfill: the first trade opens the first bucket at
                // its own price.
                self.store
                    .append(Candle::opening(bucket, None, trade.price, trade.size))?;
                self.open_bucket = Some(bucket);
                Ok(())
            }
        }
    }

    /// Close the open bucket, reconcile it, and open a successor.
    async fn roll_over(
        &mut self,
        closed: Ts,
        bucket: Ts,
        trade: &TradeEvent,
    ) -> Result<(), AggregatorError> {
        let prev_close = self.store.get(closed).map(|c| c.close);

        if let Some(prev) = self.store.get(closed) {
            match reconcile::reconcile_closed(
                self.source.as_ref(),
                &self.instrument,
                self.resolution,
                prev,
            )
            .await
            {
                Ok(rec) => {
                    self.store.set_reconciliation(closed, rec);
                }
                Err(err) => {
                    // Best-effort annotation: the bucket closes regardless and
                    // live aggregation continues.
                    warn!(
                        instrument = self.instrument,
                        resolution = %self.resolution,
                        bucket_start = %closed,
                        error = %err,
                        "reconciliation incomplete for closed bucket"
                    );
                }
            }
        }

        self.store
            .append(Candle::opening(bucket, prev_close, trade.price, trade.size))?;
        self.open_bucket = Some(bucket);
        Ok(())
    }

    /// Write a CSV snapshot of every bucket to `dir`.
    ///
    /// Independent of reconciliation state: unreconciled buckets export with
    /// empty variance columns.
    pub fn export_csv(&self, dir: &Path) -> Result<PathBuf> {
        export::write_csv(&self.instrument, self.resolution, &self.store, dir)
    }
}
