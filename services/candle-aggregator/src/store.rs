//! Ordered candle storage
//!
//! Append-only mapping from bucket-start timestamp to candle. Only the most
//! recent bucket may be mutated in place; everything older is closed history.
//! The store exclusively owns its candles.

use crate::errors::AggregatorError;
use crate::reconcile::Reconciliation;
use crate::Candle;
use candlestream_common::Ts;
use std::collections::BTreeMap;

/// Ordered bucket-start → candle map for one series
#[derive(Debug, Default)]
pub struct CandleStore {
    candles: BTreeMap<Ts, Candle>,
}

impl CandleStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of buckets held
    #[must_use]
    pub fn len(&self) -> usize {
        self.candles.len()
    }

    /// True when no buckets are held
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// Look up a bucket by its start timestamp
    #[must_use]
    pub fn get(&self, bucket_start: Ts) -> Option<&Candle> {
        self.candles.get(&bucket_start)
    }

    /// The bucket with the greatest start timestamp
    #[must_use]
    pub fn latest(&self) -> Option<&Candle> {
        self.candles.values().next_back()
    }

    /// Mutable access to the newest bucket, for in-place open-bucket updates
    pub fn latest_mut(&mut self) -> Option<&mut Candle> {
        self.candles.values_mut().next_back()
    }

    /// Append a new bucket.
    ///
    /// The key must be strictly greater than every existing key. A duplicate
    /// or out-of-order key means rollover detection went wrong upstream, so
    /// the append is rejected rather than silently reordered.
    pub fn append(&mut self, candle: Candle) -> Result<(), AggregatorError> {
        if let Some(latest) = self.latest() {
            if candle.bucket_start <= latest.bucket_start {
                return Err(AggregatorError::OrderingViolation {
                    bucket_start: candle.bucket_start,
                    latest: latest.bucket_start,
                });
            }
        }
        self.candles.insert(candle.bucket_start, candle);
        Ok(())
    }

    /// Attach reconciliation results to a closed bucket.
    ///
    /// Returns false when the bucket is unknown.
    pub fn set_reconciliation(&mut self, bucket_start: Ts, rec: Reconciliation) -> bool {
        match self.candles.get_mut(&bucket_start) {
            Some(candle) => {
                candle.reconciliation = Some(rec);
                true
            }
            None => false,
        }
    }

    /// Iterate buckets in ascending bucket-start order
    pub fn iter(&self) -> impl Iterator<Item = &Candle> {
        self.candles.values()
    }
}
