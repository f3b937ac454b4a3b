//! Shared test helpers: a canned market data source

use async_trait::async_trait;
use candle_aggregator::{HistoricalBar, MarketDataSource, ProviderError, Resolution};
use candlestream_common::{Px, Qty, Ts};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Provider stub driven entirely by canned data.
///
/// Interior mutability lets tests reshape the authoritative history while a
/// series holds its own `Arc` to the stub.
#[derive(Default)]
pub struct StubSource {
    bars: Mutex<Vec<HistoricalBar>>,
    fail_candles: Mutex<bool>,
    open_interest: Mutex<Option<Qty>>,
    pub candle_calls: AtomicUsize,
}

impl StubSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bars(bars: Vec<HistoricalBar>) -> Self {
        let stub = Self::new();
        stub.set_bars(bars);
        stub
    }

    pub fn set_bars(&self, bars: Vec<HistoricalBar>) {
        *self.bars.lock().unwrap() = bars;
    }

    pub fn set_fail_candles(&self, fail: bool) {
        *self.fail_candles.lock().unwrap() = fail;
    }

    pub fn set_open_interest(&self, oi: Option<Qty>) {
        *self.open_interest.lock().unwrap() = oi;
    }
}

/// Build an authoritative bar from plain numbers.
pub fn bar(start_secs: u64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> HistoricalBar {
    HistoricalBar {
        start: Ts::from_secs(start_secs),
        open: Px::new(open),
        high: Px::new(high),
        low: Px::new(low),
        close: Px::new(close),
        volume: Qty::new(volume),
    }
}

#[async_trait]
impl MarketDataSource for StubSource {
    async fn recent_candles(
        &self,
        _instrument: &str,
        _resolution: Resolution,
        n: usize,
    ) -> Result<Vec<HistoricalBar>, ProviderError> {
        self.candle_calls.fetch_add(1, Ordering::SeqCst);
        if *self.fail_candles.lock().unwrap() {
            return Err(ProviderError::Rejected("stub provider offline".to_string()));
        }
        let bars = self.bars.lock().unwrap();
        let skip = bars.len().saturating_sub(n);
        Ok(bars[skip..].to_vec())
    }

    async fn open_interest(&self, _instrument: &str) -> Result<Qty, ProviderError> {
        self.open_interest
            .lock()
            .unwrap()
            .ok_or_else(|| ProviderError::Rejected("stats unavailable".to_string()))
    }
}
