//! Candle aggregator configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Candle aggregator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatorConfig {
    /// Market to aggregate, e.g. "BTC-PERP"
    pub instrument: String,

    /// Candle resolutions in seconds; one series is maintained per entry
    pub resolutions_secs: Vec<u32>,

    /// Number of historical buckets loaded per series at startup
    pub backfill_depth: usize,

    /// Base URL of the exchange REST API
    pub rest_url: String,

    /// Websocket endpoint of the exchange trade feed
    pub ws_url: String,

    /// Directory CSV snapshots are written to on shutdown
    pub export_dir: PathBuf,

    /// Trade channel capacity between the feed task and the consumer
    pub feed_channel_capacity: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            instrument: "BTC-PERP".to_string(),
            resolutions_secs: vec![60, 3600, 86400],
            backfill_depth: 3,
            rest_url: "https://ftx.com/api".to_string(),
            ws_url: "wss://ftx.com/ws/".to_string(),
            export_dir: PathBuf::from("."),
            feed_channel_capacity: 10_000,
        }
    }
}
