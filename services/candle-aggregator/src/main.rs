//! Candle Aggregator Service
//!
//! Maintains live OHLCV candle series for one instrument across multiple
//! resolutions, reconciles closed buckets against the exchange's historical
//! API, and dumps a CSV snapshot of every series on shutdown.

use anyhow::Result;
use candle_aggregator::config::AggregatorConfig;
use candle_aggregator::{
    AggregatorError, CandleSeries, ExchangeRestClient, MarketDataSource, Resolution, TradeEvent,
    TradeFeed,
};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SERVICE_NAME: &str = "candle-aggregator";

/// Live OHLCV candle aggregation with closed-bucket reconciliation
#[derive(Debug, Parser)]
#[command(name = SERVICE_NAME, version)]
struct Cli {
    /// Market to aggregate
    #[arg(long)]
    instrument: Option<String>,

    /// Candle resolutions in seconds (comma separated)
    #[arg(long, value_delimiter = ',')]
    resolutions: Option<Vec<u32>>,

    /// Historical buckets to backfill per series
    #[arg(long)]
    backfill_depth: Option<usize>,

    /// Exchange REST API base URL
    #[arg(long)]
    rest_url: Option<String>,

    /// Exchange websocket endpoint
    #[arg(long)]
    ws_url: Option<String>,

    /// Directory for shutdown CSV snapshots
    #[arg(long)]
    export_dir: Option<PathBuf>,
}

impl Cli {
    fn into_config(self) -> AggregatorConfig {
        let mut cfg = AggregatorConfig::default();
        if let Some(instrument) = self.instrument {
            cfg.instrument = instrument;
        }
        if let Some(resolutions) = self.resolutions {
            cfg.resolutions_secs = resolutions;
        }
        if let Some(depth) = self.backfill_depth {
            cfg.backfill_depth = depth;
        }
        if let Some(rest_url) = self.rest_url {
            cfg.rest_url = rest_url;
        }
        if let Some(ws_url) = self.ws_url {
            cfg.ws_url = ws_url;
        }
        if let Some(export_dir) = self.export_dir {
            cfg.export_dir = export_dir;
        }
        cfg
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cfg = Cli::parse().into_config();
    info!(
        instrument = cfg.instrument,
        "starting {} v{}",
        SERVICE_NAME,
        env!("CARGO_PKG_VERSION")
    );

    let source: Arc<dyn MarketDataSource> = Arc::new(ExchangeRestClient::new(&cfg.rest_url));

    // One independently backfilled series per resolution. Unsupported
    // resolutions are fatal here, before any live event is consumed.
    let mut series = Vec::with_capacity(cfg.resolutions_secs.len());
    for &secs in &cfg.resolutions_secs {
        let resolution = Resolution::from_secs(secs)?;
        series.push(
            CandleSeries::new(
                cfg.instrument.clone(),
                resolution,
                cfg.backfill_depth,
                Arc::clone(&source),
            )
            .await?,
        );
    }
    info!(count = series.len(), "candle series instantiated");

    let (tx, mut rx) = mpsc::channel::<TradeEvent>(cfg.feed_channel_capacity);
    let feed = TradeFeed::new(cfg.ws_url.clone(), cfg.instrument.clone());
    let feed_task = tokio::spawn(async move { feed.run(tx).await });

    info!("listening for trades; ctrl-c exports candle data and exits");

    // Single sequential consumer: every event reaches every series in arrival
    // order, so the resolutions never disagree about event ordering.
    loop {
        tokio::select! {
            maybe_trade = rx.recv() => match maybe_trade {
                Some(trade) => deliver(&mut series, &trade).await?,
                None => {
                    warn!("trade feed channel closed");
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown signal received; exporting candle data");
                break;
            }
        }
    }

    feed_task.abort();

    // Export is unconditional: it must not depend on any reconciliation
    // having completed.
    for s in &series {
        let path = s.export_csv(&cfg.export_dir)?;
        info!(path = %path.display(), "series exported");
    }
    info!("goodbye");
    Ok(())
}

/// Deliver one trade to every series, isolating per-event failures.
async fn deliver(series: &mut [CandleSeries], trade: &TradeEvent) -> Result<()> {
    for s in series.iter_mut() {
        match s.update(trade).await {
            Ok(()) => {}
            Err(err @ AggregatorError::LateTrade { .. }) => {
                warn!(
                    instrument = s.instrument(),
                    resolution = %s.resolution(),
                    error = %err,
                    "dropping trade for closed bucket"
                );
            }
            // Ordering violations indicate a rollover bug and are fatal.
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

/// Initialize tracing with environment filter
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=info", SERVICE_NAME.replace('-', "_")).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}
