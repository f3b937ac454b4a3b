//! REST client for the exchange's historical and futures-stats endpoints

use crate::errors::ProviderError;
use crate::provider::{HistoricalBar, MarketDataSource};
use crate::Resolution;
use async_trait::async_trait;
use candlestream_common::{Px, Qty, Ts};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Response envelope used by every exchange endpoint
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    success: bool,
    result: Option<T>,
    error: Option<String>,
}

/// Raw candle row from `/markets/{instrument}/candles`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CandlePayload {
    start_time: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

/// Raw stats from `/futures/{instrument}/stats`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FutureStats {
    open_interest: f64,
}

/// HTTP client for the exchange REST API
#[derive(Debug, Clone)]
pub struct ExchangeRestClient {
    http: reqwest::Client,
    base_url: String,
}

impl ExchangeRestClient {
    /// Create a client against the given API base URL (no trailing slash)
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Unwrap the `{success, result, error}` envelope into a result payload.
    fn unwrap_envelope<T>(resp: ApiResponse<T>) -> Result<T, ProviderError> {
        if resp.success {
            resp.result
                .ok_or_else(|| ProviderError::Rejected("missing result payload".to_string()))
        } else {
            Err(ProviderError::Rejected(
                resp.error.unwrap_or_else(|| "unspecified error".to_string()),
            ))
        }
    }
}

#[async_trait]
impl MarketDataSource for ExchangeRestClient {
    async fn recent_candles(
        &self,
        instrument: &str,
        resolution: Resolution,
        n: usize,
    ) -> Result<Vec<HistoricalBar>, ProviderError> {
        let url = format!("{}/markets/{}/candles", self.base_url, instrument);
        let start_time = Utc::now().timestamp() - (resolution.secs() as i64) * (n as i64);

        let resp = self
            .http
            .get(&url)
            .query(&[
                ("resolution", resolution.secs().to_string()),
                ("start_time", start_time.to_string()),
            ])
            .send()
            .await?
            .json::<ApiResponse<Vec<CandlePayload>>>()
            .await?;

        Self::unwrap_envelope(resp)?
            .into_iter()
            .map(|row| {
                let start = DateTime::parse_from_rfc3339(&row.start_time).map_err(|e| {
                    ProviderError::Rejected(format!("unparseable startTime {:?}: {e}", row.start_time))
                })?;
                Ok(HistoricalBar {
                    start: Ts::from_datetime(start.with_timezone(&Utc)),
                    open: Px::new(row.open),
                    high: Px::new(row.high),
                    low: Px::new(row.low),
                    close: Px::new(row.close),
                    volume: Qty::new(row.volume),
                })
            })
            .collect()
    }

    async fn open_interest(&self, instrument: &str) -> Result<Qty, ProviderError> {
        let url = format!("{}/futures/{}/stats", self.base_url, instrument);

        let resp = self
            .http
            .get(&url)
            .send()
            .await?
            .json::<ApiResponse<FutureStats>>()
            .await?;

        let stats = Self::unwrap_envelope(resp)?;
        Ok(Qty::new(stats.open_interest))
    }
}
