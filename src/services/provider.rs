//! HTTP market data provider
//!
//! Talks to the data-acquisition service over its JSON endpoint
//! `GET {base}/series/{symbol}?as_of=YYYY-MM-DD`. Transient transport
//! failures and rate limits are retried in-place with exponential backoff
//! before the error surfaces to the job layer.

use crate::error::ProviderError;
use crate::models::{AssetSeries, Candle};
use crate::services::market_data::MarketDataProvider;
use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const RETRY_ATTEMPTS: usize = 3;

#[derive(Debug, Deserialize)]
struct SeriesResponse {
    symbol: String,
    bars: Vec<BarResponse>,
}

#[derive(Debug, Deserialize)]
struct BarResponse {
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

pub struct HttpMarketDataProvider {
    client: reqwest::Client,
    base_url: String,
}

impl HttpMarketDataProvider {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn fetch_once(
        &self,
        symbol: &str,
        as_of: NaiveDate,
    ) -> Result<AssetSeries, ProviderError> {
        let url = format!("{}/series/{}", self.base_url, symbol);
        let response = self
            .client
            .get(&url)
            .query(&[("as_of", as_of.to_string())])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout
                } else {
                    ProviderError::Transport(e.to_string())
                }
            })?;

        match response.status().as_u16() {
            429 => return Err(ProviderError::RateLimited),
            404 => return Err(ProviderError::NotFound(symbol.to_string())),
            s if s >= 400 => {
                return Err(ProviderError::Transport(format!(
                    "provider returned status {} for {}",
                    s, symbol
                )))
            }
            _ => {}
        }

        let body: SeriesResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        let candles = body
            .bars
            .into_iter()
            .map(|b| Candle::new(b.date, b.open, b.high, b.low, b.close, b.volume))
            .collect();
        Ok(AssetSeries::new(body.symbol, as_of, candles))
    }
}

#[async_trait]
impl MarketDataProvider for HttpMarketDataProvider {
    async fn fetch_series(
        &self,
        symbol: &str,
        as_of: NaiveDate,
    ) -> Result<AssetSeries, ProviderError> {
        let fetch = || self.fetch_once(symbol, as_of);
        fetch
            .retry(
                ExponentialBuilder::default()
                    .with_jitter()
                    .with_max_times(RETRY_ATTEMPTS),
            )
            .when(|e: &ProviderError| e.is_transient())
            .notify(|e, after| {
                warn!(symbol = %symbol, error = %e, retry_in = ?after, "transient provider error, retrying");
            })
            .await
            .map(|series| {
                debug!(symbol = %symbol, bars = series.len(), "fetched series");
                series
            })
    }
}
