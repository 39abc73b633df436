//! Job executor tests: the daily chain against in-memory collaborators

use crate::common::uptrend_series;
use async_trait::async_trait;
use chrono::NaiveDate;
use marketpulse::error::{JobError, ProviderError};
use marketpulse::jobs::{AnalysisJob, DataUpdateJob, JobContext, PortfolioTrackingJob, PublishJob};
use marketpulse::models::AssetSeries;
use marketpulse::publish::Publisher;
use marketpulse::scheduler::JobExecutor;
use marketpulse::scoring::ScoringConfig;
use marketpulse::services::{MarketDataProvider, ScoreCardRenderer, SeriesStore};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

pub struct FakeProvider {
    series: HashMap<String, AssetSeries>,
}

impl FakeProvider {
    pub fn with(series: Vec<AssetSeries>) -> Arc<Self> {
        Arc::new(Self {
            series: series.into_iter().map(|s| (s.symbol.clone(), s)).collect(),
        })
    }
}

#[async_trait]
impl MarketDataProvider for FakeProvider {
    async fn fetch_series(
        &self,
        symbol: &str,
        _as_of: NaiveDate,
    ) -> Result<AssetSeries, ProviderError> {
        self.series
            .get(symbol)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(symbol.to_string()))
    }
}

pub struct Fixture {
    pub ctx: Arc<JobContext>,
    _work: tempfile::TempDir,
    pub serve: tempfile::TempDir,
}

pub fn fixture(symbols: &[&str], provided: Vec<AssetSeries>) -> Fixture {
    let work = tempfile::tempdir().unwrap();
    let serve = tempfile::tempdir().unwrap();
    let artifact_dir = work.path().join("artifacts");
    let ctx = Arc::new(JobContext {
        provider: FakeProvider::with(provided),
        renderer: Arc::new(ScoreCardRenderer::new(&artifact_dir)),
        store: Arc::new(SeriesStore::new()),
        publisher: Publisher::new(serve.path().join("bt")),
        portfolio_publisher: Publisher::new(serve.path().join("portfolio")),
        symbols: symbols.iter().map(|s| s.to_string()).collect(),
        portfolio_symbols: symbols.iter().map(|s| s.to_string()).collect(),
        scoring: ScoringConfig::default(),
        artifact_dir,
        metrics: None,
        staged_artifacts: RwLock::new(Vec::new()),
    });
    Fixture {
        ctx,
        _work: work,
        serve,
    }
}

#[tokio::test]
async fn daily_chain_scores_and_publishes_every_symbol() {
    let f = fixture(
        &["GOLD", "SPX"],
        vec![uptrend_series("GOLD", 250), uptrend_series("SPX", 250)],
    );

    DataUpdateJob::new(f.ctx.clone()).execute().await.unwrap();
    assert_eq!(f.ctx.store.len().await, 2);

    AnalysisJob::new(f.ctx.clone()).execute().await.unwrap();
    let staged = f.ctx.staged().await;
    assert_eq!(staged.len(), 2);
    assert!(staged.iter().all(|a| a.source.exists()));

    PublishJob::new(f.ctx.clone()).execute().await.unwrap();
    assert!(f.serve.path().join("bt").join("gold_score.json").exists());
    assert!(f.serve.path().join("bt").join("spx_score.json").exists());
}

#[tokio::test]
async fn missing_symbol_fails_the_update_as_transient() {
    let f = fixture(&["GOLD", "GHOST"], vec![uptrend_series("GOLD", 250)]);
    let err = DataUpdateJob::new(f.ctx.clone()).execute().await.unwrap_err();
    assert!(matches!(err, JobError::Transient(_)));
}

#[tokio::test]
async fn unscorable_asset_is_skipped_not_fatal() {
    // 10 bars cannot produce any category score; the long series still does
    let f = fixture(
        &["GOLD", "US10Y"],
        vec![uptrend_series("GOLD", 250), uptrend_series("US10Y", 10)],
    );
    DataUpdateJob::new(f.ctx.clone()).execute().await.unwrap();

    let summary = AnalysisJob::new(f.ctx.clone()).execute().await.unwrap();
    assert!(summary.contains("scored 1"));
    assert_eq!(f.ctx.staged().await.len(), 1);
}

#[tokio::test]
async fn analysis_rehydrates_missing_series_from_the_provider() {
    // empty store, as after a process restart mid-cycle
    let f = fixture(&["GOLD"], vec![uptrend_series("GOLD", 250)]);
    let summary = AnalysisJob::new(f.ctx.clone()).execute().await.unwrap();
    assert!(summary.contains("scored 1"));
    assert_eq!(f.ctx.store.len().await, 1);
    assert_eq!(f.ctx.staged().await.len(), 1);
}

#[tokio::test]
async fn analysis_with_nothing_scorable_is_empty() {
    let f = fixture(&["US10Y"], vec![uptrend_series("US10Y", 10)]);
    DataUpdateJob::new(f.ctx.clone()).execute().await.unwrap();
    let err = AnalysisJob::new(f.ctx.clone()).execute().await.unwrap_err();
    assert!(matches!(err, JobError::Empty(_)));
}

#[tokio::test]
async fn publish_without_staged_artifacts_is_empty() {
    let f = fixture(&["GOLD"], vec![uptrend_series("GOLD", 250)]);
    let err = PublishJob::new(f.ctx.clone()).execute().await.unwrap_err();
    assert!(matches!(err, JobError::Empty(_)));
}

#[tokio::test]
async fn portfolio_tracking_publishes_a_holdings_snapshot() {
    let f = fixture(&["GOLD"], vec![uptrend_series("GOLD", 250)]);
    let summary = PortfolioTrackingJob::new(f.ctx.clone())
        .execute()
        .await
        .unwrap();
    assert!(summary.contains("tracked 1 holdings"));

    let published: Vec<_> = std::fs::read_dir(f.serve.path().join("portfolio"))
        .unwrap()
        .filter_map(|e| e.ok())
        .collect();
    assert_eq!(published.len(), 1);
    let body: serde_json::Value =
        serde_json::from_slice(&std::fs::read(published[0].path()).unwrap()).unwrap();
    assert_eq!(body["holdings"][0]["symbol"], "GOLD");
    assert!(body["holdings"][0]["week_change_pct"].as_f64().unwrap() > 0.0);
}
