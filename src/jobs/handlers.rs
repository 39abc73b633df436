//! Executors for the scheduled jobs
//!
//! Each executor wraps one collaborator round-trip and reports a one-line
//! summary to the scheduler. Collaborator failures surface as transient
//! job errors; the retry policy belongs to the scheduler, not the handler.

use crate::error::JobError;
use crate::indicators;
use crate::jobs::context::JobContext;
use crate::publish::Artifact;
use crate::scheduler::runner::JobExecutor;
use crate::scoring;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Fetches the day's series snapshot per configured symbol into the store.
pub struct DataUpdateJob {
    ctx: Arc<JobContext>,
}

impl DataUpdateJob {
    pub fn new(ctx: Arc<JobContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl JobExecutor for DataUpdateJob {
    async fn execute(&self) -> Result<String, JobError> {
        let as_of = Utc::now().date_naive();
        let mut accepted = 0usize;
        for symbol in &self.ctx.symbols {
            let series = self
                .ctx
                .provider
                .fetch_series(symbol, as_of)
                .await
                .map_err(|e| JobError::Transient(format!("fetch {symbol}: {e}")))?;
            if series.is_empty() {
                return Err(JobError::Transient(format!(
                    "provider returned an empty series for {symbol}"
                )));
            }
            if !series.is_chronological() {
                return Err(JobError::Transient(format!(
                    "series for {symbol} is not chronological"
                )));
            }
            debug!(symbol = %symbol, bars = series.len(), "series accepted");
            self.ctx.store.put(series).await;
            accepted += 1;
        }
        Ok(format!("updated {accepted} symbols as of {as_of}"))
    }
}

/// Scores every configured symbol and renders its artifacts, refetching
/// any series the store no longer holds. Per-asset failures are isolated
/// into the summary; only a run that produces nothing at all fails the job.
pub struct AnalysisJob {
    ctx: Arc<JobContext>,
}

impl AnalysisJob {
    pub fn new(ctx: Arc<JobContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl JobExecutor for AnalysisJob {
    async fn execute(&self) -> Result<String, JobError> {
        let as_of = Utc::now().date_naive();
        let mut artifacts: Vec<Artifact> = Vec::new();
        let mut scored = 0usize;
        let mut skipped: Vec<String> = Vec::new();

        for symbol in &self.ctx.symbols {
            // The store is empty after a restart even when the update job
            // already succeeded this cycle; refetch instead of failing.
            let series = match self.ctx.store.get(symbol).await {
                Some(series) => series,
                None => match self.ctx.provider.fetch_series(symbol, as_of).await {
                    Ok(series) => {
                        info!(symbol = %symbol, bars = series.len(), "rehydrated series from provider");
                        self.ctx.store.put(series.clone()).await;
                        series
                    }
                    Err(e) => {
                        warn!(symbol = %symbol, error = %e, "no series in store and refetch failed, skipping");
                        skipped.push(symbol.clone());
                        continue;
                    }
                },
            };
            let vector = indicators::aggregate(&series);
            let score = match scoring::score_vector(symbol, series.as_of, &vector, &self.ctx.scoring)
            {
                Ok(score) => score,
                Err(e) => {
                    // Isolated per asset; siblings proceed.
                    warn!(symbol = %symbol, error = %e, "asset not scored");
                    if let Some(metrics) = &self.ctx.metrics {
                        metrics.score_failures_total.inc();
                    }
                    skipped.push(symbol.clone());
                    continue;
                }
            };
            info!(
                symbol = %symbol,
                total = format!("{:.2}", score.weighted_total),
                confidence = format!("{:.2}", score.confidence),
                rating = score.rating(),
                "asset scored"
            );
            if let Some(metrics) = &self.ctx.metrics {
                metrics.assets_scored_total.inc();
            }
            match self.ctx.renderer.render(&score, &vector).await {
                Ok(mut rendered) => artifacts.append(&mut rendered),
                Err(e) => {
                    warn!(symbol = %symbol, error = %e, "render failed for asset");
                    skipped.push(symbol.clone());
                    continue;
                }
            }
            scored += 1;
        }

        if scored == 0 {
            return Err(JobError::Empty(format!(
                "no asset produced a score ({} skipped)",
                skipped.len()
            )));
        }
        self.ctx.stage_artifacts(artifacts).await;
        Ok(format!("scored {scored} assets, skipped {:?}", skipped))
    }
}

/// Hands the analysis job's declared output set to the publisher.
pub struct PublishJob {
    ctx: Arc<JobContext>,
}

impl PublishJob {
    pub fn new(ctx: Arc<JobContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl JobExecutor for PublishJob {
    async fn execute(&self) -> Result<String, JobError> {
        let artifacts = self.ctx.staged().await;
        if artifacts.is_empty() {
            return Err(JobError::Empty("no artifacts staged for publishing".into()));
        }
        let published = self
            .ctx
            .publisher
            .publish(&artifacts)
            .map_err(|e| JobError::Transient(e.to_string()))?;
        Ok(format!("published {published} artifacts"))
    }
}

/// Weekly holdings snapshot, independent of the daily chain. Fetches the
/// portfolio symbols fresh, writes one snapshot artifact, and publishes it
/// to the portfolio serving directory in the same step.
pub struct PortfolioTrackingJob {
    ctx: Arc<JobContext>,
}

impl PortfolioTrackingJob {
    pub fn new(ctx: Arc<JobContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl JobExecutor for PortfolioTrackingJob {
    async fn execute(&self) -> Result<String, JobError> {
        let as_of = Utc::now().date_naive();
        let mut holdings = Vec::new();
        for symbol in &self.ctx.portfolio_symbols {
            let series = self
                .ctx
                .provider
                .fetch_series(symbol, as_of)
                .await
                .map_err(|e| JobError::Transient(format!("fetch {symbol}: {e}")))?;
            let last = series.last_close();
            let week_ago = series
                .candles
                .len()
                .checked_sub(6)
                .and_then(|i| series.candles.get(i))
                .map(|c| c.close);
            let week_change_pct = match (last, week_ago) {
                (Some(last), Some(prev)) if prev != 0.0 => Some((last / prev - 1.0) * 100.0),
                _ => None,
            };
            holdings.push(json!({
                "symbol": symbol,
                "close": last,
                "week_change_pct": week_change_pct,
            }));
        }
        if holdings.is_empty() {
            return Err(JobError::Empty("no portfolio symbols configured".into()));
        }

        let logical_name = format!("portfolio_tracking_{as_of}.json");
        let path = self.ctx.artifact_dir.join(&logical_name);
        let body = serde_json::to_vec_pretty(&json!({
            "as_of": as_of,
            "holdings": holdings,
        }))
        .map_err(|e| JobError::Transient(e.to_string()))?;
        std::fs::create_dir_all(&self.ctx.artifact_dir)
            .and_then(|_| std::fs::write(&path, body))
            .map_err(|e| JobError::Transient(e.to_string()))?;

        let published = self
            .ctx
            .portfolio_publisher
            .publish(&[Artifact::new(path, logical_name)])
            .map_err(|e| JobError::Transient(e.to_string()))?;
        Ok(format!(
            "tracked {} holdings, published {published} artifacts",
            holdings.len()
        ))
    }
}

/// Executor registry for the built-in calendar.
pub fn default_executors(ctx: Arc<JobContext>) -> crate::scheduler::runner::ExecutorMap {
    let mut executors: crate::scheduler::runner::ExecutorMap = std::collections::HashMap::new();
    executors.insert(
        "data-update".to_string(),
        Arc::new(DataUpdateJob::new(ctx.clone())),
    );
    executors.insert(
        "analysis".to_string(),
        Arc::new(AnalysisJob::new(ctx.clone())),
    );
    executors.insert("publish".to_string(), Arc::new(PublishJob::new(ctx.clone())));
    executors.insert(
        "portfolio-tracking".to_string(),
        Arc::new(PortfolioTrackingJob::new(ctx)),
    );
    executors
}
