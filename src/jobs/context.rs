//! Job context for dependency injection

use crate::metrics::Metrics;
use crate::publish::{Artifact, Publisher};
use crate::scoring::ScoringConfig;
use crate::services::market_data::MarketDataProvider;
use crate::services::renderer::ArtifactRenderer;
use crate::services::store::SeriesStore;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared collaborators handed to every job executor.
///
/// Jobs only go through these seams; they never open their own
/// connections. The artifact list is the daily chain's declared output
/// set: written by the analysis job, consumed by the publish job.
pub struct JobContext {
    pub provider: Arc<dyn MarketDataProvider>,
    pub renderer: Arc<dyn ArtifactRenderer>,
    pub store: Arc<SeriesStore>,
    pub publisher: Publisher,
    pub portfolio_publisher: Publisher,
    pub symbols: Vec<String>,
    pub portfolio_symbols: Vec<String>,
    pub scoring: ScoringConfig,
    pub artifact_dir: std::path::PathBuf,
    pub metrics: Option<Arc<Metrics>>,
    pub staged_artifacts: RwLock<Vec<Artifact>>,
}

impl JobContext {
    pub async fn stage_artifacts(&self, artifacts: Vec<Artifact>) {
        let mut staged = self.staged_artifacts.write().await;
        *staged = artifacts;
    }

    pub async fn staged(&self) -> Vec<Artifact> {
        self.staged_artifacts.read().await.clone()
    }
}
