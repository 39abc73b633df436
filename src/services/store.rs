//! In-memory series store shared between the data-update and analysis jobs

use crate::models::AssetSeries;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Holds the run's accepted series snapshots, keyed by symbol. The
/// data-update job replaces entries wholesale; the analysis job only reads.
#[derive(Default)]
pub struct SeriesStore {
    series: RwLock<HashMap<String, AssetSeries>>,
}

impl SeriesStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put(&self, series: AssetSeries) {
        let mut guard = self.series.write().await;
        guard.insert(series.symbol.clone(), series);
    }

    pub async fn get(&self, symbol: &str) -> Option<AssetSeries> {
        let guard = self.series.read().await;
        guard.get(symbol).cloned()
    }

    pub async fn len(&self) -> usize {
        self.series.read().await.len()
    }
}
