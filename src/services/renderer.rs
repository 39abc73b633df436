//! Chart/report rendering collaborator boundary
//!
//! The orchestrator only needs a success/failure signal and the produced
//! file paths from the renderer; the actual charting pipeline is external.

use crate::error::RenderError;
use crate::models::{CompositeScore, IndicatorVector};
use crate::publish::Artifact;
use async_trait::async_trait;
use serde_json::json;
use std::fs;
use std::path::PathBuf;

#[async_trait]
pub trait ArtifactRenderer: Send + Sync {
    /// Render the artifacts for one asset's score and indicator vector,
    /// returning the files it produced.
    async fn render(
        &self,
        score: &CompositeScore,
        vector: &IndicatorVector,
    ) -> Result<Vec<Artifact>, RenderError>;
}

/// Built-in renderer that materializes one score-card JSON per asset in the
/// local artifact directory. Interactive chart rendering plugs in behind
/// the same trait.
pub struct ScoreCardRenderer {
    artifact_dir: PathBuf,
}

impl ScoreCardRenderer {
    pub fn new(artifact_dir: impl Into<PathBuf>) -> Self {
        Self {
            artifact_dir: artifact_dir.into(),
        }
    }
}

#[async_trait]
impl ArtifactRenderer for ScoreCardRenderer {
    async fn render(
        &self,
        score: &CompositeScore,
        vector: &IndicatorVector,
    ) -> Result<Vec<Artifact>, RenderError> {
        fs::create_dir_all(&self.artifact_dir).map_err(|e| RenderError::Io {
            symbol: score.symbol.clone(),
            source: e,
        })?;

        let payload = json!({
            "score": score,
            "rating": score.rating(),
            "indicators": vector,
        });
        let body = serde_json::to_vec_pretty(&payload).map_err(|e| RenderError::Serde {
            symbol: score.symbol.clone(),
            source: e,
        })?;

        let logical_name = format!("{}_score.json", score.symbol.to_lowercase());
        let path = self.artifact_dir.join(&logical_name);
        fs::write(&path, body).map_err(|e| RenderError::Io {
            symbol: score.symbol.clone(),
            source: e,
        })?;

        Ok(vec![Artifact::new(path, logical_name)])
    }
}
