//! Atomic artifact publishing
//!
//! The serving directory is polled by an external workflow consumer, so a
//! half-written file must never be visible there. Each artifact is staged
//! under a temporary name in the target directory and renamed into place;
//! rename within one filesystem is atomic from the consumer's point of view.

use crate::error::PublishError;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

/// One artifact to publish: where it was produced and the name it should
/// carry at the serving location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub source: PathBuf,
    pub logical_name: String,
}

impl Artifact {
    pub fn new(source: impl Into<PathBuf>, logical_name: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            logical_name: logical_name.into(),
        }
    }
}

pub struct Publisher {
    target_dir: PathBuf,
}

impl Publisher {
    pub fn new(target_dir: impl Into<PathBuf>) -> Self {
        Self {
            target_dir: target_dir.into(),
        }
    }

    /// Publish every artifact in the set. Called only after the producing
    /// job reported `Succeeded`.
    pub fn publish(&self, artifacts: &[Artifact]) -> Result<usize, PublishError> {
        fs::create_dir_all(&self.target_dir).map_err(|e| PublishError::Io {
            name: self.target_dir.display().to_string(),
            source: e,
        })?;

        for artifact in artifacts {
            self.publish_one(artifact)?;
        }
        info!(
            count = artifacts.len(),
            target = %self.target_dir.display(),
            "published {} artifacts to {}",
            artifacts.len(),
            self.target_dir.display()
        );
        Ok(artifacts.len())
    }

    fn publish_one(&self, artifact: &Artifact) -> Result<(), PublishError> {
        if !artifact.source.exists() {
            return Err(PublishError::MissingSource(
                artifact.source.display().to_string(),
            ));
        }
        let staged = self
            .target_dir
            .join(format!(".{}.tmp-{}", artifact.logical_name, std::process::id()));
        let finished = self.target_dir.join(&artifact.logical_name);

        let copy = fs::copy(&artifact.source, &staged).and_then(|_| fs::rename(&staged, &finished));
        if let Err(e) = copy {
            // Never leave a stale staging file behind.
            let _ = fs::remove_file(&staged);
            return Err(PublishError::Io {
                name: artifact.logical_name.clone(),
                source: e,
            });
        }
        debug!(name = %artifact.logical_name, "published artifact");
        Ok(())
    }
}
