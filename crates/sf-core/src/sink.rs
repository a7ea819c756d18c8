//! Artifact persistence

use crate::error::SinkError;
use crate::pipeline::GenerationOutcome;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Rendered skill document
pub const SKILL_FILE: &str = "SKILL.md";

/// Document metadata and run summary
pub const METADATA_FILE: &str = "metadata.json";

/// Validation report
pub const REPORT_FILE: &str = "validation.json";

/// Stores finished runs
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    /// Persist one outcome; returns where it was stored
    async fn persist(&self, outcome: &GenerationOutcome) -> Result<PathBuf, SinkError>;
}

/// Writes each run into `<root>/<skill-name>-<timestamp>-<run suffix>/`
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    /// Create sink rooted at `root`
    #[inline]
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn write(path: PathBuf, contents: Vec<u8>) -> Result<(), SinkError> {
        tokio::fs::write(&path, contents)
            .await
            .map_err(|e| SinkError::io(path, e))
    }
}

#[async_trait]
impl ArtifactSink for DirectorySink {
    async fn persist(&self, outcome: &GenerationOutcome) -> Result<PathBuf, SinkError> {
        let run = outcome.run_id.to_string().to_lowercase();
        let dir = self.root.join(format!(
            "{}-{}-{}",
            outcome.document.meta().name,
            outcome.created_at.format("%Y%m%d-%H%M%S"),
            &run[run.len().saturating_sub(6)..]
        ));
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| SinkError::io(&dir, e))?;

        let metadata = serde_json::json!({
            "run_id": outcome.run_id,
            "created_at": outcome.created_at,
            "status": outcome.status,
            "freedom": outcome.freedom,
            "document": outcome.document.metadata(),
        });

        let markdown = outcome.document.render_markdown().into_bytes();
        Self::write(dir.join(SKILL_FILE), markdown).await?;
        Self::write(dir.join(METADATA_FILE), serde_json::to_vec_pretty(&metadata)?).await?;
        Self::write(dir.join(REPORT_FILE), serde_json::to_vec_pretty(&outcome.report)?).await?;

        tracing::info!(path = %dir.display(), "artifacts persisted");
        Ok(dir)
    }
}
