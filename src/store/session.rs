use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::DetectionResult;
use crate::error::{NailedItError, Result};

/// The last analysis, as handed from the upload flow to the results view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredAnalysis {
    #[serde(flatten)]
    pub result: DetectionResult,
    #[serde(rename = "fileName")]
    pub file_name: String,
    #[serde(rename = "useKmeans")]
    pub use_kmeans: bool,
    pub created_at: String,
}

impl StoredAnalysis {
    pub fn new(result: DetectionResult, file_name: &str, use_kmeans: bool) -> Self {
        Self {
            result,
            file_name: file_name.to_string(),
            use_kmeans,
            created_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Holds at most one [`StoredAnalysis`] as a JSON file.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self, analysis: &StoredAnalysis) -> Result<()> {
        let json = serde_json::to_string(analysis)
            .map_err(|e| NailedItError::Storage(format!("Failed to serialize analysis: {}", e)))?;
        super::write_atomic(&self.path, json.as_bytes())
            .map_err(|e| NailedItError::Storage(format!("Failed to save {:?}: {}", self.path, e)))?;
        info!(
            "Stored analysis of '{}' at {:?}",
            analysis.file_name, self.path
        );
        Ok(())
    }

    pub fn load(&self) -> Result<Option<StoredAnalysis>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let analysis = serde_json::from_str(&content).map_err(|e| NailedItError::Decode {
            what: "stored analysis",
            message: e.to_string(),
        })?;
        Ok(Some(analysis))
    }

    /// Remove the stored analysis. Clearing an empty session is a no-op.
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                info!("Cleared stored analysis at {:?}", self.path);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
