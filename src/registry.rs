//! Model registry: persist selected models, reload them for inference

use crate::dataset::Value;
use crate::error::{AutoMlError, Result};
use crate::training::{ProblemType, TrainedModel};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

/// Everything needed to serve a trained model later: the fitted model, the
/// feature table it expects, and how to decode its raw predictions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub model: TrainedModel,
    pub problem_type: ProblemType,
    /// Feature columns in matrix order
    pub feature_names: Vec<String>,
    /// Class-index to label table (classification only)
    pub class_labels: Option<Vec<Value>>,
    /// Winning catalog entry
    pub model_name: String,
    pub trained_at: DateTime<Utc>,
}

/// Filesystem-backed model store keyed by caller-opaque filenames.
///
/// Filenames are append-only from the registry's point of view: saving an
/// existing name silently overwrites, and nothing is ever deleted.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    dir: PathBuf,
}

impl ModelRegistry {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Generate a fresh unique model filename
    pub fn generate_filename() -> String {
        format!("{}.json", Uuid::new_v4())
    }

    /// Serialize an artifact under `filename`, creating the storage
    /// directory if absent. Returns the full path written.
    pub fn save(&self, artifact: &ModelArtifact, filename: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(filename);
        let json = serde_json::to_string_pretty(artifact)
            .map_err(|e| AutoMlError::Computation(format!("failed to serialize model: {}", e)))?;
        fs::write(&path, json)?;
        info!(path = %path.display(), model = %artifact.model_name, "model saved");
        Ok(path)
    }

    /// Load an artifact by filename.
    pub fn load(&self, filename: &str) -> Result<ModelArtifact> {
        let path = self.dir.join(filename);
        if !path.exists() {
            return Err(AutoMlError::ModelNotFound(filename.to_string()));
        }
        let json = fs::read_to_string(&path)?;
        let artifact: ModelArtifact = serde_json::from_str(&json)
            .map_err(|e| AutoMlError::Deserialization(e.to_string()))?;
        info!(path = %path.display(), model = %artifact.model_name, "model loaded");
        Ok(artifact)
    }
}
