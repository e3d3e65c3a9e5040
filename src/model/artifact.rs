//! Model Artifact
//!
//! The on-disk form of the exported pipeline: a preprocessor followed by
//! an estimator, stored as JSON or YAML.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use super::estimator::Estimator;
use super::frame::FeatureFrame;
use super::preprocess::Preprocessor;
use super::{ModelError, Regressor};

/// Artifact format understood by this build
pub const FORMAT_VERSION: u32 = 1;

fn default_name() -> String {
    "carbon_emission_model".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    #[serde(default = "default_name")]
    pub name: String,
    pub preprocessor: Preprocessor,
    pub estimator: Estimator,
}

impl ModelArtifact {
    /// Read and validate an artifact. `.yaml`/`.yml` files are parsed as
    /// YAML, everything else as JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ModelError::NotFound(path.display().to_string()));
        }
        let raw = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let artifact = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&raw)?,
            _ => Self::from_json_str(&raw)?,
        };

        info!(
            "Loaded model '{}' from {} [{}]",
            artifact.name,
            path.display(),
            artifact.estimator.summary()
        );
        Ok(artifact)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ModelError> {
        let artifact: Self =
            serde_json::from_str(raw).map_err(|e| ModelError::Parse(e.to_string()))?;
        artifact.validate()?;
        Ok(artifact)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, ModelError> {
        let artifact: Self =
            serde_yaml::from_str(raw).map_err(|e| ModelError::Parse(e.to_string()))?;
        artifact.validate()?;
        Ok(artifact)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.format_version != FORMAT_VERSION {
            return Err(ModelError::UnsupportedVersion {
                found: self.format_version,
                expected: FORMAT_VERSION,
            });
        }
        self.preprocessor.validate()?;
        self.estimator.validate(self.preprocessor.width())
    }

    pub fn encoded_width(&self) -> usize {
        self.preprocessor.width()
    }

    /// Columns the frame is missing that the model reads
    pub fn missing_columns(&self, frame: &FeatureFrame) -> Vec<String> {
        self.preprocessor
            .columns()
            .into_iter()
            .filter(|c| !frame.contains(c))
            .collect()
    }
}

impl Regressor for ModelArtifact {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn feature_columns(&self) -> Vec<String> {
        self.preprocessor.columns()
    }

    fn categories(&self, column: &str) -> Option<Vec<String>> {
        self.preprocessor
            .categorical
            .iter()
            .find(|c| c.column == column)
            .map(|c| c.categories.clone())
    }

    fn predict(&self, frame: &FeatureFrame) -> Result<f64, ModelError> {
        let missing = self.missing_columns(frame);
        if !missing.is_empty() {
            debug!("Auto-filling missing model columns: {:?}", missing);
        }

        let x = self.preprocessor.transform(frame)?;
        let y = self.estimator.predict(&x);
        if !y.is_finite() {
            return Err(ModelError::NonFinite);
        }
        Ok(y)
    }
}
