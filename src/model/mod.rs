//! Model Module
//!
//! Loads the pre-trained emission regressor from its serialized artifact
//! and runs inference on a single [`FeatureFrame`]. Training happens
//! elsewhere; this crate only consumes the exported pipeline.

pub mod artifact;
pub mod estimator;
pub mod frame;
pub mod preprocess;

pub use artifact::{ModelArtifact, FORMAT_VERSION};
pub use estimator::{Aggregation, Estimator, Node, Tree};
pub use frame::{FeatureFrame, FeatureValue};
pub use preprocess::{CategoricalColumn, HandleUnknown, NumericColumn, Preprocessor};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Model file not found: {0}")]
    NotFound(String),
    #[error("failed to read model artifact {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse model artifact: {0}")]
    Parse(String),
    #[error("unsupported model format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("invalid model artifact: {0}")]
    Invalid(String),
    #[error("column '{column}' expects a number, got {value}")]
    ExpectedNumber { column: String, value: String },
    #[error("column '{column}' expects a category, got {value}")]
    ExpectedCategory { column: String, value: String },
    #[error("unknown category {value:?} for column '{column}'")]
    UnknownCategory { column: String, value: String },
    #[error("model produced a non-finite prediction")]
    NonFinite,
}

/// A regression model that predicts total emissions (kg CO₂e) for one row
pub trait Regressor: Send + Sync {
    /// Human-readable model name
    fn name(&self) -> String;

    /// Columns the model reads, in encoding order
    fn feature_columns(&self) -> Vec<String>;

    /// Known categories for a categorical column, if the model has any
    fn categories(&self, _column: &str) -> Option<Vec<String>> {
        None
    }

    /// Predict a single value. Columns the model needs but the frame lacks
    /// are treated as zero rather than rejected.
    fn predict(&self, frame: &FeatureFrame) -> Result<f64, ModelError>;
}
