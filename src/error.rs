//! Error taxonomy for artifact loading, validation and inference

use std::fmt::Display;
use std::path::Path;
use thiserror::Error;

/// Errors surfaced by the prediction core and its presentation boundary.
#[derive(Debug, Error)]
pub enum PredictError {
    /// A required artifact is missing, unreadable or corrupt.
    #[error("Configuration error: artifact {artifact}: {reason}")]
    Configuration { artifact: String, reason: String },

    /// A raw field failed presentation-level validation.
    #[error("Validation error: field '{field}': {reason}")]
    Validation { field: String, reason: String },

    /// The row handed to the model does not have the shape it expects.
    #[error("Shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    /// The runtime failed or produced an unusable output.
    #[error("Inference failed: {0}")]
    Inference(String),
}

impl PredictError {
    pub fn configuration(artifact: &Path, reason: impl Display) -> Self {
        Self::Configuration {
            artifact: artifact.display().to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn validation(field: &str, reason: impl Display) -> Self {
        Self::Validation {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn shape_mismatch(expected: impl Display, actual: impl Display) -> Self {
        Self::ShapeMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    pub fn inference(reason: impl Display) -> Self {
        Self::Inference(reason.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PredictError>;
