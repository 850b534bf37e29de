//! Error types for the AutoML engine

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, AutoMlError>;

/// Main error type for the AutoML engine
#[derive(Error, Debug)]
pub enum AutoMlError {
    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Model '{model}' failed during search/fit: {message}")]
    SearchFailure { model: String, message: String },

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Failed to deserialize stored model: {0}")]
    Deserialization(String),

    #[error("Input rows are missing trained columns: {}", .missing.join(", "))]
    SchemaMismatch { missing: Vec<String> },

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    #[error("Computation error: {0}")]
    Computation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
