//! AutoML model-selection-and-evaluation engine for labeled tabular data
//!
//! Given a dataset of feature rows and an aligned target vector, the engine
//! infers the problem type (classification vs. regression), grid-searches a
//! fixed catalog of model families, scores every candidate on one shared
//! held-out split, selects the best by a deterministic rule, and persists it
//! for later inference.
//!
//! # Modules
//!
//! - [`dataset`] - Feature rows, target values, validation, matrix conversion
//! - [`training`] - Catalog, grid search, evaluation, selection
//! - [`registry`] - Model persistence and reload
//! - [`inference`] - Predictions from stored models
//! - [`config`] - Engine configuration
//!
//! # Example
//!
//! ```no_run
//! use automl_engine::prelude::*;
//!
//! # fn run(dataset: Dataset) -> automl_engine::Result<()> {
//! let config = EngineConfig::new("models");
//! let outcome = TrainEngine::new(config.clone()).train(&dataset)?;
//! println!("best model: {}", outcome.report.model_name);
//!
//! # let rows: Vec<Row> = Vec::new();
//! let predictions =
//!     InferenceEngine::new(config).predict(&outcome.model_filename, rows)?;
//! # Ok(())
//! # }
//! ```

pub mod error;

pub mod config;
pub mod dataset;
pub mod inference;
pub mod registry;
pub mod training;

pub use error::{AutoMlError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::dataset::{Dataset, Row, Value};
    pub use crate::error::{AutoMlError, Result};
    pub use crate::inference::{InferenceEngine, RowsInput};
    pub use crate::registry::{ModelArtifact, ModelRegistry};
    pub use crate::training::{
        detect_problem_type, EvalMetrics, ProblemType, TrainEngine, TrainingOutcome,
        TrainingReport,
    };
}
