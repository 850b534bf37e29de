//! Model training and selection
//!
//! The training pipeline for one run: detect the problem type, split once,
//! grid-search and fit every catalog entry, evaluate each on the shared
//! holdout, and select the single best candidate.

mod engine;
mod problem;
mod search;
pub mod catalog;
pub mod cross_validation;
pub mod decision_tree;
pub mod linear_models;
pub mod metrics;
pub mod random_forest;
pub mod svm;

pub use catalog::{catalog_for, CatalogEntry, ModelFamily, ParamGrid, ParamSet, ParamValue};
pub use cross_validation::{holdout_split, k_fold_split, CvSplit};
pub use engine::{
    select_best, CandidateSummary, TrainEngine, TrainedCandidate, TrainedModel, TrainingOutcome,
    TrainingReport,
};
pub use linear_models::{LinearRegression, LogisticRegression};
pub use metrics::EvalMetrics;
pub use problem::{detect_problem_type, ProblemType};
pub use random_forest::RandomForest;
pub use search::fit_entry;
pub use svm::{KernelType, SvmClassifier, SvmConfig, SvmRegressor};
