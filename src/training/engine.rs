//! Training engine: fit every catalog entry, evaluate, select, persist

use super::catalog::catalog_for;
use super::cross_validation::holdout_split;
use super::linear_models::{LinearRegression, LogisticRegression};
use super::metrics::EvalMetrics;
use super::problem::detect_problem_type;
use super::random_forest::RandomForest;
use super::search::fit_entry;
use super::svm::{SvmClassifier, SvmRegressor};
use super::ProblemType;
use crate::config::EngineConfig;
use crate::dataset::{encode_target, Dataset};
use crate::error::{AutoMlError, Result};
use crate::registry::{ModelArtifact, ModelRegistry};
use chrono::Utc;
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::info;

/// Enum holding the fitted model variants the catalog can produce
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TrainedModel {
    LinearRegression(LinearRegression),
    LogisticRegression(LogisticRegression),
    RandomForestClassifier(RandomForest),
    RandomForestRegressor(RandomForest),
    SvmClassifier(SvmClassifier),
    SvmRegressor(SvmRegressor),
}

impl TrainedModel {
    /// Make predictions with whichever variant is held
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        match self {
            TrainedModel::LinearRegression(m) => m.predict(x),
            TrainedModel::LogisticRegression(m) => m.predict(x),
            TrainedModel::RandomForestClassifier(m) => m.predict(x),
            TrainedModel::RandomForestRegressor(m) => m.predict(x),
            TrainedModel::SvmClassifier(m) => m.predict(x),
            TrainedModel::SvmRegressor(m) => m.predict(x),
        }
    }
}

/// One fitted-and-evaluated catalog entry
#[derive(Debug, Clone)]
pub struct TrainedCandidate {
    pub name: String,
    pub model: TrainedModel,
    pub metrics: EvalMetrics,
    /// Primary score on the shared holdout (accuracy / R²)
    pub score: f64,
}

/// The winner's report: which entry won plus its holdout metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub model_name: String,
    #[serde(flatten)]
    pub metrics: EvalMetrics,
}

/// Per-candidate summary kept alongside the winner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateSummary {
    pub model_name: String,
    pub score: f64,
    pub training_time_secs: f64,
}

/// Result of one training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingOutcome {
    /// Opaque handle for the persisted winner; feed it to the inference engine
    pub model_filename: String,
    pub report: TrainingReport,
    /// All candidates in catalog order, for comparison
    pub candidates: Vec<CandidateSummary>,
}

/// Keep a running best over candidates in catalog order.
///
/// Strict `>` on the primary score: exact ties keep the earlier candidate.
/// The initial best is negative infinity, so the first candidate always
/// becomes the provisional best.
pub fn select_best(candidates: Vec<TrainedCandidate>) -> Result<TrainedCandidate> {
    let mut best: Option<TrainedCandidate> = None;
    let mut best_score = f64::NEG_INFINITY;

    for candidate in candidates {
        if candidate.score > best_score {
            best_score = candidate.score;
            best = Some(candidate);
        }
    }

    best.ok_or_else(|| AutoMlError::Computation("no candidates to select from".to_string()))
}

/// Main training engine
#[derive(Debug, Clone)]
pub struct TrainEngine {
    config: EngineConfig,
}

impl TrainEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run the full selection pipeline on a dataset.
    ///
    /// Detects the problem type, splits once, fits and evaluates every
    /// catalog entry on the shared partition, selects the best, and persists
    /// it under a generated filename. Any candidate failure aborts the run.
    pub fn train(&self, dataset: &Dataset) -> Result<TrainingOutcome> {
        let problem_type = detect_problem_type(dataset.target())?;
        info!(problem_type = %problem_type, n_rows = dataset.n_rows(), "detected problem type");

        let x = dataset.to_matrix()?;
        let (y, class_labels) = encode_target(dataset.target(), problem_type)?;

        let split = holdout_split(x.nrows(), self.config.test_fraction, self.config.split_seed)?;
        let x_train = x.select(Axis(0), &split.train_indices);
        let y_train = Array1::from_iter(split.train_indices.iter().map(|&i| y[i]));
        let x_test = x.select(Axis(0), &split.test_indices);
        let y_test = Array1::from_iter(split.test_indices.iter().map(|&i| y[i]));

        let mut candidates = Vec::new();
        for entry in catalog_for(problem_type) {
            let start = Instant::now();

            let model = fit_entry(&entry, problem_type, &x_train, &y_train, &self.config)
                .map_err(|e| AutoMlError::SearchFailure {
                    model: entry.name.to_string(),
                    message: e.to_string(),
                })?;
            let preds = model
                .predict(&x_test)
                .map_err(|e| AutoMlError::SearchFailure {
                    model: entry.name.to_string(),
                    message: e.to_string(),
                })?;

            let mut metrics = match problem_type {
                ProblemType::Classification => EvalMetrics::classification(&y_test, &preds),
                ProblemType::Regression => EvalMetrics::regression(&y_test, &preds),
            };
            metrics.training_time_secs = start.elapsed().as_secs_f64();
            metrics.n_features = x.ncols();

            let score = metrics.primary_score(problem_type);
            info!(model = entry.name, score, "candidate evaluated");

            candidates.push(TrainedCandidate {
                name: entry.name.to_string(),
                model,
                metrics,
                score,
            });
        }

        let summaries: Vec<CandidateSummary> = candidates
            .iter()
            .map(|c| CandidateSummary {
                model_name: c.name.clone(),
                score: c.score,
                training_time_secs: c.metrics.training_time_secs,
            })
            .collect();

        let winner = select_best(candidates)?;
        info!(model = %winner.name, score = winner.score, "best model selected");

        let artifact = ModelArtifact {
            model: winner.model,
            problem_type,
            feature_names: dataset.feature_names().to_vec(),
            class_labels,
            model_name: winner.name.clone(),
            trained_at: Utc::now(),
        };

        let registry = ModelRegistry::new(&self.config.model_dir);
        let model_filename = ModelRegistry::generate_filename();
        registry.save(&artifact, &model_filename)?;

        Ok(TrainingOutcome {
            model_filename,
            report: TrainingReport {
                model_name: winner.name,
                metrics: winner.metrics,
            },
            candidates: summaries,
        })
    }
}
