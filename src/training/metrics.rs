//! Evaluation metrics and the candidate-ranking primary score

use super::ProblemType;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Metrics computed for a fitted model on the held-out partition.
///
/// Classification fills `accuracy`; regression fills `r2` and `mse`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvalMetrics {
    /// Fraction of exact label matches in [0, 1] (classification)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    /// Coefficient of determination; negative for fits worse than the mean
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r2: Option<f64>,
    /// Mean squared error (regression)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mse: Option<f64>,
    /// Wall time spent fitting this candidate, in seconds
    #[serde(default)]
    pub training_time_secs: f64,
    /// Number of evaluation samples
    #[serde(default)]
    pub n_samples: usize,
    /// Number of feature columns
    #[serde(default)]
    pub n_features: usize,
}

impl EvalMetrics {
    /// Compute classification metrics: exact-match accuracy over encoded
    /// class indices.
    pub fn classification(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Self {
        let correct = y_true
            .iter()
            .zip(y_pred.iter())
            .filter(|(t, p)| (*t - *p).abs() < 0.5)
            .count();

        Self {
            accuracy: Some(correct as f64 / y_true.len() as f64),
            n_samples: y_true.len(),
            ..Default::default()
        }
    }

    /// Compute regression metrics: R² and MSE.
    ///
    /// A zero-variance target reports R² = 0.0, which keeps ranking
    /// well-defined on degenerate holdouts.
    pub fn regression(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Self {
        let n = y_true.len() as f64;
        let ss_res: f64 = y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(t, p)| (t - p).powi(2))
            .sum();
        let mse = ss_res / n;

        let y_mean = y_true.sum() / n;
        let ss_tot: f64 = y_true.iter().map(|y| (y - y_mean).powi(2)).sum();
        let r2 = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 0.0 };

        Self {
            r2: Some(r2),
            mse: Some(mse),
            n_samples: y_true.len(),
            ..Default::default()
        }
    }

    /// The single scalar used to rank candidates: accuracy for
    /// classification, R² for regression.
    pub fn primary_score(&self, problem_type: ProblemType) -> f64 {
        match problem_type {
            ProblemType::Classification => self.accuracy.unwrap_or(f64::NEG_INFINITY),
            ProblemType::Regression => self.r2.unwrap_or(f64::NEG_INFINITY),
        }
    }
}
