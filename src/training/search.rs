//! Hyperparameter grid search: exhaustive cartesian sweep with k-fold CV

use super::catalog::{CatalogEntry, ModelFamily, ParamSet};
use super::cross_validation::k_fold_split;
use super::engine::TrainedModel;
use super::linear_models::{LinearRegression, LogisticRegression};
use super::metrics::EvalMetrics;
use super::random_forest::RandomForest;
use super::svm::{KernelType, SvmClassifier, SvmConfig, SvmRegressor};
use super::ProblemType;
use crate::config::EngineConfig;
use crate::error::{AutoMlError, Result};
use ndarray::{Array1, Array2, Axis};
use tracing::debug;

/// Fit one catalog entry on the training partition.
///
/// An empty grid is a plain fit. Otherwise every configuration in the
/// cartesian product is scored by mean k-fold CV (accuracy for
/// classification, R² for regression; folds are shared across
/// configurations), the strictly best one wins, and the winner is refit on
/// the full training partition. No pruning, no early stopping.
pub fn fit_entry(
    entry: &CatalogEntry,
    problem_type: ProblemType,
    x_train: &Array2<f64>,
    y_train: &Array1<f64>,
    config: &EngineConfig,
) -> Result<TrainedModel> {
    let param_sets = entry.grid.param_sets();

    if entry.grid.is_empty() {
        return build_and_fit(
            entry.family,
            problem_type,
            &param_sets[0],
            config.model_seed,
            x_train,
            y_train,
        );
    }

    let folds = k_fold_split(x_train.nrows(), config.cv_folds)?;

    let mut best_params: Option<&ParamSet> = None;
    let mut best_mean = f64::NEG_INFINITY;

    for params in &param_sets {
        let mut fold_scores = Vec::with_capacity(folds.len());
        for split in &folds {
            let x_fit = x_train.select(Axis(0), &split.train_indices);
            let y_fit = Array1::from_iter(split.train_indices.iter().map(|&i| y_train[i]));
            let x_val = x_train.select(Axis(0), &split.test_indices);
            let y_val = Array1::from_iter(split.test_indices.iter().map(|&i| y_train[i]));

            let model = build_and_fit(
                entry.family,
                problem_type,
                params,
                config.model_seed,
                &x_fit,
                &y_fit,
            )?;
            let preds = model.predict(&x_val)?;
            fold_scores.push(fold_score(problem_type, &y_val, &preds));
        }

        let mean = fold_scores.iter().sum::<f64>() / fold_scores.len() as f64;
        debug!(entry = entry.name, params = %params, cv_score = mean, "grid configuration scored");

        if mean > best_mean {
            best_mean = mean;
            best_params = Some(params);
        }
    }

    let winner = best_params
        .ok_or_else(|| AutoMlError::Computation("grid produced no configurations".to_string()))?;
    debug!(entry = entry.name, params = %winner, cv_score = best_mean, "grid winner, refitting");

    build_and_fit(
        entry.family,
        problem_type,
        winner,
        config.model_seed,
        x_train,
        y_train,
    )
}

/// CV ranking score for one fold: the problem type's primary metric.
fn fold_score(problem_type: ProblemType, y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    let metrics = match problem_type {
        ProblemType::Classification => EvalMetrics::classification(y_true, y_pred),
        ProblemType::Regression => EvalMetrics::regression(y_true, y_pred),
    };
    metrics.primary_score(problem_type)
}

/// Instantiate a configured estimator and fit it.
fn build_and_fit(
    family: ModelFamily,
    problem_type: ProblemType,
    params: &ParamSet,
    model_seed: Option<u64>,
    x: &Array2<f64>,
    y: &Array1<f64>,
) -> Result<TrainedModel> {
    match (family, problem_type) {
        (ModelFamily::LinearRegression, ProblemType::Regression) => {
            let mut model = LinearRegression::new();
            model.fit(x, y)?;
            Ok(TrainedModel::LinearRegression(model))
        }
        (ModelFamily::LogisticRegression, ProblemType::Classification) => {
            let c = params.float("C").unwrap_or(1.0);
            let mut model = LogisticRegression::new().with_c(c);
            model.fit(x, y)?;
            Ok(TrainedModel::LogisticRegression(model))
        }
        (ModelFamily::RandomForest, _) => {
            let n_estimators = params.int("n_estimators").unwrap_or(100);
            let mut model = match problem_type {
                ProblemType::Classification => RandomForest::new_classifier(n_estimators),
                ProblemType::Regression => RandomForest::new_regressor(n_estimators),
            };
            if let Some(seed) = model_seed {
                model = model.with_random_state(seed);
            }
            model.fit(x, y)?;
            Ok(match problem_type {
                ProblemType::Classification => TrainedModel::RandomForestClassifier(model),
                ProblemType::Regression => TrainedModel::RandomForestRegressor(model),
            })
        }
        (ModelFamily::Svm, _) => {
            let kernel = match params.text("kernel").unwrap_or("rbf") {
                "linear" => KernelType::Linear,
                "rbf" => KernelType::Rbf {
                    gamma: 1.0 / x.ncols() as f64,
                },
                other => {
                    return Err(AutoMlError::Computation(format!(
                        "unknown SVM kernel '{}'",
                        other
                    )))
                }
            };
            let config = SvmConfig {
                c: params.float("C").unwrap_or(1.0),
                kernel,
                random_state: model_seed,
                ..Default::default()
            };
            match problem_type {
                ProblemType::Classification => {
                    let mut model = SvmClassifier::new(config);
                    model.fit(x, y)?;
                    Ok(TrainedModel::SvmClassifier(model))
                }
                ProblemType::Regression => {
                    let mut model = SvmRegressor::new(config);
                    model.fit(x, y)?;
                    Ok(TrainedModel::SvmRegressor(model))
                }
            }
        }
        (family, problem_type) => Err(AutoMlError::Computation(format!(
            "model family {:?} is not defined for {} problems",
            family, problem_type
        ))),
    }
}
