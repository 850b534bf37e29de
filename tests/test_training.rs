//! Integration tests: training pipeline end-to-end

use automl_engine::prelude::*;
use tempfile::TempDir;

fn num_row(pairs: &[(&str, f64)]) -> Row {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), Value::Number(*v)))
        .collect()
}

/// Perfectly linear relationship: y = 10 * a, b carries the same signal.
fn linear_regression_dataset(n: usize) -> Dataset {
    let rows: Vec<Row> = (1..=n)
        .map(|i| num_row(&[("a", i as f64), ("b", 10.0 * i as f64)]))
        .collect();
    let target: Vec<Value> = (1..=n).map(|i| Value::Number(10.0 * i as f64)).collect();
    Dataset::new(rows, target).unwrap()
}

/// Two well-separated clusters labeled "cat" and "dog".
fn cats_and_dogs_dataset() -> Dataset {
    let mut rows = Vec::new();
    let mut target = Vec::new();
    for i in 0..10 {
        rows.push(num_row(&[("x", i as f64 * 0.1), ("y", i as f64 * 0.1)]));
        target.push(Value::Text("cat".to_string()));
        rows.push(num_row(&[("x", 5.0 + i as f64 * 0.1), ("y", 5.0 + i as f64 * 0.1)]));
        target.push(Value::Text("dog".to_string()));
    }
    Dataset::new(rows, target).unwrap()
}

#[test]
fn test_numeric_target_is_regression() {
    let target: Vec<Value> = vec![10.0, 20.0, 30.0, 40.0, 50.0]
        .into_iter()
        .map(Value::Number)
        .collect();
    assert_eq!(
        detect_problem_type(&target).unwrap(),
        ProblemType::Regression
    );
}

#[test]
fn test_string_target_is_classification() {
    let target: Vec<Value> = ["cat", "dog", "cat", "dog"]
        .iter()
        .map(|s| Value::Text(s.to_string()))
        .collect();
    assert_eq!(
        detect_problem_type(&target).unwrap(),
        ProblemType::Classification
    );
}

#[test]
fn test_linear_data_selects_linear_regression() {
    let dir = TempDir::new().unwrap();
    let engine = TrainEngine::new(EngineConfig::new(dir.path()));

    let outcome = engine.train(&linear_regression_dataset(20)).unwrap();

    assert_eq!(outcome.report.model_name, "LinearRegression");
    assert!(
        outcome.report.metrics.r2.unwrap() > 0.99,
        "expected near-perfect R², got {:?}",
        outcome.report.metrics.r2
    );
    assert!(outcome.report.metrics.mse.unwrap() < 1.0);
    assert!(outcome.report.metrics.accuracy.is_none());
}

#[test]
fn test_regression_candidates_in_catalog_order() {
    let dir = TempDir::new().unwrap();
    let engine = TrainEngine::new(EngineConfig::new(dir.path()));

    let outcome = engine.train(&linear_regression_dataset(20)).unwrap();

    let names: Vec<&str> = outcome
        .candidates
        .iter()
        .map(|c| c.model_name.as_str())
        .collect();
    assert_eq!(names, vec!["LinearRegression", "RandomForest", "SVM"]);
}

#[test]
fn test_tiny_linear_scenario_selects_linear_regression() {
    // Five rows: the holdout is a single row, so scores can tie; the
    // first-seen candidate must win the tie.
    let dir = TempDir::new().unwrap();
    let engine = TrainEngine::new(EngineConfig::new(dir.path()));

    let rows = vec![
        num_row(&[("a", 1.0), ("b", 10.0)]),
        num_row(&[("a", 2.0), ("b", 20.0)]),
        num_row(&[("a", 3.0), ("b", 30.0)]),
        num_row(&[("a", 4.0), ("b", 40.0)]),
        num_row(&[("a", 5.0), ("b", 50.0)]),
    ];
    let target: Vec<Value> = vec![10.0, 20.0, 30.0, 40.0, 50.0]
        .into_iter()
        .map(Value::Number)
        .collect();
    let dataset = Dataset::new(rows, target).unwrap();

    let outcome = engine.train(&dataset).unwrap();
    assert_eq!(outcome.report.model_name, "LinearRegression");
}

#[test]
fn test_classification_trains_and_reports_accuracy() {
    let dir = TempDir::new().unwrap();
    let engine = TrainEngine::new(EngineConfig::new(dir.path()));

    let outcome = engine.train(&cats_and_dogs_dataset()).unwrap();

    assert!(["LogisticRegression", "RandomForest", "SVM"]
        .contains(&outcome.report.model_name.as_str()));
    let accuracy = outcome.report.metrics.accuracy.unwrap();
    assert!(
        accuracy > 0.5,
        "separable clusters should beat chance, got {}",
        accuracy
    );
    assert!(outcome.report.metrics.r2.is_none());

    let names: Vec<&str> = outcome
        .candidates
        .iter()
        .map(|c| c.model_name.as_str())
        .collect();
    assert_eq!(names, vec!["LogisticRegression", "RandomForest", "SVM"]);
}

#[test]
fn test_training_is_deterministic_with_fixed_seeds() {
    let dir = TempDir::new().unwrap();
    let engine = TrainEngine::new(EngineConfig::new(dir.path()));
    let dataset = cats_and_dogs_dataset();

    let first = engine.train(&dataset).unwrap();
    let second = engine.train(&dataset).unwrap();

    assert_eq!(first.report.model_name, second.report.model_name);
    assert_eq!(
        first.report.metrics.accuracy,
        second.report.metrics.accuracy
    );
    for (a, b) in first.candidates.iter().zip(second.candidates.iter()) {
        assert_eq!(a.model_name, b.model_name);
        assert_eq!(a.score, b.score, "candidate {} scores differ", a.model_name);
    }
    // Distinct runs still get distinct handles
    assert_ne!(first.model_filename, second.model_filename);
}

#[test]
fn test_mismatched_lengths_rejected() {
    let rows = vec![num_row(&[("a", 1.0)]), num_row(&[("a", 2.0)])];
    let target = vec![Value::Number(1.0)];
    let err = Dataset::new(rows, target).unwrap_err();
    assert!(matches!(err, AutoMlError::InvalidDataset(_)));
}

#[test]
fn test_two_row_dataset_aborts_as_search_failure() {
    // A 1/1 split leaves too little data for any candidate's grid search
    // (or even a meaningful plain fit); the run must abort with the
    // failing candidate's name, not skip it.
    let dir = TempDir::new().unwrap();
    let engine = TrainEngine::new(EngineConfig::new(dir.path()));

    let rows = vec![num_row(&[("a", 1.0)]), num_row(&[("a", 2.0)])];
    let target = vec![Value::Number(1.0), Value::Number(2.0)];
    let dataset = Dataset::new(rows, target).unwrap();

    let err = engine.train(&dataset).unwrap_err();
    assert!(matches!(err, AutoMlError::SearchFailure { .. }));
}

#[test]
fn test_training_persists_model_file() {
    let dir = TempDir::new().unwrap();
    let engine = TrainEngine::new(EngineConfig::new(dir.path()));

    let outcome = engine.train(&linear_regression_dataset(20)).unwrap();

    let stored = dir.path().join(&outcome.model_filename);
    assert!(stored.exists(), "expected artifact at {:?}", stored);
    assert!(outcome.model_filename.ends_with(".json"));
}
