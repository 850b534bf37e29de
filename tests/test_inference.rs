//! Integration tests: persistence round trips and inference errors

use automl_engine::prelude::*;
use tempfile::TempDir;

fn num_row(pairs: &[(&str, f64)]) -> Row {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), Value::Number(*v)))
        .collect()
}

fn train_linear(dir: &TempDir) -> (TrainingOutcome, EngineConfig) {
    let config = EngineConfig::new(dir.path());
    let rows: Vec<Row> = (1..=20)
        .map(|i| num_row(&[("a", i as f64), ("b", 10.0 * i as f64)]))
        .collect();
    let target: Vec<Value> = (1..=20).map(|i| Value::Number(10.0 * i as f64)).collect();
    let dataset = Dataset::new(rows, target).unwrap();

    let outcome = TrainEngine::new(config.clone()).train(&dataset).unwrap();
    (outcome, config)
}

fn train_cats_and_dogs(dir: &TempDir) -> (TrainingOutcome, EngineConfig) {
    let config = EngineConfig::new(dir.path());
    let mut rows = Vec::new();
    let mut target = Vec::new();
    for i in 0..10 {
        rows.push(num_row(&[("x", i as f64 * 0.1), ("y", i as f64 * 0.1)]));
        target.push(Value::Text("cat".to_string()));
        rows.push(num_row(&[("x", 5.0 + i as f64 * 0.1), ("y", 5.0 + i as f64 * 0.1)]));
        target.push(Value::Text("dog".to_string()));
    }
    let dataset = Dataset::new(rows, target).unwrap();

    let outcome = TrainEngine::new(config.clone()).train(&dataset).unwrap();
    (outcome, config)
}

#[test]
fn test_predict_single_row() {
    let dir = TempDir::new().unwrap();
    let (outcome, config) = train_linear(&dir);
    let engine = InferenceEngine::new(config);

    let predictions = engine
        .predict(&outcome.model_filename, num_row(&[("a", 7.0), ("b", 70.0)]))
        .unwrap();

    assert_eq!(predictions.len(), 1);
    match &predictions[0] {
        Value::Number(v) => assert!((v - 70.0).abs() < 1.0, "prediction {} far from 70", v),
        other => panic!("expected numeric prediction, got {:?}", other),
    }
}

#[test]
fn test_predict_batch_preserves_order_and_count() {
    let dir = TempDir::new().unwrap();
    let (outcome, config) = train_linear(&dir);
    let engine = InferenceEngine::new(config);

    let rows = vec![
        num_row(&[("a", 2.0), ("b", 20.0)]),
        num_row(&[("a", 5.0), ("b", 50.0)]),
        num_row(&[("a", 9.0), ("b", 90.0)]),
    ];
    let predictions = engine.predict(&outcome.model_filename, rows).unwrap();

    assert_eq!(predictions.len(), 3);
    let values: Vec<f64> = predictions
        .iter()
        .map(|p| match p {
            Value::Number(v) => *v,
            other => panic!("expected numeric prediction, got {:?}", other),
        })
        .collect();
    assert!(values[0] < values[1] && values[1] < values[2]);
}

#[test]
fn test_predict_is_idempotent_across_loads() {
    let dir = TempDir::new().unwrap();
    let (outcome, config) = train_linear(&dir);
    let engine = InferenceEngine::new(config);

    let row = num_row(&[("a", 3.0), ("b", 30.0)]);
    let first = engine.predict(&outcome.model_filename, row.clone()).unwrap();
    let second = engine.predict(&outcome.model_filename, row).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_classification_predictions_decode_to_labels() {
    let dir = TempDir::new().unwrap();
    let (outcome, config) = train_cats_and_dogs(&dir);
    let engine = InferenceEngine::new(config);

    let rows = vec![
        num_row(&[("x", 0.1), ("y", 0.1)]),
        num_row(&[("x", 5.4), ("y", 5.4)]),
    ];
    let predictions = engine.predict(&outcome.model_filename, rows).unwrap();

    assert_eq!(predictions.len(), 2);
    for p in &predictions {
        match p {
            Value::Text(label) => assert!(label == "cat" || label == "dog"),
            other => panic!("expected text label, got {:?}", other),
        }
    }
}

#[test]
fn test_unknown_model_filename_is_not_found() {
    let dir = TempDir::new().unwrap();
    let engine = InferenceEngine::new(EngineConfig::new(dir.path()));

    let err = engine
        .predict("no-such-model.json", num_row(&[("a", 1.0)]))
        .unwrap_err();
    assert!(matches!(err, AutoMlError::ModelNotFound(_)));
}

#[test]
fn test_missing_columns_are_schema_mismatch() {
    let dir = TempDir::new().unwrap();
    let (outcome, config) = train_linear(&dir);
    let engine = InferenceEngine::new(config);

    let err = engine
        .predict(&outcome.model_filename, num_row(&[("a", 1.0)]))
        .unwrap_err();
    match err {
        AutoMlError::SchemaMismatch { missing } => {
            assert_eq!(missing, vec!["b".to_string()]);
        }
        other => panic!("expected SchemaMismatch, got {:?}", other),
    }
}

#[test]
fn test_extra_columns_are_ignored() {
    let dir = TempDir::new().unwrap();
    let (outcome, config) = train_linear(&dir);
    let engine = InferenceEngine::new(config);

    let mut row = num_row(&[("a", 4.0), ("b", 40.0)]);
    row.insert("unused".to_string(), Value::Number(99.0));

    let predictions = engine.predict(&outcome.model_filename, row).unwrap();
    assert_eq!(predictions.len(), 1);
}

#[test]
fn test_stored_artifact_reloads_directly() {
    let dir = TempDir::new().unwrap();
    let (outcome, config) = train_linear(&dir);

    let registry = ModelRegistry::new(&config.model_dir);
    let artifact = registry.load(&outcome.model_filename).unwrap();

    assert_eq!(artifact.model_name, outcome.report.model_name);
    assert_eq!(
        artifact.feature_names,
        vec!["a".to_string(), "b".to_string()]
    );
    assert!(artifact.class_labels.is_none());
}
