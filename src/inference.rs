//! Inference engine: load a stored model and predict on new rows

use crate::config::EngineConfig;
use crate::dataset::{decode_label, rows_to_matrix, Row, Value};
use crate::error::Result;
use crate::registry::ModelRegistry;
use crate::training::ProblemType;
use tracing::info;

/// Prediction input: a single row or a batch, normalized to a row sequence.
#[derive(Debug, Clone)]
pub enum RowsInput {
    Single(Row),
    Batch(Vec<Row>),
}

impl RowsInput {
    fn into_rows(self) -> Vec<Row> {
        match self {
            RowsInput::Single(row) => vec![row],
            RowsInput::Batch(rows) => rows,
        }
    }
}

impl From<Row> for RowsInput {
    fn from(row: Row) -> Self {
        RowsInput::Single(row)
    }
}

impl From<Vec<Row>> for RowsInput {
    fn from(rows: Vec<Row>) -> Self {
        RowsInput::Batch(rows)
    }
}

/// Serves predictions from models persisted by the training engine.
#[derive(Debug, Clone)]
pub struct InferenceEngine {
    config: EngineConfig,
}

impl InferenceEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Predict for each input row, in input order.
    ///
    /// Loads the model named by `model_filename`, re-validates that every
    /// row carries the columns the model was trained on, and decodes
    /// classification outputs back to the original label values.
    pub fn predict(
        &self,
        model_filename: &str,
        input: impl Into<RowsInput>,
    ) -> Result<Vec<Value>> {
        let registry = ModelRegistry::new(&self.config.model_dir);
        let artifact = registry.load(model_filename)?;

        let rows = input.into().into_rows();
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let x = rows_to_matrix(&rows, &artifact.feature_names)?;
        let raw = artifact.model.predict(&x)?;

        let predictions: Vec<Value> = match artifact.problem_type {
            ProblemType::Regression => raw.iter().map(|&v| Value::Number(v)).collect(),
            ProblemType::Classification => {
                let labels = artifact.class_labels.as_deref().unwrap_or(&[]);
                raw.iter().map(|&v| decode_label(labels, v)).collect()
            }
        };

        info!(
            model = %artifact.model_name,
            n_predictions = predictions.len(),
            "predictions made"
        );
        Ok(predictions)
    }
}
