//! Dataset types: feature rows, target values, and matrix conversion

use crate::error::{AutoMlError, Result};
use crate::training::ProblemType;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single cell value: numeric or categorical.
///
/// `Int` and `Number` are numeric; `Bool` and `Text` are categorical labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Number(f64),
    Text(String),
}

impl Value {
    /// Whether this value belongs to the numeric domain
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Number(_))
    }

    /// Numeric view, if any
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Number(v) => Some(*v),
            Value::Bool(_) | Value::Text(_) => None,
        }
    }

    /// Type-tagged canonical form used to order and deduplicate labels.
    /// Keeps `Text("1")`, `Int(1)` and `Bool(true)` distinct.
    pub(crate) fn label_key(&self) -> String {
        match self {
            Value::Bool(b) => format!("b:{}", b),
            Value::Int(v) => format!("i:{}", v),
            Value::Number(v) => format!("n:{}", v),
            Value::Text(s) => format!("t:{}", s),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(v) => write!(f, "{}", v),
            Value::Number(v) => write!(f, "{}", v),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

/// One observation, keyed by feature name
pub type Row = HashMap<String, Value>;

/// A validated labeled dataset: feature rows plus an aligned target vector.
#[derive(Debug, Clone)]
pub struct Dataset {
    rows: Vec<Row>,
    target: Vec<Value>,
    feature_names: Vec<String>,
}

impl Dataset {
    /// Validate and construct a dataset.
    ///
    /// Requires at least two rows (a split needs one row per side), a target
    /// aligned 1:1 with the rows, and an identical feature-name set in every
    /// row.
    pub fn new(rows: Vec<Row>, target: Vec<Value>) -> Result<Self> {
        if rows.is_empty() || target.is_empty() {
            return Err(AutoMlError::InvalidDataset(
                "dataset must contain at least one row and one target".to_string(),
            ));
        }
        if rows.len() != target.len() {
            return Err(AutoMlError::InvalidDataset(format!(
                "feature rows ({}) and target values ({}) must align",
                rows.len(),
                target.len()
            )));
        }
        if rows.len() < 2 {
            return Err(AutoMlError::InvalidDataset(
                "at least two rows are required for a train/test split".to_string(),
            ));
        }

        let mut feature_names: Vec<String> = rows[0].keys().cloned().collect();
        feature_names.sort();
        if feature_names.is_empty() {
            return Err(AutoMlError::InvalidDataset(
                "rows must contain at least one feature".to_string(),
            ));
        }

        for (i, row) in rows.iter().enumerate() {
            if row.len() != feature_names.len()
                || !feature_names.iter().all(|name| row.contains_key(name))
            {
                return Err(AutoMlError::InvalidDataset(format!(
                    "row {} does not share the dataset's feature names",
                    i
                )));
            }
        }

        Ok(Self {
            rows,
            target,
            feature_names,
        })
    }

    /// Number of rows
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Feature names in matrix column order (lexicographic)
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// The target vector
    pub fn target(&self) -> &[Value] {
        &self.target
    }

    /// Materialize the feature rows as a row-major `Array2<f64>`.
    ///
    /// Every feature value must be numeric; the boundary layer encodes
    /// categoricals before the engine sees them.
    pub fn to_matrix(&self) -> Result<Array2<f64>> {
        rows_to_matrix(&self.rows, &self.feature_names)
    }
}

/// Extract named columns from rows into a row-major `Array2<f64>`.
///
/// Fails with `SchemaMismatch` when a row lacks one of the requested
/// columns, and `InvalidDataset` when a present value is not numeric.
pub(crate) fn rows_to_matrix(rows: &[Row], feature_names: &[String]) -> Result<Array2<f64>> {
    let n_rows = rows.len();
    let n_cols = feature_names.len();
    let mut data = Vec::with_capacity(n_rows * n_cols);

    for (i, row) in rows.iter().enumerate() {
        let missing: Vec<String> = feature_names
            .iter()
            .filter(|name| !row.contains_key(*name))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(AutoMlError::SchemaMismatch { missing });
        }

        for name in feature_names {
            let value = &row[name];
            let v = value.as_f64().ok_or_else(|| {
                AutoMlError::InvalidDataset(format!(
                    "feature '{}' in row {} must be numeric, got '{}'",
                    name, i, value
                ))
            })?;
            data.push(v);
        }
    }

    Array2::from_shape_vec((n_rows, n_cols), data)
        .map_err(|e| AutoMlError::Computation(e.to_string()))
}

/// Encode the target vector for fitting.
///
/// Regression targets pass through as `f64`; classification labels map to
/// class indices `0..k-1` with the label table returned for decoding.
pub(crate) fn encode_target(
    target: &[Value],
    problem_type: ProblemType,
) -> Result<(Array1<f64>, Option<Vec<Value>>)> {
    match problem_type {
        ProblemType::Regression => {
            let encoded: Result<Vec<f64>> = target
                .iter()
                .map(|v| {
                    v.as_f64().ok_or_else(|| {
                        AutoMlError::InvalidDataset(format!(
                            "regression target must be numeric, got '{}'",
                            v
                        ))
                    })
                })
                .collect();
            Ok((Array1::from_vec(encoded?), None))
        }
        ProblemType::Classification => {
            let mut labels: Vec<Value> = Vec::new();
            for value in target {
                if !labels.iter().any(|l| l.label_key() == value.label_key()) {
                    labels.push(value.clone());
                }
            }
            labels.sort_by(|a, b| a.label_key().cmp(&b.label_key()));

            let encoded: Vec<f64> = target
                .iter()
                .map(|value| {
                    labels
                        .iter()
                        .position(|l| l.label_key() == value.label_key())
                        .expect("label collected above") as f64
                })
                .collect();
            Ok((Array1::from_vec(encoded), Some(labels)))
        }
    }
}

/// Decode a raw class-index prediction back to its original label value.
pub(crate) fn decode_label(labels: &[Value], raw: f64) -> Value {
    if labels.is_empty() {
        return Value::Number(raw);
    }
    let idx = raw.round().max(0.0) as usize;
    labels[idx.min(labels.len() - 1)].clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, f64)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Value::Number(*v)))
            .collect()
    }

    #[test]
    fn test_valid_dataset() {
        let rows = vec![row(&[("a", 1.0), ("b", 10.0)]), row(&[("a", 2.0), ("b", 20.0)])];
        let ds = Dataset::new(rows, vec![Value::Number(1.0), Value::Number(2.0)]).unwrap();
        assert_eq!(ds.n_rows(), 2);
        assert_eq!(ds.feature_names(), &["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let rows = vec![row(&[("a", 1.0)]), row(&[("a", 2.0)])];
        let err = Dataset::new(rows, vec![Value::Number(1.0)]).unwrap_err();
        assert!(matches!(err, AutoMlError::InvalidDataset(_)));
    }

    #[test]
    fn test_single_row_rejected() {
        let rows = vec![row(&[("a", 1.0)])];
        let err = Dataset::new(rows, vec![Value::Number(1.0)]).unwrap_err();
        assert!(matches!(err, AutoMlError::InvalidDataset(_)));
    }

    #[test]
    fn test_inconsistent_columns_rejected() {
        let rows = vec![row(&[("a", 1.0), ("b", 2.0)]), row(&[("a", 2.0)])];
        let err = Dataset::new(rows, vec![Value::Number(1.0), Value::Number(2.0)]).unwrap_err();
        assert!(matches!(err, AutoMlError::InvalidDataset(_)));
    }

    #[test]
    fn test_to_matrix_orders_columns() {
        let rows = vec![row(&[("b", 10.0), ("a", 1.0)]), row(&[("b", 20.0), ("a", 2.0)])];
        let ds = Dataset::new(rows, vec![Value::Number(0.0), Value::Number(1.0)]).unwrap();
        let x = ds.to_matrix().unwrap();
        assert_eq!(x[[0, 0]], 1.0); // column "a" first
        assert_eq!(x[[0, 1]], 10.0);
        assert_eq!(x[[1, 0]], 2.0);
    }

    #[test]
    fn test_non_numeric_feature_rejected() {
        let mut r1 = row(&[("a", 1.0)]);
        r1.insert("b".to_string(), Value::Text("oops".to_string()));
        let mut r2 = row(&[("a", 2.0)]);
        r2.insert("b".to_string(), Value::Number(2.0));
        let ds = Dataset::new(vec![r1, r2], vec![Value::Number(0.0), Value::Number(1.0)]).unwrap();
        assert!(matches!(
            ds.to_matrix().unwrap_err(),
            AutoMlError::InvalidDataset(_)
        ));
    }

    #[test]
    fn test_encode_classification_labels() {
        let target = vec![
            Value::Text("dog".to_string()),
            Value::Text("cat".to_string()),
            Value::Text("dog".to_string()),
        ];
        let (encoded, labels) = encode_target(&target, ProblemType::Classification).unwrap();
        let labels = labels.unwrap();
        assert_eq!(labels.len(), 2);
        // "cat" sorts before "dog"
        assert_eq!(labels[0], Value::Text("cat".to_string()));
        assert_eq!(encoded.to_vec(), vec![1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_encode_regression_passthrough() {
        let target = vec![Value::Int(1), Value::Number(2.5)];
        let (encoded, labels) = encode_target(&target, ProblemType::Regression).unwrap();
        assert!(labels.is_none());
        assert_eq!(encoded.to_vec(), vec![1.0, 2.5]);
    }

    #[test]
    fn test_decode_label_clamps() {
        let labels = vec![Value::Text("a".to_string()), Value::Text("b".to_string())];
        assert_eq!(decode_label(&labels, -0.4), Value::Text("a".to_string()));
        assert_eq!(decode_label(&labels, 5.0), Value::Text("b".to_string()));
    }

    #[test]
    fn test_mixed_labels_stay_distinct() {
        let target = vec![Value::Int(1), Value::Text("1".to_string()), Value::Int(1)];
        let (_, labels) = encode_target(&target, ProblemType::Classification).unwrap();
        assert_eq!(labels.unwrap().len(), 2);
    }
}
