//! Problem type detection

use crate::dataset::Value;
use crate::error::{AutoMlError, Result};
use serde::{Deserialize, Serialize};

/// The learning task, derived once per training run from the target vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProblemType {
    Classification,
    Regression,
}

impl std::fmt::Display for ProblemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProblemType::Classification => write!(f, "classification"),
            ProblemType::Regression => write!(f, "regression"),
        }
    }
}

/// Infer the problem type from the target's value domain.
///
/// Every value numeric (int or float) means regression; anything else —
/// strings, booleans, mixed types — means classification. Deliberately
/// type-driven with no cardinality heuristics: integer-coded labels the
/// caller intends as categories must arrive as `Text` or `Bool`.
pub fn detect_problem_type(target: &[Value]) -> Result<ProblemType> {
    if target.is_empty() {
        return Err(AutoMlError::InvalidDataset(
            "cannot detect problem type from an empty target".to_string(),
        ));
    }

    if target.iter().all(Value::is_numeric) {
        Ok(ProblemType::Regression)
    } else {
        Ok(ProblemType::Classification)
    }
}
