//! Fixed model catalog and hyperparameter grids

use super::ProblemType;
use serde::{Deserialize, Serialize};

/// A hyperparameter value in a search grid
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Float(f64),
    Int(usize),
    Text(&'static str),
}

impl std::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamValue::Float(v) => write!(f, "{}", v),
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// One concrete hyperparameter assignment drawn from a grid
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamSet {
    values: Vec<(&'static str, ParamValue)>,
}

impl ParamSet {
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }

    pub fn float(&self, name: &str) -> Option<f64> {
        match self.get(name) {
            Some(ParamValue::Float(v)) => Some(*v),
            Some(ParamValue::Int(v)) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn int(&self, name: &str) -> Option<usize> {
        match self.get(name) {
            Some(ParamValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn text(&self, name: &str) -> Option<&'static str> {
        match self.get(name) {
            Some(ParamValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl std::fmt::Display for ParamSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .values
            .iter()
            .map(|(n, v)| format!("{}={}", n, v))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

/// Hyperparameter search space: parameter names mapped to candidate values
#[derive(Debug, Clone, Default)]
pub struct ParamGrid {
    dimensions: Vec<(&'static str, Vec<ParamValue>)>,
}

impl ParamGrid {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(dimensions: Vec<(&'static str, Vec<ParamValue>)>) -> Self {
        Self { dimensions }
    }

    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }

    /// Full cartesian product in declared order: the first dimension varies
    /// slowest. Iteration order is observable through tie-breaking, so it is
    /// part of the contract.
    pub fn param_sets(&self) -> Vec<ParamSet> {
        let mut sets = vec![ParamSet::default()];
        for (name, candidates) in &self.dimensions {
            let mut expanded = Vec::with_capacity(sets.len() * candidates.len());
            for set in &sets {
                for value in candidates {
                    let mut next = set.clone();
                    next.values.push((name, value.clone()));
                    expanded.push(next);
                }
            }
            sets = expanded;
        }
        sets
    }
}

/// The model family a catalog entry instantiates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelFamily {
    LogisticRegression,
    LinearRegression,
    RandomForest,
    Svm,
}

/// One named, fixed model family plus its search space
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub family: ModelFamily,
    pub grid: ParamGrid,
}

impl CatalogEntry {
    fn new(name: &'static str, family: ModelFamily, grid: ParamGrid) -> Self {
        Self { name, family, grid }
    }
}

/// The fixed, ordered catalog for a problem type.
///
/// Order matters: the selector keeps the earliest candidate on exact ties.
pub fn catalog_for(problem_type: ProblemType) -> Vec<CatalogEntry> {
    use ParamValue::{Float, Int, Text};

    match problem_type {
        ProblemType::Classification => vec![
            CatalogEntry::new(
                "LogisticRegression",
                ModelFamily::LogisticRegression,
                ParamGrid::new(vec![("C", vec![Float(0.1), Float(1.0), Float(10.0)])]),
            ),
            CatalogEntry::new(
                "RandomForest",
                ModelFamily::RandomForest,
                ParamGrid::new(vec![("n_estimators", vec![Int(10), Int(50), Int(100)])]),
            ),
            CatalogEntry::new(
                "SVM",
                ModelFamily::Svm,
                ParamGrid::new(vec![
                    ("C", vec![Float(0.1), Float(1.0), Float(10.0)]),
                    ("kernel", vec![Text("linear"), Text("rbf")]),
                ]),
            ),
        ],
        ProblemType::Regression => vec![
            CatalogEntry::new(
                "LinearRegression",
                ModelFamily::LinearRegression,
                ParamGrid::empty(),
            ),
            CatalogEntry::new(
                "RandomForest",
                ModelFamily::RandomForest,
                ParamGrid::new(vec![("n_estimators", vec![Int(10), Int(50), Int(100)])]),
            ),
            CatalogEntry::new(
                "SVM",
                ModelFamily::Svm,
                ParamGrid::new(vec![
                    ("C", vec![Float(0.1), Float(1.0), Float(10.0)]),
                    ("kernel", vec![Text("linear"), Text("rbf")]),
                ]),
            ),
        ],
    }
}
