//! Engine configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration shared by the training and inference engines.
///
/// Passed explicitly at construction; the engine holds no global state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Directory where serialized models are stored (created lazily)
    pub model_dir: PathBuf,

    /// Fraction of rows held out for evaluation
    pub test_fraction: f64,

    /// Seed for the holdout shuffle, shared by all candidates in one run
    pub split_seed: u64,

    /// Number of folds for grid-search cross-validation
    pub cv_folds: usize,

    /// Seed for stochastic estimators (forest bootstraps, SMO partner
    /// choice). `None` draws from entropy, trading reproducibility away.
    pub model_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            test_fraction: 0.2,
            split_seed: 42,
            cv_folds: 3,
            model_seed: Some(42),
        }
    }
}

impl EngineConfig {
    /// Create a config with the default split and seeds for a storage directory
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
            ..Default::default()
        }
    }

    /// Set the holdout fraction
    pub fn with_test_fraction(mut self, fraction: f64) -> Self {
        self.test_fraction = fraction;
        self
    }

    /// Set the holdout shuffle seed
    pub fn with_split_seed(mut self, seed: u64) -> Self {
        self.split_seed = seed;
        self
    }

    /// Set the number of cross-validation folds
    pub fn with_cv_folds(mut self, folds: usize) -> Self {
        self.cv_folds = folds;
        self
    }

    /// Set (or clear) the estimator seed
    pub fn with_model_seed(mut self, seed: Option<u64>) -> Self {
        self.model_seed = seed;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.model_dir, PathBuf::from("models"));
        assert_eq!(config.test_fraction, 0.2);
        assert_eq!(config.split_seed, 42);
        assert_eq!(config.cv_folds, 3);
        assert_eq!(config.model_seed, Some(42));
    }

    #[test]
    fn test_builders() {
        let config = EngineConfig::new("/tmp/models")
            .with_test_fraction(0.25)
            .with_cv_folds(5)
            .with_model_seed(None);
        assert_eq!(config.model_dir, PathBuf::from("/tmp/models"));
        assert_eq!(config.test_fraction, 0.25);
        assert_eq!(config.cv_folds, 5);
        assert!(config.model_seed.is_none());
    }
}
