//! CART decision tree, the base learner for the random forest

use crate::error::{AutoMlError, Result};
use ndarray::{Array1, Array2};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Decision tree node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    /// Leaf with a prediction value (class for classification, mean for regression)
    Leaf { value: f64 },
    /// Internal binary split on one feature
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

/// CART tree with Gini impurity (classification) or variance (regression).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    root: Option<TreeNode>,
    /// Maximum depth; `None` grows until pure or too small
    pub max_depth: Option<usize>,
    /// Minimum samples required to attempt a split
    pub min_samples_split: usize,
    /// Minimum samples on each side of a split
    pub min_samples_leaf: usize,
    /// Features drawn at random per split; `None` considers all
    pub max_features: Option<usize>,
    /// Seed for the per-split feature draws in standalone use
    pub random_state: Option<u64>,
    is_classification: bool,
}

impl DecisionTree {
    pub fn new_classifier() -> Self {
        Self {
            root: None,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            random_state: None,
            is_classification: true,
        }
    }

    pub fn new_regressor() -> Self {
        Self {
            root: None,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            random_state: None,
            is_classification: false,
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = Some(max_features);
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Fit the tree to training data
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.random_state.unwrap_or(0));
        self.fit_with_rng(x, y, &mut rng)
    }

    /// Fit using a caller-supplied RNG (the forest drives per-tree seeds)
    pub(crate) fn fit_with_rng(
        &mut self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        rng: &mut ChaCha8Rng,
    ) -> Result<()> {
        let n_samples = x.nrows();
        if n_samples != y.len() {
            return Err(AutoMlError::ShapeMismatch {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(AutoMlError::InvalidDataset(
                "cannot fit a tree on zero samples".to_string(),
            ));
        }

        let indices: Vec<usize> = (0..n_samples).collect();
        self.root = Some(self.build_node(x, y, &indices, 0, rng));
        Ok(())
    }

    fn build_node(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        depth: usize,
        rng: &mut ChaCha8Rng,
    ) -> TreeNode {
        let y_subset: Vec<f64> = indices.iter().map(|&i| y[i]).collect();

        let should_stop = indices.len() < self.min_samples_split
            || self.max_depth.map_or(false, |d| depth >= d)
            || is_pure(&y_subset);
        if should_stop {
            return TreeNode::Leaf {
                value: self.leaf_value(&y_subset),
            };
        }

        match self.find_best_split(x, y, indices, rng) {
            Some((feature_idx, threshold)) => {
                let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
                    .iter()
                    .partition(|&&i| x[[i, feature_idx]] <= threshold);

                if left_indices.len() < self.min_samples_leaf
                    || right_indices.len() < self.min_samples_leaf
                {
                    return TreeNode::Leaf {
                        value: self.leaf_value(&y_subset),
                    };
                }

                let left = Box::new(self.build_node(x, y, &left_indices, depth + 1, rng));
                let right = Box::new(self.build_node(x, y, &right_indices, depth + 1, rng));
                TreeNode::Split {
                    feature_idx,
                    threshold,
                    left,
                    right,
                }
            }
            None => TreeNode::Leaf {
                value: self.leaf_value(&y_subset),
            },
        }
    }

    /// Best (feature, threshold) by impurity gain over a random feature
    /// subset, or `None` when no split improves on the parent.
    fn find_best_split(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        rng: &mut ChaCha8Rng,
    ) -> Option<(usize, f64)> {
        let n_features = x.ncols();
        let n_try = self.max_features.unwrap_or(n_features).clamp(1, n_features);

        let candidate_features: Vec<usize> = if n_try < n_features {
            // Partial Fisher-Yates draw of n_try distinct features
            let mut pool: Vec<usize> = (0..n_features).collect();
            for i in 0..n_try {
                let j = rng.gen_range(i..n_features);
                pool.swap(i, j);
            }
            pool.truncate(n_try);
            pool
        } else {
            (0..n_features).collect()
        };

        let y_subset: Vec<f64> = indices.iter().map(|&i| y[i]).collect();
        let parent_impurity = self.impurity(&y_subset);
        let n = indices.len() as f64;

        let mut best: Option<(usize, f64)> = None;
        let mut best_gain = 0.0f64;

        for &feature_idx in &candidate_features {
            let mut values: Vec<f64> = indices.iter().map(|&i| x[[i, feature_idx]]).collect();
            values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            values.dedup();

            for window in values.windows(2) {
                let threshold = (window[0] + window[1]) / 2.0;

                let mut left = SplitStats::default();
                let mut right = SplitStats::default();
                for &idx in indices {
                    let yi = y[idx];
                    if x[[idx, feature_idx]] <= threshold {
                        left.push(yi);
                    } else {
                        right.push(yi);
                    }
                }

                if left.count < self.min_samples_leaf || right.count < self.min_samples_leaf {
                    continue;
                }

                let weighted = (left.count as f64 * self.impurity_from_stats(&left)
                    + right.count as f64 * self.impurity_from_stats(&right))
                    / n;
                let gain = parent_impurity - weighted;
                if gain > best_gain {
                    best_gain = gain;
                    best = Some((feature_idx, threshold));
                }
            }
        }

        best
    }

    fn impurity_from_stats(&self, stats: &SplitStats) -> f64 {
        if stats.count == 0 {
            return 0.0;
        }
        let n = stats.count as f64;
        if self.is_classification {
            // Gini
            let mut gini = 1.0;
            for &c in stats.class_counts.values() {
                let p = c as f64 / n;
                gini -= p * p;
            }
            gini
        } else {
            // Variance: E[y^2] - E[y]^2
            stats.sq_sum / n - (stats.sum / n).powi(2)
        }
    }

    fn impurity(&self, y: &[f64]) -> f64 {
        let mut stats = SplitStats::default();
        for &v in y {
            stats.push(v);
        }
        self.impurity_from_stats(&stats)
    }

    fn leaf_value(&self, y: &[f64]) -> f64 {
        if y.is_empty() {
            return 0.0;
        }
        if self.is_classification {
            let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
            for &v in y {
                *counts.entry(v.round() as i64).or_insert(0) += 1;
            }
            counts
                .into_iter()
                .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
                .map(|(class, _)| class as f64)
                .unwrap_or(0.0)
        } else {
            y.iter().sum::<f64>() / y.len() as f64
        }
    }

    /// Make predictions
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let root = self.root.as_ref().ok_or(AutoMlError::ModelNotFitted)?;

        let predictions: Vec<f64> = (0..x.nrows())
            .map(|i| {
                let mut node = root;
                loop {
                    match node {
                        TreeNode::Leaf { value } => break *value,
                        TreeNode::Split {
                            feature_idx,
                            threshold,
                            left,
                            right,
                        } => {
                            node = if x[[i, *feature_idx]] <= *threshold {
                                left
                            } else {
                                right
                            };
                        }
                    }
                }
            })
            .collect();

        Ok(Array1::from_vec(predictions))
    }

    /// Depth of the fitted tree (0 when unfitted)
    pub fn depth(&self) -> usize {
        fn node_depth(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 1,
                TreeNode::Split { left, right, .. } => 1 + node_depth(left).max(node_depth(right)),
            }
        }
        self.root.as_ref().map_or(0, node_depth)
    }
}

/// Incremental statistics for one side of a candidate split.
/// Class counts use a BTreeMap so impurity sums accumulate in a fixed
/// order and split choices stay reproducible.
#[derive(Default)]
struct SplitStats {
    count: usize,
    sum: f64,
    sq_sum: f64,
    class_counts: BTreeMap<i64, usize>,
}

impl SplitStats {
    fn push(&mut self, yi: f64) {
        self.count += 1;
        self.sum += yi;
        self.sq_sum += yi * yi;
        *self.class_counts.entry(yi.round() as i64).or_insert(0) += 1;
    }
}

fn is_pure(y: &[f64]) -> bool {
    match y.first() {
        None => true,
        Some(&first) => y.iter().all(|&v| (v - first).abs() < 1e-10),
    }
}
