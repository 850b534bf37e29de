//! Train/test partitioning: seeded holdout split and k-fold splitter

use crate::error::{AutoMlError, Result};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// A single train/test index partition
#[derive(Debug, Clone)]
pub struct CvSplit {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
}

/// One shuffled holdout split shared by every candidate in a training run.
///
/// The shuffle is seeded so the same row partition is used for all
/// candidates, which keeps their scores comparable.
pub fn holdout_split(n_samples: usize, test_fraction: f64, seed: u64) -> Result<CvSplit> {
    if n_samples < 2 {
        return Err(AutoMlError::InvalidDataset(format!(
            "holdout split needs at least 2 samples, got {}",
            n_samples
        )));
    }
    if test_fraction <= 0.0 || test_fraction >= 1.0 {
        return Err(AutoMlError::InvalidDataset(format!(
            "test fraction must be in (0, 1), got {}",
            test_fraction
        )));
    }

    let test_size = ((n_samples as f64 * test_fraction) as usize).max(1);
    let train_size = n_samples - test_size;
    if train_size == 0 {
        return Err(AutoMlError::InvalidDataset(
            "holdout split left no training rows".to_string(),
        ));
    }

    let mut indices: Vec<usize> = (0..n_samples).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    Ok(CvSplit {
        train_indices: indices[..train_size].to_vec(),
        test_indices: indices[train_size..].to_vec(),
    })
}

/// Contiguous k-fold splits without shuffling, used by the grid search.
///
/// Fold sizes differ by at most one; every index appears in exactly one
/// test fold.
pub fn k_fold_split(n_samples: usize, n_splits: usize) -> Result<Vec<CvSplit>> {
    if n_splits < 2 {
        return Err(AutoMlError::InvalidDataset(
            "k-fold requires at least 2 splits".to_string(),
        ));
    }
    if n_samples < n_splits {
        return Err(AutoMlError::InvalidDataset(format!(
            "k-fold requires n_samples ({}) >= n_splits ({})",
            n_samples, n_splits
        )));
    }

    let base = n_samples / n_splits;
    let remainder = n_samples % n_splits;

    let mut splits = Vec::with_capacity(n_splits);
    let mut current = 0;
    for fold_idx in 0..n_splits {
        let fold_size = if fold_idx < remainder { base + 1 } else { base };
        let test_indices: Vec<usize> = (current..current + fold_size).collect();
        let train_indices: Vec<usize> = (0..current)
            .chain(current + fold_size..n_samples)
            .collect();
        splits.push(CvSplit {
            train_indices,
            test_indices,
        });
        current += fold_size;
    }

    Ok(splits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_holdout_sizes() {
        let split = holdout_split(10, 0.2, 42).unwrap();
        assert_eq!(split.test_indices.len(), 2);
        assert_eq!(split.train_indices.len(), 8);
    }

    #[test]
    fn test_holdout_min_one_test_row() {
        let split = holdout_split(2, 0.2, 42).unwrap();
        assert_eq!(split.test_indices.len(), 1);
        assert_eq!(split.train_indices.len(), 1);
    }

    #[test]
    fn test_holdout_deterministic() {
        let a = holdout_split(50, 0.2, 7).unwrap();
        let b = holdout_split(50, 0.2, 7).unwrap();
        assert_eq!(a.train_indices, b.train_indices);
        assert_eq!(a.test_indices, b.test_indices);
    }

    #[test]
    fn test_holdout_covers_all_indices() {
        let split = holdout_split(25, 0.2, 42).unwrap();
        let mut all: Vec<usize> = split
            .train_indices
            .iter()
            .chain(split.test_indices.iter())
            .copied()
            .collect();
        all.sort();
        assert_eq!(all, (0..25).collect::<Vec<_>>());
    }

    #[test]
    fn test_k_fold_partition() {
        let splits = k_fold_split(10, 3).unwrap();
        assert_eq!(splits.len(), 3);

        let mut all_test: Vec<usize> = splits
            .iter()
            .flat_map(|s| s.test_indices.clone())
            .collect();
        all_test.sort();
        assert_eq!(all_test, (0..10).collect::<Vec<_>>());

        // Fold sizes differ by at most one
        for split in &splits {
            assert!(split.test_indices.len() == 3 || split.test_indices.len() == 4);
            assert_eq!(split.train_indices.len() + split.test_indices.len(), 10);
        }
    }

    #[test]
    fn test_k_fold_too_few_samples() {
        assert!(k_fold_split(2, 3).is_err());
    }
}
