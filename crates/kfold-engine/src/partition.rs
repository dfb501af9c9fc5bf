//! K-fold partitioning of sample indices.
//!
//! Indices are optionally permuted with a seeded `ChaCha8Rng`, then cut into
//! `n_splits` contiguous blocks. When `n_samples % n_splits != 0` the first
//! `n_samples % n_splits` folds hold one extra validation sample, so 7 samples
//! over 3 folds give validation sizes 3, 2, 2.

use kfold_types::{EvalError, EvalResult, FoldSplit};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// K-fold partitioning policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KFold {
    n_splits: usize,
    shuffle: bool,
    seed: u64,
}

impl KFold {
    pub fn new(n_splits: usize) -> Self {
        Self {
            n_splits,
            shuffle: false,
            seed: 0,
        }
    }

    pub fn shuffled(mut self, seed: u64) -> Self {
        self.shuffle = true;
        self.seed = seed;
        self
    }

    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    /// Lazily yield one [`FoldSplit`] per fold, in fold order.
    pub fn split(&self, n_samples: usize) -> EvalResult<Folds> {
        if self.n_splits < 2 {
            return Err(EvalError::invalid(
                "n_splits",
                format!("must be at least 2, got {}", self.n_splits),
            ));
        }
        if self.n_splits > n_samples {
            return Err(EvalError::invalid(
                "n_splits",
                format!(
                    "cannot exceed n_samples ({} > {n_samples})",
                    self.n_splits
                ),
            ));
        }

        let mut order: Vec<usize> = (0..n_samples).collect();
        if self.shuffle {
            let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
            order.shuffle(&mut rng);
        }

        Ok(Folds {
            order,
            n_splits: self.n_splits,
            next_fold: 0,
            next_start: 0,
        })
    }
}

/// Number of validation samples held out by `fold`.
pub fn fold_size(n_samples: usize, n_splits: usize, fold: usize) -> usize {
    let base = n_samples / n_splits;
    if fold < n_samples % n_splits {
        base + 1
    } else {
        base
    }
}

/// Iterator over the folds of one partition.
#[derive(Debug, Clone)]
pub struct Folds {
    order: Vec<usize>,
    n_splits: usize,
    next_fold: usize,
    next_start: usize,
}

impl Iterator for Folds {
    type Item = FoldSplit;

    fn next(&mut self) -> Option<FoldSplit> {
        if self.next_fold >= self.n_splits {
            return None;
        }

        let n_samples = self.order.len();
        let fold = self.next_fold;
        let end = self.next_start + fold_size(n_samples, self.n_splits, fold);
        let validation = self.order[self.next_start..end].to_vec();

        let mut held_out = vec![false; n_samples];
        for &index in &validation {
            held_out[index] = true;
        }
        let train = (0..n_samples).filter(|&i| !held_out[i]).collect();

        self.next_fold += 1;
        self.next_start = end;

        Some(FoldSplit {
            fold,
            train,
            validation,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.n_splits - self.next_fold;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Folds {}

/// Partition `0..n_samples` into `n_splits` train/validation pairs.
pub fn partition(
    n_samples: usize,
    n_splits: usize,
    shuffle: bool,
    seed: u64,
) -> EvalResult<Vec<FoldSplit>> {
    let kfold = if shuffle {
        KFold::new(n_splits).shuffled(seed)
    } else {
        KFold::new(n_splits)
    };
    Ok(kfold.split(n_samples)?.collect())
}
