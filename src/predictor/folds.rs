//! Seeded k-fold partitioning
//!
//! Shuffles indices with a seeded ChaCha stream so fold membership is
//! reproducible for a given batch, then deals them into k folds of
//! near-equal size. Every index lands in exactly one held-out fold.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub struct KFold {
    n_splits: usize,
    seed: u64,
}

impl KFold {
    /// `n_splits` must be at least 2.
    pub fn new(n_splits: usize, seed: u64) -> Self {
        assert!(n_splits >= 2, "k-fold needs at least 2 splits");
        Self { n_splits, seed }
    }

    /// Partition `indices` into (train, held_out) pairs, one per fold.
    pub fn split(&self, indices: &[usize]) -> Vec<(Vec<usize>, Vec<usize>)> {
        let mut shuffled = indices.to_vec();
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        shuffled.shuffle(&mut rng);

        // First `remainder` folds take one extra element.
        let base = shuffled.len() / self.n_splits;
        let remainder = shuffled.len() % self.n_splits;

        let mut folds = Vec::with_capacity(self.n_splits);
        let mut offset = 0;
        for fold in 0..self.n_splits {
            let size = base + usize::from(fold < remainder);
            folds.push(shuffled[offset..offset + size].to_vec());
            offset += size;
        }

        folds
            .iter()
            .enumerate()
            .map(|(held_idx, held)| {
                let train: Vec<usize> = folds
                    .iter()
                    .enumerate()
                    .filter(|(other_idx, _)| *other_idx != held_idx)
                    .flat_map(|(_, fold)| fold.iter().copied())
                    .collect();
                (train, held.clone())
            })
            .collect()
    }
}
