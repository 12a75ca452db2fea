//! Forest scoring.
//!
//! Every tree votes once for every sample. In parallel mode each
//! `(tree, sample)` pair is its own worker-pool job.

use std::time::Instant;

use super::votes::VoteTable;
use crate::data::Sample;
use crate::pool::{PoolError, with_pool};
use crate::repr::Forest;
use crate::utils::{Interrupt, Parallelism};

/// Errors raised while scoring.
#[derive(Debug, thiserror::Error)]
pub enum TestError {
    #[error("{defects} predictions did not reach a leaf; the forest is malformed")]
    MalformedForest { defects: usize },

    #[error(transparent)]
    Pool(#[from] PoolError),
}

/// Result of scoring a sample set.
#[derive(Debug)]
pub struct TestOutcome {
    pub votes: VoteTable,
    /// `true` when an interrupt stopped submission early; votes are partial.
    pub interrupted: bool,
}

/// Scores samples against a borrowed forest.
#[derive(Debug, Clone, Copy)]
pub struct Predictor<'f> {
    forest: &'f Forest,
    parallelism: Parallelism,
}

impl<'f> Predictor<'f> {
    pub fn new(forest: &'f Forest, parallelism: Parallelism) -> Self {
        Self {
            forest,
            parallelism,
        }
    }

    /// Collect every tree's vote for every sample.
    ///
    /// # Errors
    ///
    /// [`TestError::MalformedForest`] when any prediction failed to reach a
    /// leaf.
    pub fn score(
        &self,
        samples: &[Sample],
        interrupt: &Interrupt,
    ) -> Result<TestOutcome, TestError> {
        let start = Instant::now();
        let votes = VoteTable::new(samples.len());
        tracing::info!(
            n_trees = self.forest.n_trees(),
            n_samples = samples.len(),
            threads = self.parallelism.n_threads(),
            "scoring samples"
        );

        let mut interrupted = false;
        match self.parallelism {
            Parallelism::Sequential => {
                'trees: for tree in self.forest.trees() {
                    for (idx, sample) in samples.iter().enumerate() {
                        if interrupt.is_requested() {
                            interrupted = true;
                            break 'trees;
                        }
                        votes.record(idx, tree.predict(sample));
                    }
                }
            }
            Parallelism::Parallel(n_workers) => {
                interrupted = with_pool(n_workers, |pool| -> Result<bool, PoolError> {
                    for tree in self.forest.trees() {
                        for (idx, sample) in samples.iter().enumerate() {
                            if interrupt.is_requested() {
                                return Ok(true);
                            }
                            let votes = &votes;
                            pool.add_job(move || votes.record(idx, tree.predict(sample)))?;
                        }
                    }
                    Ok(false)
                })??;
            }
        }

        let defects = votes.defects();
        if defects > 0 {
            tracing::error!(defects, "predictions failed to reach a leaf");
            return Err(TestError::MalformedForest { defects });
        }
        if interrupted {
            tracing::warn!("scoring interrupted; votes are partial");
        }
        tracing::info!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            "scoring finished"
        );

        Ok(TestOutcome { votes, interrupted })
    }
}
