//! Random forest trainer.
//!
//! Builds `tree_count` trees, each on its own subsample of the sample store,
//! either on the calling thread or with one [`WorkerPool`](crate::pool::WorkerPool)
//! job per tree.

use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use super::grower::{GrowerParams, TreeGrower};
use super::sampling::{bootstrap_indices, tree_rng};
use crate::config::{BootstrapPolicy, ForestConfig};
use crate::data::Sample;
use crate::pool::{PoolError, with_pool};
use crate::repr::{DecisionTree, Forest};
use crate::utils::{Interrupt, Parallelism};

/// Errors raised while training a forest.
#[derive(Debug, thiserror::Error)]
pub enum TrainError {
    #[error("cannot train on an empty sample set")]
    EmptyData,

    #[error(
        "one_sample_size {sample_size} exceeds the {available} available samples \
         (sampling without replacement)"
    )]
    SampleSizeExceedsData { sample_size: usize, available: usize },

    #[error(transparent)]
    Pool(#[from] PoolError),
}

/// Result of a training run.
#[derive(Debug, Clone)]
pub struct TrainOutcome {
    /// Trees built so far, ordered by tree id.
    pub forest: Forest,
    /// `true` when an interrupt stopped the build before `tree_count` trees.
    pub interrupted: bool,
}

/// Trains a [`Forest`] from a validated [`ForestConfig`].
#[derive(Debug, Clone)]
pub struct RandomForestTrainer {
    config: ForestConfig,
}

impl RandomForestTrainer {
    pub fn new(config: ForestConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    fn grower_params(&self) -> GrowerParams {
        GrowerParams {
            features_count: self.config.features_count,
            max_features: self.config.max_features(),
            max_depth: self.config.max_depth(),
            min_samples_split: self.config.tree.min_samples_split,
        }
    }

    /// Build tree `tree_id` on its own subsample.
    ///
    /// Deterministic for a given `(seed, tree_id)`.
    pub fn build_tree(&self, samples: &[Sample], tree_id: usize) -> DecisionTree {
        let start = Instant::now();
        let mut rng = tree_rng(self.config.seed, tree_id);
        let partition = bootstrap_indices(
            &mut rng,
            samples.len(),
            self.config.one_sample_size,
            self.config.bootstrap,
        );

        let tree = TreeGrower::new(samples, self.grower_params(), rng)
            .grow(partition)
            .with_id(tree_id);
        debug_assert_eq!(tree.validate(Some(self.config.features_count)), Ok(()));

        let stats = tree.stats();
        tracing::debug!(
            tree_id,
            n_internal = stats.n_internal,
            n_leaves = stats.n_leaves,
            depth = stats.depth,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "built tree"
        );
        tree
    }

    /// Build the forest.
    ///
    /// If `interrupt` is requested, no further trees are started and the
    /// trees finished so far are returned with `interrupted` set.
    pub fn train(
        &self,
        samples: &[Sample],
        interrupt: &Interrupt,
    ) -> Result<TrainOutcome, TrainError> {
        if samples.is_empty() {
            return Err(TrainError::EmptyData);
        }
        let sample_size = self.config.one_sample_size;
        if self.config.bootstrap == BootstrapPolicy::WithoutReplacement
            && sample_size > samples.len()
        {
            return Err(TrainError::SampleSizeExceedsData {
                sample_size,
                available: samples.len(),
            });
        }

        let tree_count = self.config.tree_count;
        let start = Instant::now();
        tracing::info!(
            tree_count,
            n_samples = samples.len(),
            sample_size,
            max_depth = self.config.max_depth(),
            max_features = self.config.max_features(),
            threads = self.config.parallelism.n_threads(),
            "building forest"
        );

        let trees = match self.config.parallelism {
            Parallelism::Sequential => {
                let mut trees = Vec::with_capacity(tree_count);
                for tree_id in 0..tree_count {
                    if interrupt.is_requested() {
                        break;
                    }
                    trees.push(self.build_tree(samples, tree_id));
                }
                trees
            }
            Parallelism::Parallel(n_workers) => {
                let trees = Mutex::new(Vec::with_capacity(tree_count));
                with_pool(n_workers, |pool| -> Result<(), PoolError> {
                    for tree_id in 0..tree_count {
                        if interrupt.is_requested() {
                            break;
                        }
                        let trees = &trees;
                        pool.add_job(move || {
                            let tree = self.build_tree(samples, tree_id);
                            trees
                                .lock()
                                .unwrap_or_else(PoisonError::into_inner)
                                .push(tree);
                        })?;
                    }
                    Ok(())
                })??;
                trees.into_inner().unwrap_or_else(PoisonError::into_inner)
            }
        };

        let mut forest = Forest::new(self.config.max_depth());
        for tree in trees {
            forest.push_tree(tree);
        }
        forest.sort_by_id();

        let interrupted = forest.n_trees() < tree_count;
        if interrupted {
            tracing::warn!(
                built = forest.n_trees(),
                tree_count,
                "forest build interrupted"
            );
        }
        tracing::info!(
            n_trees = forest.n_trees(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "forest built"
        );

        Ok(TrainOutcome {
            forest,
            interrupted,
        })
    }
}
