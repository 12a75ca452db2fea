//! rforest: a random forest for sparse binary classification.
//!
//! Trees are stored as fixed-size heap-indexed node arrays, grown with a
//! Gini split search over randomly drawn candidate features, and built and
//! scored either sequentially or on a fixed-size worker pool.
//!
//! # Key Types
//!
//! - [`Sample`] - Sparse labeled feature vector (absent feature = 0.0)
//! - [`ForestConfig`] - Validated configuration builder
//! - [`RandomForestTrainer`] - Builds a [`Forest`] from samples
//! - [`Predictor`] - Collects per-sample votes from a forest
//!
//! # Example
//!
//! ```
//! use rforest::{ForestConfig, Interrupt, Predictor, RandomForestTrainer, TreeParams};
//! use rforest::testing::synthetic_samples;
//!
//! let samples = synthetic_samples(200, 8, 1);
//! let config = ForestConfig::builder()
//!     .features_count(8)
//!     .tree_count(10)
//!     .one_sample_size(100)
//!     .tree(TreeParams::with_depth(6))
//!     .build()
//!     .unwrap();
//!
//! let interrupt = Interrupt::new();
//! let forest = RandomForestTrainer::new(config)
//!     .train(&samples, &interrupt)
//!     .unwrap()
//!     .forest;
//! let outcome = Predictor::new(&forest, Default::default())
//!     .score(&samples, &interrupt)
//!     .unwrap();
//! assert_eq!(outcome.votes.len(), 200);
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod inference;
pub mod persist;
pub mod pool;
pub mod repr;
pub mod report;
pub mod testing;
pub mod training;
pub mod utils;

// =============================================================================
// Convenience Re-exports
// =============================================================================

pub use config::{BootstrapPolicy, ConfigError, ForestConfig, TreeParams};
pub use data::{DataError, Label, Sample, SampleAccessor, read_samples};
pub use error::{Error, Result};
pub use inference::{Predictor, TestError, TestOutcome, VoteTable, Votes};
pub use persist::{ReadError, WriteError, load_forest, save_forest};
pub use repr::{DecisionTree, Forest, TreeNode};
pub use training::{RandomForestTrainer, TrainError, TrainOutcome};
pub use utils::{Interrupt, Parallelism};
