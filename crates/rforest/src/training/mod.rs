//! Forest training.
//!
//! - [`split`]: Gini impurity and best-split search
//! - [`sampling`]: per-tree generators, subsample and feature draws
//! - [`grower`]: recursive induction of one tree
//! - [`trainer`]: builds a whole forest, sequentially or on a worker pool

pub mod grower;
pub mod sampling;
pub mod split;
pub mod trainer;

pub use grower::{GrowerParams, TreeGrower};
pub use sampling::{TreeRng, bootstrap_indices, draw_distinct, tree_rng};
pub use split::{ClassCounts, SplitInfo, find_best_split, gini_impurity};
pub use trainer::{RandomForestTrainer, TrainError, TrainOutcome};
