//! Random forest configuration with builder pattern.
//!
//! [`ForestConfig`] groups everything needed to build a forest and uses the
//! `bon` crate for builder generation with validation.
//!
//! # Example
//!
//! ```
//! use rforest::config::{ForestConfig, TreeParams};
//! use rforest::Parallelism;
//!
//! let config = ForestConfig::builder()
//!     .features_count(1000)
//!     .tree_count(50)
//!     .one_sample_size(500)
//!     .tree(TreeParams::with_depth(8))
//!     .parallelism(Parallelism::Parallel(4))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.max_features(), 32);
//! ```

use bon::Builder;

use super::{BootstrapPolicy, TreeParams};
use crate::utils::Parallelism;

/// Largest supported `max_depth`.
///
/// A tree allocates `2^max_depth` node slots up front, so depth 20 already
/// costs 16 MiB per tree in memory and 13 MiB per tree on disk.
pub const MAX_SUPPORTED_DEPTH: u32 = 20;

// =============================================================================
// ConfigError
// =============================================================================

/// Errors that can occur during configuration validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("features_count must be at least 1")]
    ZeroFeatures,

    #[error("features_count {0} exceeds the model format limit of {max}", max = i32::MAX)]
    FeaturesCountTooLarge(usize),

    #[error("max_features must be in [1, {features_count}], got {max_features}")]
    MaxFeaturesOutOfRange {
        max_features: usize,
        features_count: usize,
    },

    #[error("max_depth must be in [1, {max}], got {0}", max = MAX_SUPPORTED_DEPTH)]
    InvalidMaxDepth(u32),

    #[error("tree_count must be at least 1")]
    ZeroTrees,

    #[error("one_sample_size must be at least 1")]
    ZeroSampleSize,

    #[error("parallel execution needs at least one worker")]
    ZeroWorkers,
}

// =============================================================================
// ForestConfig
// =============================================================================

/// Configuration for random forest training and scoring.
#[derive(Debug, Clone, Builder)]
#[builder(
    derive(Clone, Debug),
    finish_fn(vis = "", name = __build_internal)
)]
pub struct ForestConfig {
    /// Feature indices considered for splits are `[0, features_count)`.
    pub features_count: usize,

    /// Number of trees. Default: 100.
    #[builder(default = 100)]
    pub tree_count: usize,

    /// Samples drawn for each tree. Default: 1000.
    #[builder(default = 1000)]
    pub one_sample_size: usize,

    /// Tree structure parameters.
    #[builder(default)]
    pub tree: TreeParams,

    /// Per-tree subsample policy. Default: without replacement.
    #[builder(default)]
    pub bootstrap: BootstrapPolicy,

    /// Sequential or worker-pool execution. Default: sequential.
    #[builder(default)]
    pub parallelism: Parallelism,

    /// Random seed. Default: 42.
    #[builder(default = 42)]
    pub seed: u64,
}

/// Custom finishing function that validates the config.
impl<S: forest_config_builder::IsComplete> ForestConfigBuilder<S> {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any parameter is out of range.
    pub fn build(self) -> Result<ForestConfig, ConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl ForestConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.features_count == 0 {
            return Err(ConfigError::ZeroFeatures);
        }
        if self.features_count > i32::MAX as usize {
            return Err(ConfigError::FeaturesCountTooLarge(self.features_count));
        }

        if let Some(max_features) = self.tree.max_features {
            if max_features == 0 || max_features > self.features_count {
                return Err(ConfigError::MaxFeaturesOutOfRange {
                    max_features,
                    features_count: self.features_count,
                });
            }
        }

        let max_depth = self.tree.max_depth;
        if max_depth == 0 || max_depth > MAX_SUPPORTED_DEPTH {
            return Err(ConfigError::InvalidMaxDepth(max_depth));
        }

        if self.tree_count == 0 {
            return Err(ConfigError::ZeroTrees);
        }
        if self.one_sample_size == 0 {
            return Err(ConfigError::ZeroSampleSize);
        }
        if self.parallelism == Parallelism::Parallel(0) {
            return Err(ConfigError::ZeroWorkers);
        }

        Ok(())
    }

    /// Candidate features drawn per node, resolved against `features_count`.
    #[inline]
    pub fn max_features(&self) -> usize {
        self.tree
            .resolved_max_features(self.features_count)
            .min(self.features_count)
    }

    #[inline]
    pub fn max_depth(&self) -> u32 {
        self.tree.max_depth
    }
}

// =============================================================================
// Tests
// =============================================================================
