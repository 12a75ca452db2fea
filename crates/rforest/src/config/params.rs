//! Nested parameter groups for forest configuration.
//!
//! - [`TreeParams`]: shape of each tree (depth, split threshold, feature draws)
//! - [`BootstrapPolicy`]: how each tree's training subsample is drawn

// =============================================================================
// TreeParams
// =============================================================================

/// Tree structure parameters, shared by every tree of a forest.
///
/// # Example
///
/// ```
/// use rforest::config::TreeParams;
///
/// let params = TreeParams::with_depth(6).with_min_samples_split(4);
/// assert_eq!(params.max_depth, 6);
/// assert_eq!(params.resolved_max_features(100), 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeParams {
    /// Maximum depth; a tree has `2^max_depth` node slots. Default: 10.
    pub max_depth: u32,
    /// A child partition of this size or less becomes a leaf. Default: 2.
    pub min_samples_split: usize,
    /// Candidate features drawn per node. `None` uses `round(sqrt(features_count))`.
    pub max_features: Option<usize>,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: 10,
            min_samples_split: 2,
            max_features: None,
        }
    }
}

impl TreeParams {
    /// Default parameters with the given depth.
    pub fn with_depth(max_depth: u32) -> Self {
        Self {
            max_depth,
            ..Default::default()
        }
    }

    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split;
        self
    }

    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = Some(max_features);
        self
    }

    /// Candidate features per node for a data set with `features_count` features.
    ///
    /// Never less than 1.
    pub fn resolved_max_features(&self, features_count: usize) -> usize {
        self.max_features
            .unwrap_or_else(|| (features_count as f64).sqrt().round() as usize)
            .max(1)
    }
}

// =============================================================================
// BootstrapPolicy
// =============================================================================

/// How each tree's training subsample is drawn from the sample store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BootstrapPolicy {
    /// Distinct indices; duplicates are redrawn.
    #[default]
    WithoutReplacement,
    /// Classic bootstrap; an index may be drawn more than once.
    WithReplacement,
}
