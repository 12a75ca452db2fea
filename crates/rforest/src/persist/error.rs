//! Error types for forest persistence.

use std::path::PathBuf;

use crate::repr::TreeValidationError;

/// Errors that can occur while writing a forest.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("failed to create {}: {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A split feature does not fit the format's signed 32-bit field.
    #[error("tree {tree_idx} node {node}: feature {feature} does not fit in i32")]
    FeatureOverflow {
        tree_idx: usize,
        node: usize,
        feature: u32,
    },
}

/// Errors that can occur while reading a forest.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("max_depth {0} is not supported by the model format")]
    UnsupportedDepth(u32),

    /// The stream ended inside a tree record.
    #[error("tree {tree_idx} truncated: expected {expected} bytes, got {actual}")]
    Truncated {
        tree_idx: usize,
        expected: usize,
        actual: usize,
    },

    #[error("tree {tree_idx} node {node}: invalid tag {tag}")]
    InvalidTag { tree_idx: usize, node: usize, tag: i8 },

    #[error("tree {tree_idx} node {node}: invalid feature index {feature}")]
    InvalidFeature {
        tree_idx: usize,
        node: usize,
        feature: i32,
    },

    #[error("tree {tree_idx} is invalid: {source}")]
    InvalidTree {
        tree_idx: usize,
        #[source]
        source: TreeValidationError,
    },
}

impl ReadError {
    /// Whether the file was read but its contents are not a valid forest.
    ///
    /// `false` for failures to open or read the file itself.
    pub fn is_corrupt(&self) -> bool {
        !matches!(self, Self::Open { .. } | Self::Io(_))
    }
}
