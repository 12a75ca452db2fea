//! Canonical forest representation (ordered collection of trees).

use super::tree::{DecisionTree, TreeValidationError};

/// Structural validation errors for [`Forest`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ForestValidationError {
    #[error("tree {tree_idx} has max_depth {actual}, forest expects {expected}")]
    DepthMismatch {
        tree_idx: usize,
        expected: u32,
        actual: u32,
    },

    #[error("tree {tree_idx} is invalid: {error}")]
    InvalidTree {
        tree_idx: usize,
        #[source]
        error: TreeValidationError,
    },
}

/// Random forest of binary decision trees sharing one `max_depth`.
#[derive(Debug, Clone, PartialEq)]
pub struct Forest {
    trees: Vec<DecisionTree>,
    max_depth: u32,
}

impl Forest {
    /// Create an empty forest.
    pub fn new(max_depth: u32) -> Self {
        Self {
            trees: Vec::new(),
            max_depth,
        }
    }

    /// Create a forest from trees, checking that every depth matches.
    pub fn from_trees(
        trees: Vec<DecisionTree>,
        max_depth: u32,
    ) -> Result<Self, ForestValidationError> {
        if let Some((tree_idx, tree)) = trees
            .iter()
            .enumerate()
            .find(|(_, t)| t.max_depth() != max_depth)
        {
            return Err(ForestValidationError::DepthMismatch {
                tree_idx,
                expected: max_depth,
                actual: tree.max_depth(),
            });
        }
        Ok(Self { trees, max_depth })
    }

    /// Add a tree to the forest.
    pub fn push_tree(&mut self, tree: DecisionTree) {
        assert_eq!(
            tree.max_depth(),
            self.max_depth,
            "tree depth does not match forest"
        );
        self.trees.push(tree);
    }

    /// Number of trees.
    #[inline]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    #[inline]
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Get a reference to a specific tree.
    #[inline]
    pub fn tree(&self, idx: usize) -> &DecisionTree {
        &self.trees[idx]
    }

    /// Iterate over trees in order.
    #[inline]
    pub fn trees(&self) -> impl ExactSizeIterator<Item = &DecisionTree> {
        self.trees.iter()
    }

    /// Order trees by id; trees without an id keep their place at the end.
    pub fn sort_by_id(&mut self) {
        self.trees.sort_by_key(|tree| tree.id().unwrap_or(usize::MAX));
    }

    /// Validate every tree.
    pub fn validate(&self, features_count: Option<usize>) -> Result<(), ForestValidationError> {
        for (tree_idx, tree) in self.trees.iter().enumerate() {
            if tree.max_depth() != self.max_depth {
                return Err(ForestValidationError::DepthMismatch {
                    tree_idx,
                    expected: self.max_depth,
                    actual: tree.max_depth(),
                });
            }
            tree.validate(features_count)
                .map_err(|error| ForestValidationError::InvalidTree { tree_idx, error })?;
        }
        Ok(())
    }
}
