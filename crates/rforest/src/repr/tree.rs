//! Heap-indexed binary decision tree.
//!
//! This module provides:
//! - [`DecisionTree`]: fixed-size node array, routing and prediction
//! - [`TreeValidationError`]: structural validation errors
//! - [`TreeStats`]: node counts for diagnostics
//!
//! Nodes live in an array of exactly `2^max_depth` slots in implicit
//! binary-heap order. Slot 1 is the root, the children of slot `i` are `2i`
//! (left) and `2i + 1` (right), and slot 0 is never used.

use super::node::{NodeState, TreeNode};
use crate::data::{Label, SampleAccessor};

/// Index of the root node.
pub const ROOT: usize = 1;

/// Number of node slots for a tree of the given depth.
#[inline]
pub fn n_slots(max_depth: u32) -> usize {
    1usize << max_depth
}

#[inline]
pub fn left_child(node: usize) -> usize {
    2 * node
}

#[inline]
pub fn right_child(node: usize) -> usize {
    2 * node + 1
}

// ============================================================================
// TreeValidationError
// ============================================================================

/// Structural validation errors for [`DecisionTree`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TreeValidationError {
    #[error("node array has {len} slots, expected {expected} for max_depth {max_depth}")]
    LengthMismatch {
        len: usize,
        expected: usize,
        max_depth: u32,
    },

    #[error("uninitialized node {node} is reachable from the root")]
    UninitializedReachable { node: usize },

    #[error("internal node {node} has children outside the {n_nodes}-slot array")]
    ChildOutOfBounds { node: usize, n_nodes: usize },

    #[error("node {node} splits on feature {feature}, but only {features_count} features exist")]
    FeatureOutOfRange {
        node: usize,
        feature: u32,
        features_count: usize,
    },

    #[error("node {node} has non-finite threshold {threshold}")]
    NonFiniteThreshold { node: usize, threshold: f64 },
}

// ============================================================================
// DecisionTree
// ============================================================================

/// Binary classification tree over sparse samples.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTree {
    nodes: Box<[TreeNode]>,
    max_depth: u32,
    id: Option<usize>,
}

/// Node counts of a tree, reachable from the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TreeStats {
    pub n_internal: usize,
    pub n_leaves: usize,
    /// Depth of the deepest reachable leaf (root alone = 1).
    pub depth: u32,
}

impl DecisionTree {
    /// Allocate a tree with every slot [`NodeState::Uninitialized`].
    pub fn new_uninitialized(max_depth: u32) -> Self {
        Self {
            nodes: vec![TreeNode::default(); n_slots(max_depth)].into_boxed_slice(),
            max_depth,
            id: None,
        }
    }

    /// Wrap an existing node array. Only the length is checked here;
    /// call [`validate`](Self::validate) for the structural checks.
    pub fn from_nodes(nodes: Vec<TreeNode>, max_depth: u32) -> Result<Self, TreeValidationError> {
        let expected = n_slots(max_depth);
        if nodes.len() != expected {
            return Err(TreeValidationError::LengthMismatch {
                len: nodes.len(),
                expected,
                max_depth,
            });
        }
        Ok(Self {
            nodes: nodes.into_boxed_slice(),
            max_depth,
            id: None,
        })
    }

    /// Attach a diagnostic id (build index or file position).
    pub fn with_id(mut self, id: usize) -> Self {
        self.id = Some(id);
        self
    }

    #[inline]
    pub fn id(&self) -> Option<usize> {
        self.id
    }

    #[inline]
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    #[inline]
    pub fn node(&self, index: usize) -> Option<&TreeNode> {
        self.nodes.get(index)
    }

    /// Write one slot. Each slot is written at most once during induction.
    pub(crate) fn set_node(&mut self, index: usize, node: TreeNode) {
        debug_assert_eq!(
            self.nodes[index].state,
            NodeState::Uninitialized,
            "node {index} written twice"
        );
        self.nodes[index] = node;
    }

    // =========================================================================
    // Prediction
    // =========================================================================

    /// Route `sample` from the root to a leaf and return its class.
    ///
    /// Returns `None` when the walk reaches an uninitialized slot or leaves
    /// the array, which only happens for a malformed tree.
    pub fn predict<S: SampleAccessor + ?Sized>(&self, sample: &S) -> Option<Label> {
        let mut index = ROOT;
        loop {
            let node = self.nodes.get(index)?;
            match node.state {
                NodeState::Leaf(label) => return Some(label),
                NodeState::Uninitialized => return None,
                NodeState::Internal => {
                    index = if sample.feature(node.feature) < node.threshold {
                        left_child(index)
                    } else {
                        right_child(index)
                    };
                }
            }
        }
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Check the structural invariants of every node reachable from the root.
    ///
    /// When `features_count` is given, split features must lie below it.
    pub fn validate(&self, features_count: Option<usize>) -> Result<(), TreeValidationError> {
        let n_nodes = self.n_nodes();
        let expected = n_slots(self.max_depth);
        if n_nodes != expected {
            return Err(TreeValidationError::LengthMismatch {
                len: n_nodes,
                expected,
                max_depth: self.max_depth,
            });
        }

        // Heap order has no cycles, so a plain DFS visits each node once.
        let mut stack = vec![ROOT];
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            match node.state {
                NodeState::Uninitialized => {
                    return Err(TreeValidationError::UninitializedReachable { node: index });
                }
                NodeState::Leaf(_) => {}
                NodeState::Internal => {
                    if right_child(index) >= n_nodes {
                        return Err(TreeValidationError::ChildOutOfBounds {
                            node: index,
                            n_nodes,
                        });
                    }
                    match features_count {
                        Some(features_count) if node.feature as usize >= features_count => {
                            return Err(TreeValidationError::FeatureOutOfRange {
                                node: index,
                                feature: node.feature,
                                features_count,
                            });
                        }
                        _ => {}
                    }
                    if !node.threshold.is_finite() {
                        return Err(TreeValidationError::NonFiniteThreshold {
                            node: index,
                            threshold: node.threshold,
                        });
                    }
                    stack.push(right_child(index));
                    stack.push(left_child(index));
                }
            }
        }

        Ok(())
    }

    /// Count reachable internal nodes and leaves.
    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats::default();
        let mut stack = vec![(ROOT, 1u32)];
        while let Some((index, depth)) = stack.pop() {
            let Some(node) = self.nodes.get(index) else {
                continue;
            };
            match node.state {
                NodeState::Leaf(_) => {
                    stats.n_leaves += 1;
                    stats.depth = stats.depth.max(depth);
                }
                NodeState::Internal => {
                    stats.n_internal += 1;
                    stack.push((left_child(index), depth + 1));
                    stack.push((right_child(index), depth + 1));
                }
                NodeState::Uninitialized => {}
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Depth-2 stump: `f0 < 5` → Zero, else One.
    fn stump() -> DecisionTree {
        let mut tree = DecisionTree::new_uninitialized(2);
        tree.set_node(1, TreeNode::internal(0, 5.0));
        tree.set_node(2, TreeNode::leaf(Label::Zero));
        tree.set_node(3, TreeNode::leaf(Label::One));
        tree
    }

    #[test]
    fn slot_count_is_power_of_two() {
        assert_eq!(DecisionTree::new_uninitialized(1).n_nodes(), 2);
        assert_eq!(DecisionTree::new_uninitialized(10).n_nodes(), 1024);
    }

    #[test]
    fn predict_routes_strictly_less_left() {
        let tree = stump();
        assert_eq!(tree.predict(&[4.999][..]), Some(Label::Zero));
        assert_eq!(tree.predict(&[5.0][..]), Some(Label::One));
        assert_eq!(tree.predict(&[7.0][..]), Some(Label::One));
        // absent feature reads as 0.0
        assert_eq!(tree.predict(&[][..]), Some(Label::Zero));
    }

    #[test]
    fn predict_uninitialized_is_none() {
        let tree = DecisionTree::new_uninitialized(3);
        assert_eq!(tree.predict(&[1.0][..]), None);

        let mut partial = DecisionTree::new_uninitialized(2);
        partial.set_node(1, TreeNode::internal(0, 1.0));
        partial.set_node(2, TreeNode::leaf(Label::One));
        assert_eq!(partial.predict(&[0.0][..]), Some(Label::One));
        assert_eq!(partial.predict(&[2.0][..]), None);
    }

    #[test]
    fn predict_off_array_is_none() {
        let mut tree = DecisionTree::new_uninitialized(1);
        tree.set_node(1, TreeNode::internal(0, 1.0));
        assert_eq!(tree.predict(&[0.0][..]), None);
    }

    #[test]
    fn validate_accepts_well_formed() {
        let tree = stump();
        assert_eq!(tree.validate(Some(1)), Ok(()));
        assert_eq!(tree.validate(None), Ok(()));
    }

    #[test]
    fn validate_rejects_reachable_uninitialized() {
        let mut tree = DecisionTree::new_uninitialized(2);
        tree.set_node(1, TreeNode::internal(0, 1.0));
        tree.set_node(2, TreeNode::leaf(Label::Zero));
        assert_eq!(
            tree.validate(None),
            Err(TreeValidationError::UninitializedReachable { node: 3 })
        );
    }

    #[test]
    fn validate_rejects_children_out_of_bounds() {
        let mut tree = DecisionTree::new_uninitialized(1);
        tree.set_node(1, TreeNode::internal(0, 1.0));
        assert_eq!(
            tree.validate(None),
            Err(TreeValidationError::ChildOutOfBounds { node: 1, n_nodes: 2 })
        );
    }

    #[test]
    fn validate_rejects_feature_out_of_range() {
        let mut tree = DecisionTree::new_uninitialized(2);
        tree.set_node(1, TreeNode::internal(7, 1.0));
        tree.set_node(2, TreeNode::leaf(Label::Zero));
        tree.set_node(3, TreeNode::leaf(Label::One));
        assert!(tree.validate(None).is_ok());
        assert!(matches!(
            tree.validate(Some(7)),
            Err(TreeValidationError::FeatureOutOfRange { feature: 7, .. })
        ));
    }

    #[test]
    fn validate_rejects_nan_threshold() {
        let mut tree = DecisionTree::new_uninitialized(2);
        tree.set_node(1, TreeNode::internal(0, f64::NAN));
        tree.set_node(2, TreeNode::leaf(Label::Zero));
        tree.set_node(3, TreeNode::leaf(Label::One));
        assert!(matches!(
            tree.validate(None),
            Err(TreeValidationError::NonFiniteThreshold { node: 1, .. })
        ));
    }

    #[test]
    fn unreachable_garbage_is_ignored() {
        let mut tree = DecisionTree::new_uninitialized(3);
        tree.set_node(1, TreeNode::leaf(Label::One));
        tree.set_node(6, TreeNode::internal(0, 1.0));
        assert!(tree.validate(None).is_ok());
    }

    #[test]
    fn from_nodes_checks_length() {
        let err = DecisionTree::from_nodes(vec![TreeNode::default(); 3], 2).unwrap_err();
        assert_eq!(
            err,
            TreeValidationError::LengthMismatch {
                len: 3,
                expected: 4,
                max_depth: 2
            }
        );
        let tree = DecisionTree::from_nodes(stump().nodes().to_vec(), 2).unwrap();
        assert_eq!(tree.nodes(), stump().nodes());
    }

    #[test]
    fn stats_count_reachable_nodes() {
        let stats = stump().stats();
        assert_eq!(
            stats,
            TreeStats {
                n_internal: 1,
                n_leaves: 2,
                depth: 2
            }
        );
    }

    #[test]
    fn id_is_attached() {
        let tree = stump().with_id(7);
        assert_eq!(tree.id(), Some(7));
        assert_eq!(stump().id(), None);
    }
}
