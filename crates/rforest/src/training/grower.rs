//! Recursive tree induction.
//!
//! [`TreeGrower`] fills a [`DecisionTree`]'s node array depth-first, starting
//! at the root with the whole training subsample. At every node it draws a
//! fresh set of candidate features, picks the lowest Gini split, partitions
//! the samples and either recurses or closes the children as leaves.

use rand::Rng;

use super::sampling::draw_distinct;
use super::split::{ClassCounts, find_best_split};
use crate::data::{Label, Sample, SampleAccessor};
use crate::repr::{DecisionTree, ROOT, TreeNode, left_child, n_slots, right_child};

/// Parameters for growing one tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrowerParams {
    pub features_count: usize,
    pub max_features: usize,
    pub max_depth: u32,
    pub min_samples_split: usize,
}

/// Grows one tree over a borrowed sample store.
pub struct TreeGrower<'a, R: Rng> {
    samples: &'a [Sample],
    params: GrowerParams,
    rng: R,
    tree: DecisionTree,
    scratch: Vec<(f64, Label)>,
}

impl<'a, R: Rng> TreeGrower<'a, R> {
    pub fn new(samples: &'a [Sample], params: GrowerParams, rng: R) -> Self {
        debug_assert!(params.max_features <= params.features_count);
        Self {
            samples,
            params,
            rng,
            tree: DecisionTree::new_uninitialized(params.max_depth),
            scratch: Vec::new(),
        }
    }

    /// Grow the tree from `partition` (indices into the sample store).
    ///
    /// # Panics
    ///
    /// Panics if `partition` is empty.
    pub fn grow(mut self, mut partition: Vec<usize>) -> DecisionTree {
        self.grow_node(ROOT, 1, &mut partition);
        self.tree
    }

    fn grow_node(&mut self, node: usize, depth: u32, partition: &mut [usize]) {
        assert!(
            !partition.is_empty(),
            "cannot grow node {node} from an empty partition"
        );

        let counts = ClassCounts::of(self.samples, partition);
        if right_child(node) >= n_slots(self.params.max_depth) {
            self.tree.set_node(node, TreeNode::leaf(counts.majority()));
            return;
        }

        let candidates: Vec<u32> = draw_distinct(
            &mut self.rng,
            self.params.features_count,
            self.params.max_features,
        )
        .into_iter()
        .map(|f| f as u32)
        .collect();

        let Some(split) = find_best_split(self.samples, partition, &candidates, &mut self.scratch)
        else {
            self.tree.set_node(node, TreeNode::leaf(counts.majority()));
            return;
        };

        self.tree
            .set_node(node, TreeNode::internal(split.feature, split.threshold));
        let n_left = partition_in_place(self.samples, partition, split.feature, split.threshold);
        debug_assert_eq!(n_left, split.n_left);
        let (left, right) = partition.split_at_mut(n_left);

        if depth + 1 >= self.params.max_depth {
            self.close_leaf(left_child(node), left);
            self.close_leaf(right_child(node), right);
            return;
        }

        for (child, child_partition) in [(left_child(node), left), (right_child(node), right)] {
            if child_partition.len() <= self.params.min_samples_split {
                self.close_leaf(child, child_partition);
            } else {
                self.grow_node(child, depth + 1, child_partition);
            }
        }
    }

    fn close_leaf(&mut self, node: usize, partition: &[usize]) {
        let counts = ClassCounts::of(self.samples, partition);
        self.tree.set_node(node, TreeNode::leaf(counts.majority()));
    }
}

/// Move samples with `value < threshold` to the front; returns their count.
fn partition_in_place(
    samples: &[Sample],
    partition: &mut [usize],
    feature: u32,
    threshold: f64,
) -> usize {
    let mut n_left = 0;
    for i in 0..partition.len() {
        if samples[partition[i]].feature(feature) < threshold {
            partition.swap(i, n_left);
            n_left += 1;
        }
    }
    n_left
}
