//! Model representations: nodes, trees and forests.
//!
//! These types are pure data plus inference. Induction lives in
//! [`crate::training`] and the binary format in [`crate::persist`].

mod forest;
mod node;
mod tree;

pub use forest::{Forest, ForestValidationError};
pub use node::{NodeState, TreeNode};
pub use tree::{
    DecisionTree, ROOT, TreeStats, TreeValidationError, left_child, n_slots, right_child,
};
