//! Tree node storage.

use crate::data::Label;

/// State of one slot in the heap-indexed node array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeState {
    /// Never written during induction.
    #[default]
    Uninitialized,
    /// Split node; routes on its feature and threshold.
    Internal,
    /// Terminal node carrying a class.
    Leaf(Label),
}

impl NodeState {
    pub const TAG_UNINITIALIZED: i8 = -2;
    pub const TAG_INTERNAL: i8 = -1;

    /// Signed tag used by the binary node format.
    #[inline]
    pub fn tag(self) -> i8 {
        match self {
            Self::Uninitialized => Self::TAG_UNINITIALIZED,
            Self::Internal => Self::TAG_INTERNAL,
            Self::Leaf(label) => label as i8,
        }
    }

    /// Inverse of [`tag`](Self::tag); `None` for unknown tags.
    #[inline]
    pub fn from_tag(tag: i8) -> Option<Self> {
        match tag {
            Self::TAG_UNINITIALIZED => Some(Self::Uninitialized),
            Self::TAG_INTERNAL => Some(Self::Internal),
            _ => u8::try_from(tag).ok().and_then(Label::from_u8).map(Self::Leaf),
        }
    }
}

/// One node of a [`DecisionTree`](super::DecisionTree).
///
/// `feature` and `threshold` are only meaningful for internal nodes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TreeNode {
    pub state: NodeState,
    pub feature: u32,
    pub threshold: f64,
}

impl TreeNode {
    /// Split node: go left iff `value(feature) < threshold`.
    #[inline]
    pub fn internal(feature: u32, threshold: f64) -> Self {
        Self {
            state: NodeState::Internal,
            feature,
            threshold,
        }
    }

    #[inline]
    pub fn leaf(label: Label) -> Self {
        Self {
            state: NodeState::Leaf(label),
            feature: 0,
            threshold: 0.0,
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self.state, NodeState::Leaf(_))
    }

    #[inline]
    pub fn is_internal(&self) -> bool {
        self.state == NodeState::Internal
    }
}
