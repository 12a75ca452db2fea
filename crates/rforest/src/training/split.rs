//! Gini split search.
//!
//! For each candidate feature the partition is sorted by that feature and
//! every realizable split point is scored with `gini(left) + gini(right)`.
//! A split point `k` is realizable only where `value(P[k-1]) < value(P[k])`:
//! the threshold `value(P[k])` then sends exactly `P[..k]` left under the
//! `value < threshold` routing rule.

use crate::data::{Label, Sample, SampleAccessor};

// =============================================================================
// Class counts and impurity
// =============================================================================

/// Per-class sample counts of a partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClassCounts {
    pub zeros: usize,
    pub ones: usize,
}

impl ClassCounts {
    /// Count the labels of `partition`.
    pub fn of(samples: &[Sample], partition: &[usize]) -> Self {
        let mut counts = Self::default();
        for &idx in partition {
            counts.add(samples[idx].label());
        }
        counts
    }

    #[inline]
    pub fn add(&mut self, label: Label) {
        match label {
            Label::Zero => self.zeros += 1,
            Label::One => self.ones += 1,
        }
    }

    #[inline]
    pub fn total(&self) -> usize {
        self.zeros + self.ones
    }

    /// Gini impurity of a non-empty partition.
    #[inline]
    pub fn gini(&self) -> f64 {
        debug_assert!(self.total() > 0, "gini of an empty partition");
        gini_impurity(self.zeros, self.ones)
    }

    /// Majority class; ties go to [`Label::One`].
    #[inline]
    pub fn majority(&self) -> Label {
        if self.zeros > self.ones {
            Label::Zero
        } else {
            Label::One
        }
    }
}

impl std::ops::Sub for ClassCounts {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            zeros: self.zeros - rhs.zeros,
            ones: self.ones - rhs.ones,
        }
    }
}

/// `p0 (1 - p0) + p1 (1 - p1)`. Always in `[0, 0.5]`; NaN when both counts are 0.
#[inline]
pub fn gini_impurity(zeros: usize, ones: usize) -> f64 {
    let total = (zeros + ones) as f64;
    let p0 = zeros as f64 / total;
    let p1 = ones as f64 / total;
    p0 * (1.0 - p0) + p1 * (1.0 - p1)
}

// =============================================================================
// Split search
// =============================================================================

/// Best split found for a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitInfo {
    pub feature: u32,
    /// Samples with `value < threshold` go left.
    pub threshold: f64,
    /// `gini(left) + gini(right)`.
    pub score: f64,
    /// Size of the left partition.
    pub n_left: usize,
}

/// Find the lowest-scoring split of `partition` over `candidates`.
///
/// Candidates are tried in the given order and split points in ascending
/// order; the first minimum wins. Returns `None` when no candidate has two
/// distinct values in the partition.
///
/// `scratch` is reused between calls to avoid reallocating.
pub fn find_best_split(
    samples: &[Sample],
    partition: &[usize],
    candidates: &[u32],
    scratch: &mut Vec<(f64, Label)>,
) -> Option<SplitInfo> {
    let total = ClassCounts::of(samples, partition);
    let mut best: Option<SplitInfo> = None;

    for &feature in candidates {
        scratch.clear();
        scratch.extend(
            partition
                .iter()
                .map(|&idx| (samples[idx].feature(feature), samples[idx].label())),
        );
        scratch.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut left = ClassCounts::default();
        for k in 1..scratch.len() {
            left.add(scratch[k - 1].1);
            let (prev, value) = (scratch[k - 1].0, scratch[k].0);
            if prev >= value {
                continue;
            }

            let right = total - left;
            let score = left.gini() + right.gini();
            if best.is_none_or(|b| score < b.score) {
                best = Some(SplitInfo {
                    feature,
                    threshold: value,
                    score,
                    n_left: k,
                });
            }
        }
    }

    best
}
