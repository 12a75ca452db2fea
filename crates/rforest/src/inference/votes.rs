//! Per-sample vote aggregation.

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use crate::data::Label;

/// Vote counts for one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Votes {
    pub zeros: u32,
    pub ones: u32,
}

impl Votes {
    #[inline]
    pub fn total(&self) -> u32 {
        self.zeros + self.ones
    }

    /// Fraction of votes for class 0; `0.0` when there are no votes.
    #[inline]
    pub fn score(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => f64::from(self.zeros) / f64::from(total),
        }
    }

    /// Class with the most votes; ties go to [`Label::One`].
    #[inline]
    pub fn majority(&self) -> Label {
        if self.zeros > self.ones {
            Label::Zero
        } else {
            Label::One
        }
    }
}

/// Concurrent vote table with one pair of counters per sample.
///
/// Counters only ever increase, and each `(tree, sample)` pair records
/// exactly one vote, so relaxed increments are sufficient; the final values
/// are read after every writer has been joined.
#[derive(Debug)]
pub struct VoteTable {
    votes: Box<[[AtomicU32; 2]]>,
    defects: AtomicUsize,
}

impl VoteTable {
    /// Table for `n_samples` samples, all counters at zero.
    pub fn new(n_samples: usize) -> Self {
        Self {
            votes: (0..n_samples)
                .map(|_| [AtomicU32::new(0), AtomicU32::new(0)])
                .collect(),
            defects: AtomicUsize::new(0),
        }
    }

    /// Record one tree's prediction for `sample_idx`.
    ///
    /// `None` (a malformed tree) is counted as a defect instead of a vote.
    #[inline]
    pub fn record(&self, sample_idx: usize, prediction: Option<Label>) {
        match prediction {
            Some(label) => {
                self.votes[sample_idx][label.index()].fetch_add(1, Ordering::Relaxed);
            }
            None => {
                self.defects.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Current votes for one sample.
    pub fn votes(&self, sample_idx: usize) -> Votes {
        let [zeros, ones] = &self.votes[sample_idx];
        Votes {
            zeros: zeros.load(Ordering::Relaxed),
            ones: ones.load(Ordering::Relaxed),
        }
    }

    /// Number of predictions that failed to reach a leaf.
    pub fn defects(&self) -> usize {
        self.defects.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.votes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }

    /// Votes in sample order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = Votes> + '_ {
        (0..self.len()).map(|idx| self.votes(idx))
    }

    /// Plain copy of every sample's votes.
    pub fn snapshot(&self) -> Vec<Votes> {
        self.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_votes_score_zero() {
        assert_eq!(Votes::default().score(), 0.0);
    }

    #[test]
    fn score_is_fraction_of_zero_votes() {
        let votes = Votes { zeros: 3, ones: 1 };
        assert_eq!(votes.score(), 0.75);
        assert_eq!(votes.majority(), Label::Zero);
        assert_eq!(Votes { zeros: 2, ones: 2 }.majority(), Label::One);
    }

    #[test]
    fn record_counts_votes_and_defects() {
        let table = VoteTable::new(2);
        table.record(0, Some(Label::Zero));
        table.record(0, Some(Label::One));
        table.record(0, Some(Label::Zero));
        table.record(1, None);

        assert_eq!(table.votes(0), Votes { zeros: 2, ones: 1 });
        assert_eq!(table.votes(1), Votes::default());
        assert_eq!(table.defects(), 1);
        assert_eq!(table.snapshot().len(), 2);
    }

    #[test]
    fn concurrent_increments_are_not_lost() {
        let table = VoteTable::new(1);
        std::thread::scope(|scope| {
            for t in 0..8 {
                let table = &table;
                scope.spawn(move || {
                    let label = if t % 2 == 0 { Label::Zero } else { Label::One };
                    for _ in 0..1000 {
                        table.record(0, Some(label));
                    }
                });
            }
        });
        assert_eq!(table.votes(0), Votes { zeros: 4000, ones: 4000 });
    }
}
