//! Sparse labeled samples.
//!
//! A [`Sample`] stores only its non-zero features as `(index, value)` pairs
//! sorted by index. Looking up an index that was never stored yields `0.0`,
//! which is how absent features behave everywhere in the crate.

// ============================================================================
// Label
// ============================================================================

/// Binary class label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Label {
    Zero = 0,
    One = 1,
}

impl Label {
    /// Class index (`0` or `1`), usable for indexing per-class tables.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Convert from `0`/`1`, returning `None` for anything else.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Zero),
            1 => Some(Self::One),
            _ => None,
        }
    }

    /// Convert from the label character of the text format.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(Self::Zero),
            '1' => Some(Self::One),
            _ => None,
        }
    }
}

// ============================================================================
// SampleAccessor
// ============================================================================

/// Read access to the feature values of one sample.
///
/// Implemented by [`Sample`] (sparse) and by `[f64]` (dense). Both follow the
/// sparse convention: an index with no stored value reads as `0.0`.
pub trait SampleAccessor {
    /// Feature value at `index`, `0.0` when absent.
    fn feature(&self, index: u32) -> f64;
}

impl SampleAccessor for [f64] {
    #[inline]
    fn feature(&self, index: u32) -> f64 {
        self.get(index as usize).copied().unwrap_or(0.0)
    }
}

impl<const N: usize> SampleAccessor for [f64; N] {
    #[inline]
    fn feature(&self, index: u32) -> f64 {
        self.as_slice().feature(index)
    }
}

// ============================================================================
// Sample
// ============================================================================

/// A labeled sparse feature vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    label: Label,
    features: Vec<(u32, f64)>,
}

impl Sample {
    /// Create a sample from `(index, value)` pairs in any order.
    ///
    /// When an index appears more than once the last value wins.
    pub fn new(label: Label, features: impl IntoIterator<Item = (u32, f64)>) -> Self {
        let mut pairs: Vec<(u32, f64)> = features.into_iter().collect();
        // stable, so later duplicates stay after earlier ones
        pairs.sort_by_key(|&(index, _)| index);

        let mut features: Vec<(u32, f64)> = Vec::with_capacity(pairs.len());
        for (index, value) in pairs {
            match features.last_mut() {
                Some(last) if last.0 == index => last.1 = value,
                _ => features.push((index, value)),
            }
        }

        Self { label, features }
    }

    #[inline]
    pub fn label(&self) -> Label {
        self.label
    }

    /// Stored `(index, value)` pairs, sorted by index.
    #[inline]
    pub fn features(&self) -> &[(u32, f64)] {
        &self.features
    }

    /// Number of stored features.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.features.len()
    }

    /// Largest stored feature index, if any.
    #[inline]
    pub fn max_feature_index(&self) -> Option<u32> {
        self.features.last().map(|&(index, _)| index)
    }
}

impl SampleAccessor for Sample {
    #[inline]
    fn feature(&self, index: u32) -> f64 {
        match self.features.binary_search_by_key(&index, |&(i, _)| i) {
            Ok(pos) => self.features[pos].1,
            Err(_) => 0.0,
        }
    }
}
