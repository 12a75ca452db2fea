//! Random draws for forest construction.
//!
//! Every tree owns a generator seeded from `(seed, tree_id)` and uses it for
//! both its training subsample and its per-node feature draws. A tree built
//! for a given id is therefore the same no matter which worker builds it.

use std::collections::HashSet;

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::config::BootstrapPolicy;

/// Generator type used for tree construction.
pub type TreeRng = Xoshiro256PlusPlus;

/// Generator for tree `tree_id` of a forest trained with `seed`.
pub fn tree_rng(seed: u64, tree_id: usize) -> TreeRng {
    Xoshiro256PlusPlus::seed_from_u64(mix_seed(seed, tree_id as u64))
}

/// SplitMix64 finalizer over `seed` and a golden-ratio step per tree id.
///
/// Neighbouring `(seed, tree_id)` pairs such as `(42, 1)` and `(43, 0)` map
/// to unrelated streams.
fn mix_seed(seed: u64, tree_id: u64) -> u64 {
    mix64(mix64(seed) ^ tree_id.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

#[inline]
fn mix64(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Draw `count` distinct values from `[0, upper)`, redrawing duplicates.
///
/// Values are returned in draw order.
///
/// # Panics
///
/// Panics if `count > upper`, which could never terminate.
pub fn draw_distinct<R: Rng + ?Sized>(rng: &mut R, upper: usize, count: usize) -> Vec<usize> {
    assert!(
        count <= upper,
        "cannot draw {count} distinct values from [0, {upper})"
    );

    let mut seen = HashSet::with_capacity(count);
    let mut drawn = Vec::with_capacity(count);
    while drawn.len() < count {
        let value = rng.gen_range(0..upper);
        if seen.insert(value) {
            drawn.push(value);
        }
    }
    drawn
}

/// Indices of the training subsample for one tree.
///
/// Under [`BootstrapPolicy::WithoutReplacement`] `size` must not exceed
/// `n_samples`.
pub fn bootstrap_indices<R: Rng + ?Sized>(
    rng: &mut R,
    n_samples: usize,
    size: usize,
    policy: BootstrapPolicy,
) -> Vec<usize> {
    match policy {
        BootstrapPolicy::WithoutReplacement => draw_distinct(rng, n_samples, size),
        BootstrapPolicy::WithReplacement => (0..size).map(|_| rng.gen_range(0..n_samples)).collect(),
    }
}
