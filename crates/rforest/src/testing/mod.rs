//! Test and benchmark helpers.
//!
//! Synthetic data generators with fixed seeds, shared by unit tests,
//! integration tests and benches.

use std::fmt::Write as _;

use rand::prelude::*;

use crate::data::{Label, Sample};

/// Generate `n` sparse samples over `features_count` features.
///
/// Features 0 and 1 are always stored, uniform in `[0, 1)`; the label is
/// `One` iff `f0 + f1 > 1`. Every other feature is stored with probability
/// 0.3 and carries no signal.
pub fn synthetic_samples(n: usize, features_count: usize, seed: u64) -> Vec<Sample> {
	assert!(features_count >= 1);
	let mut rng = StdRng::seed_from_u64(seed);

	(0..n)
		.map(|_| {
			let mut features = Vec::new();
			for index in 0..features_count {
				if index < 2 || rng.gen_bool(0.3) {
					features.push((index as u32, rng.r#gen::<f64>()));
				}
			}
			let signal: f64 = features
				.iter()
				.filter(|&&(index, _)| index < 2)
				.map(|&(_, value)| value)
				.sum();
			let label = if signal > 1.0 { Label::One } else { Label::Zero };
			Sample::new(label, features)
		})
		.collect()
}

/// Render samples in the `label index:value ...` text format.
pub fn to_text(samples: &[Sample]) -> String {
	let mut out = String::new();
	for sample in samples {
		out.push(if sample.label() == Label::One { '1' } else { '0' });
		for &(index, value) in sample.features() {
			// {:?} keeps full f64 precision
			let _ = write!(out, " {index}:{value:?}");
		}
		out.push('\n');
	}
	out
}

/// Fraction of samples whose label matches `predict`.
pub fn accuracy<F>(samples: &[Sample], mut predict: F) -> f64
where
	F: FnMut(&Sample) -> Option<Label>,
{
	if samples.is_empty() {
		return 0.0;
	}
	let correct = samples
		.iter()
		.filter(|&s| predict(s) == Some(s.label()))
		.count();
	correct as f64 / samples.len() as f64
}
