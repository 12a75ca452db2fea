//! Sample store: sparse labeled samples and the text reader.
//!
//! Samples are loaded once per run and then shared read-only as `&[Sample]`
//! by tree building and scoring.

mod reader;
mod sample;

pub use reader::{DataError, infer_features_count, parse_line, parse_samples, read_samples};
pub use sample::{Label, Sample, SampleAccessor};
