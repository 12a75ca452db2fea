//! Forest inference: vote collection over a sample set.

mod scorer;
mod votes;

pub use scorer::{Predictor, TestError, TestOutcome};
pub use votes::{VoteTable, Votes};
