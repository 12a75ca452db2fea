//! Reader for the sparse text format.
//!
//! One sample per line, whitespace separated:
//!
//! ```text
//! 1 0:0.5 17:2.25 1043:1
//! 0 3:-1.0
//! ```
//!
//! The first character of the first token is the label; every following
//! token is `index:value`. Blank lines are skipped.

use std::path::{Path, PathBuf};

use super::sample::{Label, Sample};
use crate::utils::Parallelism;

// =============================================================================
// DataError
// =============================================================================

/// Errors raised while loading a data set.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: invalid label {token:?} (expected '0' or '1')")]
    InvalidLabel { line: usize, token: String },

    #[error("line {line}: invalid feature token {token:?} (expected index:value)")]
    InvalidFeature { line: usize, token: String },

    #[error("{} contains no samples", path.display())]
    Empty { path: PathBuf },
}

// =============================================================================
// Parsing
// =============================================================================

/// Read and parse every sample in `path`.
///
/// Fails with [`DataError::Empty`] when the file holds no samples.
pub fn read_samples(
    path: impl AsRef<Path>,
    parallelism: Parallelism,
) -> Result<Vec<Sample>, DataError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let samples = parse_samples(&text, parallelism)?;
    if samples.is_empty() {
        return Err(DataError::Empty {
            path: path.to_path_buf(),
        });
    }

    tracing::info!(
        path = %path.display(),
        n_samples = samples.len(),
        "loaded samples"
    );
    Ok(samples)
}

/// Parse samples from in-memory text, preserving line order.
///
/// Lines are parsed on a rayon pool of `parallelism.n_threads()` threads when
/// `parallelism` allows it. The first error by line order is reported.
pub fn parse_samples(text: &str, parallelism: Parallelism) -> Result<Vec<Sample>, DataError> {
    let lines: Vec<(usize, &str)> = text.lines().enumerate().map(|(i, l)| (i + 1, l)).collect();

    let parsed = parallelism.maybe_par_map(lines, |(line_no, line)| parse_line(line, line_no));

    parsed
        .into_iter()
        .filter_map(Result::transpose)
        .collect()
}

/// Parse one line. Returns `Ok(None)` for a blank line.
///
/// `line_no` is 1-based and only used in error messages.
pub fn parse_line(line: &str, line_no: usize) -> Result<Option<Sample>, DataError> {
    let mut tokens = line.split_whitespace();
    let Some(label_token) = tokens.next() else {
        return Ok(None);
    };

    let label = label_token
        .chars()
        .next()
        .and_then(Label::from_char)
        .ok_or_else(|| DataError::InvalidLabel {
            line: line_no,
            token: label_token.to_string(),
        })?;

    let features = tokens
        .map(|token| parse_feature(token, line_no))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(Sample::new(label, features)))
}

fn parse_feature(token: &str, line_no: usize) -> Result<(u32, f64), DataError> {
    let invalid = || DataError::InvalidFeature {
        line: line_no,
        token: token.to_string(),
    };

    let (index, value) = token.split_once(':').ok_or_else(invalid)?;
    let index: u32 = index.parse().map_err(|_| invalid())?;
    let value: f64 = value.parse().map_err(|_| invalid())?;
    if !value.is_finite() {
        return Err(invalid());
    }
    Ok((index, value))
}

/// Number of features implied by the data: largest stored index + 1.
pub fn infer_features_count(samples: &[Sample]) -> usize {
    samples
        .iter()
        .filter_map(Sample::max_feature_index)
        .max()
        .map_or(0, |max| max as usize + 1)
}
