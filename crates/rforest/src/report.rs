//! CSV output of scoring results.
//!
//! The score file has header `id,label` and one row per sample in index
//! order, where `label` is the fraction of trees voting for class 0. The
//! optional votes file has header `id,votes_0,votes_1` with raw counts.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::inference::VoteTable;

/// Errors raised while writing a report.
#[derive(Debug, thiserror::Error)]
#[error("failed to write {}: {source}", path.display())]
pub struct ReportError {
    pub path: PathBuf,
    #[source]
    pub source: csv::Error,
}

#[derive(Debug, Serialize)]
struct ScoreRow {
    id: usize,
    label: f64,
}

#[derive(Debug, Serialize)]
struct VoteRow {
    id: usize,
    votes_0: u32,
    votes_1: u32,
}

/// Write `id,label` rows for every sample.
pub fn write_scores<W: Write>(writer: W, votes: &VoteTable) -> Result<(), csv::Error> {
    let mut csv = csv::Writer::from_writer(writer);
    for (id, v) in votes.iter().enumerate() {
        csv.serialize(ScoreRow {
            id,
            label: v.score(),
        })?;
    }
    csv.flush()?;
    Ok(())
}

/// Write `id,votes_0,votes_1` rows for every sample.
pub fn write_votes<W: Write>(writer: W, votes: &VoteTable) -> Result<(), csv::Error> {
    let mut csv = csv::Writer::from_writer(writer);
    for (id, v) in votes.iter().enumerate() {
        csv.serialize(VoteRow {
            id,
            votes_0: v.zeros,
            votes_1: v.ones,
        })?;
    }
    csv.flush()?;
    Ok(())
}

/// Write the score file to `path`.
pub fn save_scores(path: impl AsRef<Path>, votes: &VoteTable) -> Result<(), ReportError> {
    save_with(path.as_ref(), votes, write_scores)
}

/// Write the raw vote file to `path`.
pub fn save_votes(path: impl AsRef<Path>, votes: &VoteTable) -> Result<(), ReportError> {
    save_with(path.as_ref(), votes, write_votes)
}

fn save_with(
    path: &Path,
    votes: &VoteTable,
    write: fn(std::fs::File, &VoteTable) -> Result<(), csv::Error>,
) -> Result<(), ReportError> {
    let to_report = |source| ReportError {
        path: path.to_path_buf(),
        source,
    };
    let file = std::fs::File::create(path).map_err(|e| to_report(csv::Error::from(e)))?;
    write(file, votes).map_err(to_report)?;
    tracing::info!(path = %path.display(), n_samples = votes.len(), "wrote results");
    Ok(())
}
