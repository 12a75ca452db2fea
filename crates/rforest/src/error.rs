//! Top-level error type and process exit codes.

use crate::config::ConfigError;
use crate::data::DataError;
use crate::inference::TestError;
use crate::persist::{ReadError, WriteError};
use crate::pool::PoolError;
use crate::report::ReportError;
use crate::training::TrainError;

/// Exit status for a run stopped by an interrupt after checkpointing.
pub const EXIT_INTERRUPTED: u8 = 130;

/// Any error a training or scoring run can produce.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Train(#[from] TrainError),

    #[error(transparent)]
    Test(#[from] TestError),

    /// The model file could not be opened or read.
    #[error(transparent)]
    ModelIo(ReadError),

    /// The model file was read but does not hold a valid forest.
    #[error("corrupt model file: {0}")]
    CorruptModel(ReadError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error(transparent)]
    Pool(#[from] PoolError),
}

impl From<ReadError> for Error {
    fn from(err: ReadError) -> Self {
        if err.is_corrupt() {
            Self::CorruptModel(err)
        } else {
            Self::ModelIo(err)
        }
    }
}

impl Error {
    /// Process exit status for this error.
    ///
    /// - `2`: bad or unreadable input (data or model file), unwritable output
    /// - `3`: corrupt model file
    /// - `4`: invalid configuration
    /// - `5`: internal failure (worker pool, malformed forest)
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Data(_) | Self::ModelIo(_) | Self::Report(_) | Self::Write(_) => 2,
            Self::Train(TrainError::EmptyData) => 2,
            Self::CorruptModel(_) => 3,
            Self::Config(_) => 4,
            Self::Train(TrainError::SampleSizeExceedsData { .. }) => 4,
            Self::Train(TrainError::Pool(_)) | Self::Test(_) | Self::Pool(_) => 5,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
