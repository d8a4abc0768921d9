use std::io;
use thiserror::Error;

pub type Result<T, E = ChainError> = std::result::Result<T, E>;

/// Everything that can go wrong while building, encoding, reading or
/// appending blocks. Chain validity is reported as a verdict, not an error.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("payload of {len} bytes exceeds the maximum of {max} bytes")]
    PayloadTooLarge { len: usize, max: usize },

    #[error("malformed block record: {0}")]
    MalformedRecord(String),

    #[error("short i/o: expected {expected} bytes, got {actual}")]
    ShortIo { expected: usize, actual: usize },

    #[error("unable to determine storage size: {0}")]
    StorageProbeFailed(#[source] io::Error),

    #[error("block index {index} out of range for chain of {size} blocks")]
    IndexOutOfRange { index: u64, size: u64 },

    /// Storage length is not a whole number of fixed records.
    #[error("storage length {len} is not a multiple of the block record size")]
    MalformedStore { len: u64 },

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

impl ChainError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedRecord(reason.into())
    }
}
