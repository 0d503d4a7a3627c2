//! Error types for identifier handling.

use thiserror::Error;

/// Result type for identifier operations
pub type Result<T> = std::result::Result<T, IdError>;

/// Errors raised when building or reading a [`ChunkId`](crate::ChunkId)
#[derive(Error, Debug)]
pub enum IdError {
    /// Input was not exactly four bytes long
    #[error("Invalid identifier length: {0} (expected 4)")]
    InvalidLength(usize),

    /// Source ended before four bytes could be read
    #[error("Truncated identifier: read {read} of 4 bytes")]
    Truncated {
        /// Bytes actually read
        read: usize,
    },

    /// Underlying reader failed
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
