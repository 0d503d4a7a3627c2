//! Error types for chunk decoding and encoding.

use std::io;

use riffle_primitives::{ChunkId, IdError, constants::ID_SIZE};
use thiserror::Error;

/// Result type for codec operations
pub type Result<T> = std::result::Result<T, Error>;

/// Opaque error returned by registered content decoders
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while decoding, encoding or validating chunk trees
#[derive(Error, Debug)]
pub enum Error {
    /// Source ended inside a fixed-size field
    #[error("Truncated read: {field} needs {expected} bytes, got {read}")]
    TruncatedRead {
        /// Field being read
        field: &'static str,
        /// Size of the field
        expected: usize,
        /// Bytes actually available
        read: usize,
    },

    /// Source ended before a leaf's declared payload was read
    #[error("Short read: chunk {id} declares {expected} bytes, got {read}")]
    ShortRead {
        /// Leaf identifier
        id: ChunkId,
        /// Declared payload length
        expected: u32,
        /// Bytes actually read
        read: u64,
    },

    /// A container's child failed to decode or overran the container
    #[error("Malformed {id} container at child {index}: {source}")]
    MalformedContainer {
        /// Container identifier
        id: ChunkId,
        /// Index of the offending child
        index: usize,
        /// What went wrong with the child
        #[source]
        source: Box<Error>,
    },

    /// A child consumed more bytes than its container had left
    #[error("Container budget overrun by {excess} bytes")]
    BudgetOverrun {
        /// Bytes consumed past the declared container end
        excess: u64,
    },

    /// A registered content decoder failed
    #[error("Content decoder for {id} failed: {source}")]
    ContentDecodeFailed {
        /// Leaf identifier
        id: ChunkId,
        /// Error returned by the decoder
        #[source]
        source: BoxError,
    },

    /// An identifier field could not be built from the bytes supplied
    #[error("Invalid {field}: {source}")]
    InvalidIdentifier {
        /// Field being read
        field: &'static str,
        /// Why the identifier was rejected
        #[source]
        source: IdError,
    },

    /// Container markers cannot carry content decoders
    #[error("Identifier {0} is reserved for containers")]
    ReservedIdentifier(ChunkId),

    /// Sink failed during encoding
    #[error("Sink write failed after {written} bytes: {source}")]
    SinkWriteFailed {
        /// Bytes accepted by the sink before the failure
        written: u64,
        /// Underlying failure
        #[source]
        source: io::Error,
    },

    /// Containers are nested deeper than the configured limit
    #[error("Container nesting exceeds limit of {limit}")]
    DepthExceeded {
        /// Configured maximum nesting depth
        limit: usize,
    },

    /// A chunk tree does not satisfy the layout invariants
    #[error("Inconsistent chunk {id}: {reason}")]
    Inconsistent {
        /// Offending chunk
        id: ChunkId,
        /// Which invariant is broken
        reason: String,
    },

    /// Underlying reader failed
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// Create a new truncated read error
    pub fn truncated(field: &'static str, expected: usize, read: usize) -> Self {
        Self::TruncatedRead {
            field,
            expected,
            read,
        }
    }

    /// Wrap a child failure with the container it belongs to
    pub fn malformed(id: ChunkId, index: usize, source: Error) -> Self {
        Self::MalformedContainer {
            id,
            index,
            source: Box::new(source),
        }
    }

    /// Create a new inconsistency error
    pub fn inconsistent<S: Into<String>>(id: ChunkId, reason: S) -> Self {
        Self::Inconsistent {
            id,
            reason: reason.into(),
        }
    }

    /// Map an identifier read failure for the named field
    pub(crate) fn from_id(field: &'static str, err: IdError) -> Self {
        match err {
            IdError::Truncated { read } => Self::truncated(field, ID_SIZE, read),
            source @ IdError::InvalidLength(_) => Self::InvalidIdentifier { field, source },
            IdError::Io(e) => Self::Io(e),
        }
    }

    /// The error at the bottom of any chain of container failures.
    pub fn innermost(&self) -> &Error {
        let mut err = self;
        while let Self::MalformedContainer { source, .. } = err {
            err = source;
        }
        err
    }

    /// Child indices from the outermost container down to the failure.
    pub fn child_path(&self) -> Vec<usize> {
        let mut path = Vec::new();
        let mut err = self;
        while let Self::MalformedContainer { index, source, .. } = err {
            path.push(*index);
            err = source;
        }
        path
    }
}
