//! Primitive types for RIFF-style chunk containers.
//!
//! This crate provides the fixed-width [`ChunkId`] tag used both as a chunk
//! type and as a container subtype, the two reserved container markers, and
//! the sizes of the on-wire header fields.
//!
//! # Types
//!
//! - [`ChunkId`] - 4-byte chunk identifier
//! - [`IdError`] - Errors raised when building or reading an identifier

#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![warn(missing_docs)]

mod error;
mod id;
pub mod io;

pub use error::{IdError, Result};
pub use id::ChunkId;

/// Reserved identifier for the top-level container chunk.
pub const RIFF: ChunkId = ChunkId::new("RIFF");

/// Reserved identifier for nested list chunks.
pub const LIST: ChunkId = ChunkId::new("LIST");

/// Constants describing the chunk wire layout.
pub mod constants {
    /// Size of a chunk identifier in bytes.
    pub const ID_SIZE: usize = 4;

    /// Size of the little-endian length field in bytes.
    pub const LEN_SIZE: usize = 4;

    /// Size of a chunk header (identifier + length) in bytes.
    pub const HEADER_SIZE: usize = ID_SIZE + LEN_SIZE;

    /// Bytes of a container's declared length taken by its list identifier.
    pub const LIST_ID_SIZE: usize = ID_SIZE;
}
