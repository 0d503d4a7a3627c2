//! Chunk identifier definition and operations

use std::fmt;
use std::io::Read;

use crate::constants::ID_SIZE;
use crate::error::{IdError, Result};
use crate::io::read_full;

/// A 4-byte chunk identifier, compared byte for byte.
///
/// Used both as the type tag of a chunk and as the subtype of a container
/// (`WAVE`, `AVI `, `INFO`, ...). The bytes carry no meaning beyond equality;
/// the textual rendering is for diagnostics only.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ChunkId([u8; ID_SIZE]);

impl ChunkId {
    /// Creates an identifier from a 4-character tag.
    ///
    /// # Panics
    ///
    /// Panics if `tag` is not exactly 4 bytes long. Tags are expected to be
    /// literals in correct code; use [`ChunkId::try_from`] for runtime input.
    pub const fn new(tag: &str) -> Self {
        let &[a, b, c, d] = tag.as_bytes() else {
            panic!("chunk identifier must be exactly 4 bytes");
        };
        Self([a, b, c, d])
    }

    /// Creates an identifier from raw bytes
    pub const fn from_bytes(bytes: [u8; ID_SIZE]) -> Self {
        Self(bytes)
    }

    /// Returns the underlying bytes
    pub const fn as_bytes(&self) -> &[u8; ID_SIZE] {
        &self.0
    }

    /// Returns true for the `RIFF` and `LIST` container markers
    pub fn is_reserved(&self) -> bool {
        *self == crate::RIFF || *self == crate::LIST
    }

    /// Reads exactly four bytes from `reader`.
    ///
    /// Fails with [`IdError::Truncated`] if the source ends first.
    pub fn read_from<R: Read + ?Sized>(reader: &mut R) -> Result<Self> {
        let mut buf = [0u8; ID_SIZE];
        let read = read_full(reader, &mut buf)?;
        if read != ID_SIZE {
            return Err(IdError::Truncated { read });
        }
        Ok(Self(buf))
    }
}

impl From<[u8; ID_SIZE]> for ChunkId {
    fn from(bytes: [u8; ID_SIZE]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for ChunkId {
    type Error = IdError;

    fn try_from(slice: &[u8]) -> Result<Self> {
        let bytes: [u8; ID_SIZE] = slice
            .try_into()
            .map_err(|_| IdError::InvalidLength(slice.len()))?;
        Ok(Self(bytes))
    }
}

impl TryFrom<&str> for ChunkId {
    type Error = IdError;

    fn try_from(tag: &str) -> Result<Self> {
        Self::try_from(tag.as_bytes())
    }
}

impl AsRef<[u8]> for ChunkId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() || b == b' ' {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{b:02x}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChunkId(\"{self}\")")
    }
}
