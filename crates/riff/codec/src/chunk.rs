//! Chunk tree types.
//!
//! A [`Chunk`] is either a leaf carrying raw payload bytes or a container
//! (`RIFF` / `LIST`) carrying a subtype identifier and owned children.

use std::fmt;
use std::io::Write;

use bytes::Bytes;
use riffle_primitives::{
    ChunkId, LIST, RIFF,
    constants::{HEADER_SIZE, LIST_ID_SIZE},
};

use crate::content::Content;
use crate::encode::Encoder;
use crate::error::{Error, Result};

/// Payload of a chunk
#[derive(Debug, Clone)]
pub enum Body {
    /// Raw payload bytes, plus the decoded value when a decoder was registered
    Leaf {
        /// Payload bytes, without the pad byte
        data: Bytes,
        /// Output of the registered content decoder, if any
        content: Option<Content>,
    },
    /// Nested chunks of a `RIFF` or `LIST` chunk
    Container {
        /// Container subtype (`WAVE`, `INFO`, ...)
        list_id: ChunkId,
        /// Children in stream order
        children: Vec<Chunk>,
    },
}

/// One tagged, length-prefixed block of a container file.
///
/// The declared length is stored as read or as supplied and is never
/// recomputed by the encoder. Use [`Chunk::leaf`] and [`Chunk::container`] to
/// build trees whose lengths are consistent, and [`Chunk::validate`] to check
/// trees built by other means.
#[derive(Debug, Clone)]
pub struct Chunk {
    id: ChunkId,
    declared_len: u32,
    body: Body,
}

impl Chunk {
    /// Create a leaf chunk, deriving the declared length from `data`.
    pub fn leaf(id: ChunkId, data: impl Into<Bytes>) -> Result<Self> {
        if id.is_reserved() {
            return Err(Error::inconsistent(id, "container marker used as leaf id"));
        }

        let data = data.into();
        let declared_len = u32::try_from(data.len())
            .map_err(|_| Error::inconsistent(id, "payload exceeds u32 length"))?;

        Ok(Self {
            id,
            declared_len,
            body: Body::Leaf {
                data,
                content: None,
            },
        })
    }

    /// Create a container chunk, deriving the declared length from `children`.
    ///
    /// `id` must be `RIFF` or `LIST`.
    pub fn container(id: ChunkId, list_id: ChunkId, children: Vec<Chunk>) -> Result<Self> {
        if !id.is_reserved() {
            return Err(Error::inconsistent(id, "container id must be RIFF or LIST"));
        }

        let total = LIST_ID_SIZE as u64 + children.iter().map(Chunk::encoded_len).sum::<u64>();
        let declared_len = u32::try_from(total)
            .map_err(|_| Error::inconsistent(id, "children exceed u32 length"))?;

        Ok(Self {
            id,
            declared_len,
            body: Body::Container { list_id, children },
        })
    }

    /// Create a top-level `RIFF` container
    pub fn riff(list_id: ChunkId, children: Vec<Chunk>) -> Result<Self> {
        Self::container(RIFF, list_id, children)
    }

    /// Create a nested `LIST` container
    pub fn list(list_id: ChunkId, children: Vec<Chunk>) -> Result<Self> {
        Self::container(LIST, list_id, children)
    }

    /// Assemble a chunk without checking any invariant.
    ///
    /// Encoding such a chunk writes `declared_len` verbatim, even when it
    /// disagrees with `body`.
    pub fn from_raw_parts(id: ChunkId, declared_len: u32, body: Body) -> Self {
        Self {
            id,
            declared_len,
            body,
        }
    }

    /// Get the chunk identifier
    pub fn id(&self) -> ChunkId {
        self.id
    }

    /// Get the payload length recorded in the header
    pub fn declared_len(&self) -> u32 {
        self.declared_len
    }

    /// Get the body
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Consume the chunk, returning its body
    pub fn into_body(self) -> Body {
        self.body
    }

    /// Check whether this chunk holds children
    pub fn is_container(&self) -> bool {
        matches!(self.body, Body::Container { .. })
    }

    /// Get the payload bytes of a leaf
    pub fn data(&self) -> Option<&Bytes> {
        match &self.body {
            Body::Leaf { data, .. } => Some(data),
            Body::Container { .. } => None,
        }
    }

    /// Get the decoded content of a leaf
    pub fn content(&self) -> Option<&Content> {
        match &self.body {
            Body::Leaf { content, .. } => content.as_ref(),
            Body::Container { .. } => None,
        }
    }

    /// Get the subtype of a container
    pub fn list_id(&self) -> Option<ChunkId> {
        match &self.body {
            Body::Container { list_id, .. } => Some(*list_id),
            Body::Leaf { .. } => None,
        }
    }

    /// Get the children of a container (empty for leaves)
    pub fn children(&self) -> &[Chunk] {
        match &self.body {
            Body::Container { children, .. } => children,
            Body::Leaf { .. } => &[],
        }
    }

    /// Direct children tagged `id`
    pub fn children_with(&self, id: ChunkId) -> impl Iterator<Item = &Chunk> {
        self.children().iter().filter(move |c| c.id == id)
    }

    /// First descendant tagged `id`, depth first, excluding `self`
    pub fn find(&self, id: ChunkId) -> Option<&Chunk> {
        self.children()
            .iter()
            .find_map(|c| if c.id == id { Some(c) } else { c.find(id) })
    }

    /// Declared length plus the pad byte, if any.
    ///
    /// Only leaves are padded. A container's body is its list id plus padded
    /// children, so a consistent container length is always even.
    pub fn padded_len(&self) -> u64 {
        let pad = match self.body {
            Body::Leaf { .. } => self.declared_len % 2,
            Body::Container { .. } => 0,
        };
        u64::from(self.declared_len) + u64::from(pad)
    }

    /// Bytes this chunk occupies on the wire, header and pad byte included
    pub fn encoded_len(&self) -> u64 {
        HEADER_SIZE as u64 + self.padded_len()
    }

    /// Write this chunk with the default encoder. Returns bytes written.
    pub fn write_to<W: Write + ?Sized>(&self, sink: &mut W) -> Result<u64> {
        Encoder::default().encode(sink, self)
    }

    /// Check the layout invariants of the whole tree.
    ///
    /// Leaves must not use a container marker and must hold exactly
    /// `declared_len` bytes. Containers must use a marker and declare four
    /// bytes plus the padded wire size of every child.
    pub fn validate(&self) -> Result<()> {
        match &self.body {
            Body::Leaf { data, .. } => {
                if self.id.is_reserved() {
                    return Err(Error::inconsistent(self.id, "container marker used as leaf id"));
                }
                if data.len() as u64 != u64::from(self.declared_len) {
                    return Err(Error::inconsistent(
                        self.id,
                        format!(
                            "declared {} bytes but holds {}",
                            self.declared_len,
                            data.len()
                        ),
                    ));
                }
            }
            Body::Container { children, .. } => {
                if !self.id.is_reserved() {
                    return Err(Error::inconsistent(self.id, "container id must be RIFF or LIST"));
                }
                if self.declared_len % 2 != 0 {
                    return Err(Error::inconsistent(
                        self.id,
                        format!("odd container length {}", self.declared_len),
                    ));
                }
                let expected =
                    LIST_ID_SIZE as u64 + children.iter().map(Chunk::encoded_len).sum::<u64>();
                if expected != u64::from(self.declared_len) {
                    return Err(Error::inconsistent(
                        self.id,
                        format!(
                            "declared {} bytes but children need {expected}",
                            self.declared_len
                        ),
                    ));
                }
                for child in children {
                    child.validate()?;
                }
            }
        }
        Ok(())
    }
}

/// Decoded content is derived from the payload and is not compared.
impl PartialEq for Chunk {
    fn eq(&self, other: &Self) -> bool {
        if self.id != other.id || self.declared_len != other.declared_len {
            return false;
        }
        match (&self.body, &other.body) {
            (Body::Leaf { data: a, .. }, Body::Leaf { data: b, .. }) => a == b,
            (
                Body::Container {
                    list_id: la,
                    children: ca,
                },
                Body::Container {
                    list_id: lb,
                    children: cb,
                },
            ) => la == lb && ca == cb,
            _ => false,
        }
    }
}

impl Eq for Chunk {}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"[{}]", self.id, self.declared_len)?;
        if let Body::Container { list_id, children } = &self.body {
            write!(f, " {{\"{list_id}\": [")?;
            for (i, child) in children.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{child}")?;
            }
            f.write_str("]}")?;
        }
        Ok(())
    }
}
