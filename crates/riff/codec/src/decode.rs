//! Recursive chunk tree decoding.

use std::io::Read;
use std::sync::Arc;

use bytes::{Buf, Bytes};
use riffle_primitives::{
    ChunkId, IdError,
    constants::{LEN_SIZE, LIST_ID_SIZE},
    io::read_full,
};
use tracing::{debug, trace};

use crate::chunk::{Body, Chunk};
use crate::config::DecoderConfig;
use crate::constants::PREALLOC_LIMIT;
use crate::content::Content;
use crate::error::{BoxError, Error, Result};
use crate::registry::ContentRegistry;

/// Reads chunk trees from a byte source.
///
/// Leaves whose identifier has a decoder in the attached [`ContentRegistry`]
/// get their payload decoded into [`Chunk::content`]. The registry is shared,
/// so decoders may be registered through any handle to it, including while
/// other decoders are running.
#[derive(Debug)]
pub struct Decoder<R> {
    reader: R,
    registry: Arc<ContentRegistry>,
    config: DecoderConfig,
}

impl<R: Read> Decoder<R> {
    /// Create a decoder with an empty registry of its own
    pub fn new(reader: R) -> Self {
        Self::with_registry(reader, Arc::default())
    }

    /// Create a decoder sharing `registry`
    pub fn with_registry(reader: R, registry: Arc<ContentRegistry>) -> Self {
        Self {
            reader,
            registry,
            config: DecoderConfig::default(),
        }
    }

    /// Replace the configuration
    pub fn with_config(mut self, config: DecoderConfig) -> Self {
        self.config = config;
        self
    }

    /// Get the configuration
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Get the content registry
    pub fn registry(&self) -> &Arc<ContentRegistry> {
        &self.registry
    }

    /// Install a content decoder for leaves tagged `id`.
    ///
    /// See [`ContentRegistry::register`].
    pub fn register_decoder<T, F>(&self, id: ChunkId, decoder: F) -> Result<()>
    where
        T: std::any::Any + Send + Sync,
        F: Fn(&mut dyn Read) -> std::result::Result<T, BoxError> + Send + Sync + 'static,
    {
        self.registry.register(id, decoder)
    }

    /// Borrow the underlying reader
    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    /// Consume the decoder, returning the underlying reader
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Decode one chunk and, for containers, everything nested in it.
    ///
    /// Any failure aborts the whole call; no partial tree is returned.
    pub fn decode(&mut self) -> Result<Chunk> {
        let chunk = self.decode_chunk(0)?;
        debug!(id = %chunk.id(), len = chunk.declared_len(), "Decoded chunk tree");
        Ok(chunk)
    }

    /// Decode the next top-level chunk, or `None` at a clean end of input.
    ///
    /// Useful for files made of several consecutive top-level chunks. Input
    /// ending part way into a header is still an error.
    pub fn decode_next(&mut self) -> Result<Option<Chunk>> {
        let id = match ChunkId::read_from(&mut self.reader) {
            Ok(id) => id,
            Err(IdError::Truncated { read: 0 }) => return Ok(None),
            Err(e) => return Err(Error::from_id("chunk id", e)),
        };
        let chunk = self.decode_body(id, 0)?;
        debug!(id = %chunk.id(), len = chunk.declared_len(), "Decoded chunk tree");
        Ok(Some(chunk))
    }

    fn decode_chunk(&mut self, depth: usize) -> Result<Chunk> {
        let id = ChunkId::read_from(&mut self.reader).map_err(|e| Error::from_id("chunk id", e))?;
        self.decode_body(id, depth)
    }

    fn decode_body(&mut self, id: ChunkId, depth: usize) -> Result<Chunk> {
        let declared_len = self.read_len()?;
        if id.is_reserved() {
            self.decode_container(id, declared_len, depth)
        } else {
            self.decode_leaf(id, declared_len)
        }
    }

    fn read_len(&mut self) -> Result<u32> {
        let mut buf = [0u8; LEN_SIZE];
        let read = read_full(&mut self.reader, &mut buf)?;
        if read != LEN_SIZE {
            return Err(Error::truncated("chunk length", LEN_SIZE, read));
        }
        Ok(u32::from_le_bytes(buf))
    }

    fn decode_container(&mut self, id: ChunkId, declared_len: u32, depth: usize) -> Result<Chunk> {
        if depth >= self.config.max_depth {
            return Err(Error::DepthExceeded {
                limit: self.config.max_depth,
            });
        }

        let list_id =
            ChunkId::read_from(&mut self.reader).map_err(|e| Error::from_id("list id", e))?;

        let declared = u64::from(declared_len);
        let Some(mut remaining) = declared.checked_sub(LIST_ID_SIZE as u64) else {
            return Err(Error::malformed(
                id,
                0,
                Error::BudgetOverrun {
                    excess: LIST_ID_SIZE as u64 - declared,
                },
            ));
        };

        trace!(%id, %list_id, len = declared_len, depth, "Opening container");

        let mut children = Vec::new();
        while remaining > 0 {
            let index = children.len();
            let child = self
                .decode_chunk(depth + 1)
                .map_err(|e| Error::malformed(id, index, e))?;

            // Odd-length children are followed by a pad byte that is not part
            // of their declared length but is part of ours.
            let consumed = child.encoded_len();
            remaining = remaining.checked_sub(consumed).ok_or_else(|| {
                Error::malformed(
                    id,
                    index,
                    Error::BudgetOverrun {
                        excess: consumed - remaining,
                    },
                )
            })?;
            children.push(child);
        }

        trace!(%id, %list_id, children = children.len(), "Closing container");
        Ok(Chunk::from_raw_parts(
            id,
            declared_len,
            Body::Container { list_id, children },
        ))
    }

    fn decode_leaf(&mut self, id: ChunkId, declared_len: u32) -> Result<Chunk> {
        let expected = u64::from(declared_len);
        let mut data = Vec::with_capacity(expected.min(PREALLOC_LIMIT) as usize);
        let read = (&mut self.reader).take(expected).read_to_end(&mut data)? as u64;
        if read != expected {
            return Err(Error::ShortRead {
                id,
                expected: declared_len,
                read,
            });
        }

        if declared_len % 2 != 0 {
            let mut pad = [0u8; 1];
            let read = read_full(&mut self.reader, &mut pad)?;
            if read != pad.len() {
                return Err(Error::truncated("pad byte", pad.len(), read));
            }
        }

        let data = Bytes::from(data);
        let content = self.decode_content(id, &data)?;

        trace!(%id, len = declared_len, decoded = content.is_some(), "Decoded leaf");
        Ok(Chunk::from_raw_parts(
            id,
            declared_len,
            Body::Leaf { data, content },
        ))
    }

    fn decode_content(&self, id: ChunkId, data: &Bytes) -> Result<Option<Content>> {
        let Some(decoder) = self.registry.get(&id) else {
            return Ok(None);
        };

        let mut src = data.clone().reader();
        match (*decoder)(&mut src) {
            Ok(content) => Ok(Some(content)),
            Err(source) => {
                debug!(%id, error = %source, "Content decoder failed");
                Err(Error::ContentDecodeFailed { id, source })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use riffle_primitives::{LIST, RIFF};

    fn decode(bytes: &[u8]) -> Result<Chunk> {
        Decoder::new(bytes).decode()
    }

    #[test]
    fn test_decode_riff_wave_data() {
        let bytes = b"RIFF\x10\x00\x00\x00WAVEdata\x04\x00\x00\x00\x01\x02\x03\x04";
        let chunk = decode(bytes).unwrap();

        assert_eq!(chunk.id(), RIFF);
        assert_eq!(chunk.declared_len(), 16);
        assert_eq!(chunk.list_id(), Some(ChunkId::new("WAVE")));
        assert_eq!(chunk.children().len(), 1);

        let data = &chunk.children()[0];
        assert_eq!(data.id(), ChunkId::new("data"));
        assert_eq!(data.declared_len(), 4);
        assert_eq!(&data.data().unwrap()[..], &[1, 2, 3, 4]);
        assert!(data.content().is_none());
    }

    #[test]
    fn test_odd_leaf_consumes_pad_byte() {
        for pad in [0x00u8, b'0', 0xff] {
            let mut bytes = b"data\x03\x00\x00\x00\xAA\xBB\xCC".to_vec();
            bytes.push(pad);
            bytes.extend_from_slice(b"next");

            let mut reader = bytes.as_slice();
            let chunk = Decoder::new(&mut reader).decode().unwrap();

            assert_eq!(&chunk.data().unwrap()[..], &[0xAA, 0xBB, 0xCC]);
            assert_eq!(reader, b"next");
        }
    }

    #[test]
    fn test_odd_child_followed_by_sibling() {
        // 4 + (8 + 3 + 1) + (8 + 2)
        let bytes = b"RIFF\x1a\x00\x00\x00WAVE\
                      odd \x03\x00\x00\x00\x01\x02\x03\x00\
                      even\x02\x00\x00\x00\x04\x05";
        let chunk = decode(bytes).unwrap();

        assert_eq!(chunk.children().len(), 2);
        assert_eq!(chunk.children()[1].id(), ChunkId::new("even"));
        assert_eq!(&chunk.children()[1].data().unwrap()[..], &[4, 5]);
    }

    #[test]
    fn test_truncated_header() {
        assert_matches!(
            decode(b"RI"),
            Err(Error::TruncatedRead { field: "chunk id", read: 2, .. })
        );
        assert_matches!(
            decode(b"data\x04\x00"),
            Err(Error::TruncatedRead { field: "chunk length", read: 2, .. })
        );
        assert_matches!(
            decode(b"RIFF\x0c\x00\x00\x00WA"),
            Err(Error::TruncatedRead { field: "list id", read: 2, .. })
        );
    }

    #[test]
    fn test_short_payload() {
        let err = decode(b"data\x04\x00\x00\x00\x01\x02").unwrap_err();
        assert_matches!(err, Error::ShortRead { expected: 4, read: 2, .. });
    }

    #[test]
    fn test_missing_pad_byte() {
        let err = decode(b"data\x01\x00\x00\x00\x01").unwrap_err();
        assert_matches!(err, Error::TruncatedRead { field: "pad byte", read: 0, .. });
    }

    #[test]
    fn test_truncated_inside_container() {
        let err = decode(b"RIFF\x14\x00\x00\x00WAVEdata\x04\x00\x00\x00\x01\x02\x03\x04fa").unwrap_err();

        assert_matches!(err, Error::MalformedContainer { index: 1, .. });
        assert_eq!(err.child_path(), vec![1]);
        assert_matches!(err.innermost(), Error::TruncatedRead { field: "chunk id", .. });
    }

    #[test]
    fn test_child_overruns_container() {
        // Container leaves room for 6 bytes but the child takes 12
        let bytes = b"RIFF\x0a\x00\x00\x00WAVEdata\x04\x00\x00\x00\x01\x02\x03\x04";
        let err = decode(bytes).unwrap_err();

        assert_matches!(
            err,
            Error::MalformedContainer { index: 0, ref source, .. }
                if matches!(**source, Error::BudgetOverrun { excess: 6 })
        );
    }

    #[test]
    fn test_container_shorter_than_list_id() {
        let err = decode(b"LIST\x02\x00\x00\x00INFO").unwrap_err();
        assert_matches!(err.innermost(), Error::BudgetOverrun { excess: 2 });
    }

    #[test]
    fn test_container_length_excluding_child_header() {
        // Declares 12 but WAVE plus the data chunk take 16
        let bytes = b"RIFF\x0c\x00\x00\x00WAVEdata\x04\x00\x00\x00\x01\x02\x03\x04";
        let err = decode(bytes).unwrap_err();

        assert_matches!(err, Error::MalformedContainer { id, index: 0, .. } if id == RIFF);
        assert_matches!(err.innermost(), Error::BudgetOverrun { excess: 4 });
    }

    #[test]
    fn test_reader_failure_inside_container() {
        /// Serves `data`, then fails every read.
        struct Failing<'a>(&'a [u8]);

        impl Read for Failing<'_> {
            fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
                if self.0.is_empty() {
                    return Err(std::io::Error::other("boom"));
                }
                self.0.read(buf)
            }
        }

        let err = Decoder::new(Failing(b"RIFF\x10\x00\x00\x00WAVE"))
            .decode()
            .unwrap_err();

        assert_matches!(err, Error::MalformedContainer { index: 0, .. });
        assert_matches!(err.innermost(), Error::Io(e) if e.to_string() == "boom");
    }

    #[test]
    fn test_empty_container() {
        let chunk = decode(b"LIST\x04\x00\x00\x00INFO").unwrap();
        assert_eq!(chunk.id(), LIST);
        assert!(chunk.children().is_empty());
    }

    #[test]
    fn test_depth_limit() {
        // RIFF > LIST > LIST > leaf
        let bytes = b"RIFF\x24\x00\x00\x00AAAA\
                      LIST\x18\x00\x00\x00BBBB\
                      LIST\x0c\x00\x00\x00CCCC\
                      leaf\x00\x00\x00\x00";

        let chunk = Decoder::new(&bytes[..])
            .with_config(DecoderConfig::default().with_max_depth(3))
            .decode()
            .unwrap();
        assert_eq!(chunk.find(ChunkId::new("leaf")).unwrap().declared_len(), 0);

        let err = Decoder::new(&bytes[..])
            .with_config(DecoderConfig::default().with_max_depth(2))
            .decode()
            .unwrap_err();
        assert_eq!(err.child_path(), vec![0, 0]);
        assert_matches!(err.innermost(), Error::DepthExceeded { limit: 2 });
    }

    #[test]
    fn test_registered_decoder_receives_payload() {
        let decoder = Decoder::new(&b"RIFF\x10\x00\x00\x00WAVEdata\x04\x00\x00\x00\x01\x02\x03\x04"[..]);
        decoder
            .register_decoder(ChunkId::new("data"), |src| {
                let mut buf = Vec::new();
                src.read_to_end(&mut buf)?;
                Ok(buf.iter().map(|&b| u32::from(b)).sum::<u32>())
            })
            .unwrap();

        let mut decoder = decoder;
        let chunk = decoder.decode().unwrap();
        let content = chunk.children()[0].content().unwrap();
        assert_eq!(content.downcast_ref::<u32>(), Some(&10));
    }

    #[test]
    fn test_decoder_failure_is_wrapped() {
        let mut decoder = Decoder::new(&b"fmt \x02\x00\x00\x00\x01\x00"[..]);
        decoder
            .register_decoder(ChunkId::new("fmt "), |_src| -> std::result::Result<(), BoxError> {
                Err("unsupported format".into())
            })
            .unwrap();

        let err = decoder.decode().unwrap_err();
        assert_matches!(
            err,
            Error::ContentDecodeFailed { id, ref source }
                if id == ChunkId::new("fmt ") && source.to_string() == "unsupported format"
        );
    }

    #[test]
    fn test_decode_next_sequence() {
        let bytes = b"RIFF\x04\x00\x00\x00AVI RIFF\x04\x00\x00\x00AVIX";
        let mut decoder = Decoder::new(&bytes[..]);

        assert_eq!(decoder.decode_next().unwrap().unwrap().list_id(), Some(ChunkId::new("AVI ")));
        assert_eq!(decoder.decode_next().unwrap().unwrap().list_id(), Some(ChunkId::new("AVIX")));
        assert!(decoder.decode_next().unwrap().is_none());
    }

    #[test]
    fn test_decode_next_partial_header_is_error() {
        let mut decoder = Decoder::new(&b"RI"[..]);
        assert_matches!(decoder.decode_next(), Err(Error::TruncatedRead { read: 2, .. }));
    }
}
