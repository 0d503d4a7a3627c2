//! Chunk tree encoding.

use std::io::{self, Write};

use bytes::{BufMut, Bytes, BytesMut};
use riffle_primitives::constants::{HEADER_SIZE, LIST_ID_SIZE};
use tracing::{debug, trace};

use crate::chunk::{Body, Chunk};
use crate::config::EncoderConfig;
use crate::error::{Error, Result};

/// Writes chunk trees to a byte sink.
///
/// Declared lengths are written as stored in the tree. Odd-length leaves are
/// followed by one pad byte chosen by [`EncoderConfig::pad`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Encoder {
    config: EncoderConfig,
}

impl Encoder {
    /// Create an encoder with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an encoder with the given configuration
    pub fn with_config(config: EncoderConfig) -> Self {
        Self { config }
    }

    /// Get the configuration
    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Write `chunk` and all its descendants to `sink`.
    ///
    /// Returns the number of bytes written. The first failing write stops the
    /// encode; the error carries the bytes the sink accepted before it.
    pub fn encode<W: Write + ?Sized>(&self, sink: &mut W, chunk: &Chunk) -> Result<u64> {
        let mut sink = SinkWriter::new(sink);
        self.encode_chunk(&mut sink, chunk);
        let written = sink.finish()?;

        debug!(id = %chunk.id(), written, "Encoded chunk tree");
        Ok(written)
    }

    /// Encode `chunk` into a new buffer
    pub fn encode_to_bytes(&self, chunk: &Chunk) -> Result<Bytes> {
        let capacity = usize::try_from(chunk.encoded_len()).unwrap_or(usize::MAX);
        let mut buf = Vec::with_capacity(capacity);
        self.encode(&mut buf, chunk)?;
        Ok(Bytes::from(buf))
    }

    fn encode_chunk<W: Write + ?Sized>(&self, sink: &mut SinkWriter<'_, W>, chunk: &Chunk) {
        let mut header = BytesMut::with_capacity(HEADER_SIZE + LIST_ID_SIZE);
        header.put_slice(chunk.id().as_bytes());
        header.put_u32_le(chunk.declared_len());

        match chunk.body() {
            Body::Container { list_id, children } => {
                header.put_slice(list_id.as_bytes());
                sink.put(&header);

                trace!(id = %chunk.id(), %list_id, children = children.len(), "Encoding container");
                for child in children {
                    if sink.failed() {
                        break;
                    }
                    self.encode_chunk(sink, child);
                }
            }
            Body::Leaf { data, .. } => {
                sink.put(&header);
                sink.put(data);
                if chunk.declared_len() % 2 != 0 {
                    sink.put(&[self.config.pad.value()]);
                }

                trace!(id = %chunk.id(), len = chunk.declared_len(), "Encoded leaf");
            }
        }
    }
}

/// Sink wrapper that counts accepted bytes and stops at the first error.
struct SinkWriter<'a, W: ?Sized> {
    inner: &'a mut W,
    written: u64,
    error: Option<io::Error>,
}

impl<'a, W: Write + ?Sized> SinkWriter<'a, W> {
    fn new(inner: &'a mut W) -> Self {
        Self {
            inner,
            written: 0,
            error: None,
        }
    }

    fn failed(&self) -> bool {
        self.error.is_some()
    }

    /// Write all of `buf`, counting partial writes. No-op once failed.
    fn put(&mut self, mut buf: &[u8]) {
        while self.error.is_none() && !buf.is_empty() {
            match self.inner.write(buf) {
                Ok(0) => {
                    self.error = Some(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "sink accepted no bytes",
                    ));
                }
                Ok(n) => {
                    self.written += n as u64;
                    buf = buf.get(n..).unwrap_or_default();
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => self.error = Some(e),
            }
        }
    }

    fn finish(self) -> Result<u64> {
        match self.error {
            Some(source) => Err(Error::SinkWriteFailed {
                written: self.written,
                source,
            }),
            None => Ok(self.written),
        }
    }
}
