//! Decoder and encoder for RIFF-style chunk trees.
//!
//! Files in this family (WAV, AVI, WebP, ...) are a sequence of tagged,
//! length-prefixed chunks. `RIFF` and `LIST` chunks are containers whose body
//! is a subtype identifier followed by nested chunks; every other chunk is a
//! leaf holding raw bytes. Bodies of odd length are followed by one pad byte
//! that is not counted in the chunk's own length but is counted by its parent.
//!
//! # Decoding
//!
//! [`Decoder`] reads one chunk tree from any [`std::io::Read`]. Payload
//! interpretation is pluggable: a [`ContentRegistry`] maps leaf identifiers to
//! decoders whose output lands in [`Chunk::content`].
//!
//! ```
//! use std::io::Read;
//!
//! use riffle_codec::{ChunkId, Decoder};
//!
//! let bytes = b"RIFF\x10\x00\x00\x00WAVEdata\x04\x00\x00\x00\x01\x02\x03\x04";
//! let mut decoder = Decoder::new(&bytes[..]);
//! decoder
//!     .register_decoder(ChunkId::new("data"), |src| {
//!         let mut samples = Vec::new();
//!         src.read_to_end(&mut samples)?;
//!         Ok(samples.len())
//!     })
//!     .unwrap();
//!
//! let riff = decoder.decode().unwrap();
//! assert_eq!(riff.list_id(), Some(ChunkId::new("WAVE")));
//! let data = riff.find(ChunkId::new("data")).unwrap();
//! assert_eq!(data.content().unwrap().downcast_ref::<usize>(), Some(&4));
//! ```
//!
//! # Encoding
//!
//! [`Encoder`] (or [`Chunk::write_to`]) writes a tree back out. Declared
//! lengths are written as stored, so a decoded tree re-encodes to the bytes it
//! came from.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![warn(missing_docs)]

// Re-export dependencies that are part of our public API
pub use bytes;
pub use riffle_primitives::{self as primitives, ChunkId, IdError, LIST, RIFF};

pub mod chunk;
pub mod config;
pub mod constants;
pub mod content;
pub mod decode;
pub mod encode;
pub mod error;
pub mod registry;

pub use chunk::{Body, Chunk};
pub use config::{DecoderConfig, EncoderConfig, PadByte};
pub use content::Content;
pub use decode::Decoder;
pub use encode::Encoder;
pub use error::{BoxError, Error, Result};
pub use registry::ContentRegistry;
