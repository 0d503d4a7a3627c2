//! Shared fixtures for integration tests.

#![allow(dead_code, unreachable_pub)]

use std::io::Read;

use riffle_codec::{BoxError, Chunk, ChunkId};

/// Install a test-writer subscriber once per test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("riffle_codec=trace")
        .with_test_writer()
        .try_init();
}

/// Decoded `fmt ` payload of a PCM WAV file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaveFormat {
    pub audio_format: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
}

pub const PCM_MONO_8K: WaveFormat = WaveFormat {
    audio_format: 1,
    channels: 1,
    sample_rate: 8000,
    byte_rate: 16000,
    block_align: 2,
    bits_per_sample: 16,
};

fn read_u16(src: &mut dyn Read) -> std::io::Result<u16> {
    let mut buf = [0u8; 2];
    src.read_exact(&mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

fn read_u32(src: &mut dyn Read) -> std::io::Result<u32> {
    let mut buf = [0u8; 4];
    src.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

/// Content decoder for `fmt ` chunks.
pub fn read_format(src: &mut dyn Read) -> Result<WaveFormat, BoxError> {
    Ok(WaveFormat {
        audio_format: read_u16(src)?,
        channels: read_u16(src)?,
        sample_rate: read_u32(src)?,
        byte_rate: read_u32(src)?,
        block_align: read_u16(src)?,
        bits_per_sample: read_u16(src)?,
    })
}

pub fn fmt_id() -> ChunkId {
    ChunkId::new("fmt ")
}

/// A small PCM WAV file with odd-length `data` and `ISFT` chunks.
///
/// ```text
/// RIFF[84] WAVE
///   fmt [16]
///   fact[4]
///   data[7] + pad
///   LIST[20] INFO
///     ISFT[7] + pad
/// ```
pub fn wav_bytes(pad: u8) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"RIFF\x54\x00\x00\x00WAVE");

    out.extend_from_slice(b"fmt \x10\x00\x00\x00");
    out.extend_from_slice(&[0x01, 0x00, 0x01, 0x00]);
    out.extend_from_slice(&8000u32.to_le_bytes());
    out.extend_from_slice(&16000u32.to_le_bytes());
    out.extend_from_slice(&[0x02, 0x00, 0x10, 0x00]);

    out.extend_from_slice(b"fact\x04\x00\x00\x00\x03\x00\x00\x00");

    out.extend_from_slice(b"data\x07\x00\x00\x00");
    out.extend_from_slice(&[1, 2, 3, 4, 5, 6, 7, pad]);

    out.extend_from_slice(b"LIST\x14\x00\x00\x00INFO");
    out.extend_from_slice(b"ISFT\x07\x00\x00\x00riffle\x00");
    out.push(pad);

    out
}

/// The tree [`wav_bytes`] decodes to.
pub fn wav_tree() -> Chunk {
    let mut fmt = vec![0x01, 0x00, 0x01, 0x00];
    fmt.extend_from_slice(&8000u32.to_le_bytes());
    fmt.extend_from_slice(&16000u32.to_le_bytes());
    fmt.extend_from_slice(&[0x02, 0x00, 0x10, 0x00]);

    Chunk::riff(
        ChunkId::new("WAVE"),
        vec![
            Chunk::leaf(fmt_id(), fmt).unwrap(),
            Chunk::leaf(ChunkId::new("fact"), vec![3u8, 0, 0, 0]).unwrap(),
            Chunk::leaf(ChunkId::new("data"), vec![1u8, 2, 3, 4, 5, 6, 7]).unwrap(),
            Chunk::list(
                ChunkId::new("INFO"),
                vec![Chunk::leaf(ChunkId::new("ISFT"), &b"riffle\x00"[..]).unwrap()],
            )
            .unwrap(),
        ],
    )
    .unwrap()
}
