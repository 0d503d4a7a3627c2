//! Codec defaults.

/// Maximum number of nested containers accepted by default.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Upper bound on the buffer reserved before a leaf payload is read.
///
/// Larger payloads grow the buffer as bytes arrive, so a corrupt length field
/// cannot force a large allocation up front.
pub const PREALLOC_LIMIT: u64 = 64 * 1024;

/// Pad byte value written in zero-padding mode.
pub const ZERO_PAD_BYTE: u8 = 0x00;

/// Pad byte value written in legacy mode (ASCII `'0'`).
pub const LEGACY_PAD_BYTE: u8 = b'0';
