//! Decoder and encoder configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MAX_DEPTH, LEGACY_PAD_BYTE, ZERO_PAD_BYTE};

/// Decoder configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DecoderConfig {
    /// Maximum number of nested containers, counting the outermost one.
    pub max_depth: usize,
}

impl DecoderConfig {
    /// Set the maximum container nesting depth
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Value of the alignment byte written after odd-length payloads.
///
/// Decoding never inspects the pad byte, so both conventions read back the
/// same tree. Only [`PadByte::Zero`] reproduces conventionally padded files
/// byte for byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PadByte {
    /// Write `0x00`.
    #[default]
    Zero,
    /// Write ASCII `'0'` (`0x30`), as older writers of this format did.
    LegacyAscii,
}

impl PadByte {
    /// The byte value written to the sink
    pub const fn value(self) -> u8 {
        match self {
            Self::Zero => ZERO_PAD_BYTE,
            Self::LegacyAscii => LEGACY_PAD_BYTE,
        }
    }
}

/// Encoder configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EncoderConfig {
    /// Pad byte convention for odd-length leaves
    pub pad: PadByte,
}

impl EncoderConfig {
    /// Set the pad byte convention
    pub fn with_pad(mut self, pad: PadByte) -> Self {
        self.pad = pad;
        self
    }
}
