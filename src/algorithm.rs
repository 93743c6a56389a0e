//! Out-of-band tag naming the codec that produced a compressed blob.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::delta16;
use crate::error::{CodecError, UnknownAlgorithm};
use crate::frame;

/// Codec identifier carried next to the packet (the upload `algo` field)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    /// Absolute seed plus zig-zag varint deltas
    Delta16Var,
    /// Frame-relative 4-bit deltas with escaped absolutes
    TimeSeriesS4,
}

impl Algorithm {
    /// Wire name of the algorithm
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Delta16Var => "Delta16Var",
            Self::TimeSeriesS4 => "TimeSeriesS4",
        }
    }

    /// Decode `blob` with this algorithm. `width` is only consulted by TimeSeriesS4.
    ///
    /// # Errors
    /// Propagates the decoder's [`CodecError`].
    pub fn decompress(self, blob: &[u8], width: usize) -> Result<Vec<u16>, CodecError> {
        match self {
            Self::Delta16Var => delta16::decompress(blob),
            Self::TimeSeriesS4 => frame::decompress(blob, width),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Delta16Var" => Ok(Self::Delta16Var),
            "TimeSeriesS4" => Ok(Self::TimeSeriesS4),
            other => Err(UnknownAlgorithm(other.to_owned())),
        }
    }
}

/// Compressed bytes together with the algorithm that produced them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    pub algorithm: Algorithm,
    pub bytes: Vec<u8>,
}

impl Encoded {
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
