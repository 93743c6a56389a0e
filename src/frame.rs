//! Frame time series codec ("TimeSeriesS4").
//!
//! Values are grouped into frames of `width` registers. The first frame is stored
//! verbatim; every later frame is stored relative to the frame just before it.
//!
//! # Wire Format
//!
//! ## Baseline frame
//!
//! `width` big-endian u16 values.
//!
//! ## Delta frames
//!
//! | Size | Field | Description |
//! |------|-------|-------------|
//! | 2 | mask | Little-endian; bit `j` set means register `j` changed by more than the small-delta range |
//! | `ceil(width/2)` | nibbles | 4-bit two's-complement deltas. High nibble = even register, low nibble = odd register. Zero for masked registers and for the pad slot of an odd width. |
//! | 2 per set bit | absolutes | Big-endian new value of each masked register, ascending register order |
//!
//! Worst case per delta frame is `2 + ceil(w/2) + 2w` bytes against `2w` raw.
//!
//! ## Fallback
//!
//! When the value count is not a multiple of the width, [`FrameCodec::compress`]
//! hands the whole stream to [`delta16`](crate::delta16) and says so in the
//! returned [`Encoded::algorithm`]. [`FrameCodec::compress_frames`] refuses instead.

use serde::{Deserialize, Serialize};

use crate::algorithm::{Algorithm, Encoded};
use crate::constants::{
    frame_fixed_len, get_u16_be, nibble_bytes, pack_s4, put_u16_be, unpack_s4, wrap_add, MAX_FRAME_WIDTH,
};
use crate::delta16;
use crate::error::CodecError;

/// Inclusive range of deltas stored as a nibble rather than escaped to an absolute value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDeltaRange", into = "RawDeltaRange")]
pub struct DeltaRange {
    min: i8,
    max: i8,
}

#[derive(Serialize, Deserialize)]
struct RawDeltaRange {
    min: i8,
    max: i8,
}

impl DeltaRange {
    /// Whole 4-bit two's-complement range
    pub const FULL: Self = Self { min: -8, max: 7 };

    /// # Errors
    /// Returns [`CodecError::InvalidDeltaRange`] unless `-8 <= min <= 0 <= max <= 7`.
    pub fn new(min: i8, max: i8) -> Result<Self, CodecError> {
        if min < Self::FULL.min || max > Self::FULL.max || min > 0 || max < 0 {
            return Err(CodecError::InvalidDeltaRange { min, max });
        }
        Ok(Self { min, max })
    }

    #[must_use]
    pub const fn min(self) -> i8 {
        self.min
    }

    #[must_use]
    pub const fn max(self) -> i8 {
        self.max
    }

    #[inline]
    #[must_use]
    pub fn contains(self, delta: i32) -> bool {
        (i32::from(self.min)..=i32::from(self.max)).contains(&delta)
    }
}

impl Default for DeltaRange {
    fn default() -> Self {
        Self::FULL
    }
}

impl TryFrom<RawDeltaRange> for DeltaRange {
    type Error = CodecError;

    fn try_from(raw: RawDeltaRange) -> Result<Self, Self::Error> {
        Self::new(raw.min, raw.max)
    }
}

impl From<DeltaRange> for RawDeltaRange {
    fn from(range: DeltaRange) -> Self {
        Self { min: range.min, max: range.max }
    }
}

/// Frame codec configured for one frame width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameCodec {
    width: usize,
    range: DeltaRange,
}

impl FrameCodec {
    /// Create a codec for frames of `width` registers using the full 4-bit range
    ///
    /// # Errors
    /// Returns [`CodecError::FrameWidthOutOfRange`] unless `1 <= width <= 16`.
    pub fn new(width: usize) -> Result<Self, CodecError> {
        if width == 0 || width > MAX_FRAME_WIDTH {
            return Err(CodecError::FrameWidthOutOfRange { width });
        }
        Ok(Self { width, range: DeltaRange::FULL })
    }

    /// Narrow the range of deltas stored as nibbles
    #[must_use]
    pub const fn with_delta_range(mut self, range: DeltaRange) -> Self {
        self.range = range;
        self
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub const fn delta_range(&self) -> DeltaRange {
        self.range
    }

    /// Compress `values`, falling back to Delta16Var when they do not divide into frames.
    ///
    /// The fallback is reported through [`Encoded::algorithm`]; the bytes are then
    /// identical to [`delta16::compress`].
    #[must_use]
    pub fn compress(&self, values: &[u16]) -> Encoded {
        match self.compress_frames(values) {
            Ok(bytes) => Encoded { algorithm: Algorithm::TimeSeriesS4, bytes },
            Err(_) => {
                tracing::trace!(len = values.len(), width = self.width, "frame width mismatch, using delta16");
                Encoded { algorithm: Algorithm::Delta16Var, bytes: delta16::compress(values) }
            }
        }
    }

    /// Compress `values` as whole frames.
    ///
    /// # Errors
    /// Returns [`CodecError::FrameWidthMismatch`] if `values.len()` is not a
    /// multiple of the width.
    pub fn compress_frames(&self, values: &[u16]) -> Result<Vec<u8>, CodecError> {
        let width = self.width;
        if values.is_empty() {
            return Ok(Vec::new());
        }
        if values.len() % width != 0 {
            return Err(CodecError::FrameWidthMismatch { len: values.len(), width });
        }

        let mut out = Vec::with_capacity(values.len());
        for &v in &values[..width] {
            put_u16_be(&mut out, v);
        }

        let mut nibbles = [0u8; MAX_FRAME_WIDTH];
        for pair in values.windows(2 * width).step_by(width) {
            let (prev, curr) = pair.split_at(width);
            let mut mask = 0u16;

            for j in 0..width {
                let delta = i32::from(curr[j]) - i32::from(prev[j]);
                if self.range.contains(delta) {
                    nibbles[j] = pack_s4(delta);
                } else {
                    mask |= 1 << j;
                    nibbles[j] = 0;
                }
            }

            out.extend_from_slice(&mask.to_le_bytes());
            for j in (0..width).step_by(2) {
                let lo = if j + 1 < width { nibbles[j + 1] } else { 0 };
                out.push((nibbles[j] << 4) | lo);
            }
            for (j, &v) in curr.iter().enumerate() {
                if mask & (1 << j) != 0 {
                    put_u16_be(&mut out, v);
                }
            }
        }
        Ok(out)
    }

    /// Decompress a blob produced by [`compress_frames`](Self::compress_frames).
    ///
    /// # Errors
    /// - [`CodecError::Truncated`] when the blob stops inside the baseline or a
    ///   delta frame; `recovered` holds every complete frame decoded before it.
    /// - [`CodecError::InvalidMask`] when a mask flags registers past the width.
    pub fn decompress(&self, blob: &[u8]) -> Result<Vec<u16>, CodecError> {
        let width = self.width;
        if blob.is_empty() {
            return Ok(Vec::new());
        }
        if blob.len() < 2 * width {
            return Err(CodecError::Truncated { offset: 0, recovered: Vec::new() });
        }

        let mut out = Vec::with_capacity(blob.len());
        let mut prev = [0u16; MAX_FRAME_WIDTH];
        let mut pos = 0;
        for slot in prev.iter_mut().take(width) {
            // length checked above
            *slot = get_u16_be(blob, pos).unwrap_or_default();
            pos += 2;
        }
        out.extend_from_slice(&prev[..width]);

        let fixed = frame_fixed_len(width);
        let packed_len = nibble_bytes(width);
        let valid_bits = (1u32 << width) - 1;

        while pos < blob.len() {
            let frame_start = pos;
            if pos + fixed > blob.len() {
                tracing::trace!(offset = frame_start, "partial trailing frame");
                return Err(CodecError::Truncated { offset: frame_start, recovered: out });
            }

            let mask = u16::from_le_bytes([blob[pos], blob[pos + 1]]);
            if u32::from(mask) & !valid_bits != 0 {
                return Err(CodecError::InvalidMask { mask, width });
            }
            pos += 2;
            let packed = &blob[pos..pos + packed_len];
            pos += packed_len;

            let mut curr = prev;
            for j in 0..width {
                if mask & (1 << j) != 0 {
                    let Some(abs) = get_u16_be(blob, pos) else {
                        return Err(CodecError::Truncated { offset: frame_start, recovered: out });
                    };
                    curr[j] = abs;
                    pos += 2;
                } else {
                    let byte = packed[j / 2];
                    let nibble = if j % 2 == 0 { byte >> 4 } else { byte & 0x0F };
                    curr[j] = wrap_add(prev[j], unpack_s4(nibble));
                }
            }

            out.extend_from_slice(&curr[..width]);
            prev = curr;
        }
        Ok(out)
    }
}

/// Compress with an ad-hoc width.
///
/// A zero width or empty input gives empty TimeSeriesS4 output; a value count
/// that does not divide into frames falls back to Delta16Var at any width.
///
/// # Errors
/// Returns [`CodecError::FrameWidthOutOfRange`] for whole frames wider than 16.
pub fn compress(values: &[u16], width: usize) -> Result<Encoded, CodecError> {
    if width == 0 || values.is_empty() {
        return Ok(Encoded { algorithm: Algorithm::TimeSeriesS4, bytes: Vec::new() });
    }
    if values.len() % width != 0 {
        tracing::trace!(len = values.len(), width, "frame width mismatch, using delta16");
        return Ok(Encoded { algorithm: Algorithm::Delta16Var, bytes: delta16::compress(values) });
    }
    Ok(FrameCodec::new(width)?.compress(values))
}

/// Decompress with an ad-hoc width. A zero width yields no values.
///
/// # Errors
/// As [`FrameCodec::decompress`], plus [`CodecError::FrameWidthOutOfRange`] for
/// widths above 16.
pub fn decompress(blob: &[u8], width: usize) -> Result<Vec<u16>, CodecError> {
    if width == 0 {
        return Ok(Vec::new());
    }
    FrameCodec::new(width)?.decompress(blob)
}
