//! Zig-zag mapping and base-128 varints for signed register deltas.

use crate::error::CodecError;

/// Longest varint a u32 can need
pub const MAX_VARINT_LEN: usize = 5;

/// Map a signed delta onto the unsigned domain, keeping small magnitudes small.
///
/// `0, -1, 1, -2, 2, ...` become `0, 1, 2, 3, 4, ...`.
#[inline]
#[must_use]
pub const fn zigzag(x: i32) -> u32 {
    ((x << 1) ^ (x >> 31)) as u32
}

/// Inverse of [`zigzag`]
#[inline]
#[must_use]
pub const fn unzigzag(u: u32) -> i32 {
    ((u >> 1) as i32) ^ -((u & 1) as i32)
}

/// Append `value` as a little-endian base-128 varint (1 to 5 bytes)
#[inline]
pub fn write_varint(out: &mut Vec<u8>, mut value: u32) {
    while value >= 0x80 {
        out.push(0x80 | (value & 0x7F) as u8);
        value >>= 7;
    }
    out.push(value as u8);
}

/// Read one varint starting at `*cursor`, advancing the cursor past it.
///
/// # Errors
/// - [`CodecError::Truncated`] if the input ends before the final byte
///   (continuation bit clear). The cursor is left where the varint started.
/// - [`CodecError::VarintOverflow`] if more than five bytes carry the
///   continuation bit or the fifth byte spills past bit 31.
#[inline]
pub fn read_varint(buf: &[u8], cursor: &mut usize) -> Result<u32, CodecError> {
    let start = *cursor;
    let mut value = 0u32;
    let mut pos = start;

    for i in 0..MAX_VARINT_LEN {
        let Some(&byte) = buf.get(pos) else {
            return Err(CodecError::Truncated { offset: start, recovered: Vec::new() });
        };
        pos += 1;

        // fifth byte may only contribute the top 4 bits
        if i == MAX_VARINT_LEN - 1 && byte > 0x0F {
            return Err(CodecError::VarintOverflow { offset: start });
        }

        value |= u32::from(byte & 0x7F) << (7 * i);
        if byte & 0x80 == 0 {
            *cursor = pos;
            return Ok(value);
        }
    }

    Err(CodecError::VarintOverflow { offset: start })
}
