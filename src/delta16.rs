//! Delta16Var: absolute seed plus zig-zag varint deltas.
//!
//! # Wire Format
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 2 | first value, big-endian |
//! | 2 | 1-5 each | `varint(zigzag(v[i] - v[i-1]))` for every following value |
//!
//! Deltas are taken in 32-bit signed space, so a jump from 65535 to 0 is stored
//! as -65535 and re-applied modulo 2^16 on decode.

use crate::constants::{get_u16_be, put_u16_be, wrap_add};
use crate::error::CodecError;
use crate::varint::{read_varint, unzigzag, write_varint, zigzag};

/// Compress a register stream. Empty input gives empty output.
#[must_use]
pub fn compress(values: &[u16]) -> Vec<u8> {
    let Some((&first, rest)) = values.split_first() else {
        return Vec::new();
    };

    // steady data is dominated by one-byte deltas
    let mut out = Vec::with_capacity(2 + rest.len());
    put_u16_be(&mut out, first);

    let mut prev = first;
    for &value in rest {
        let delta = i32::from(value) - i32::from(prev);
        write_varint(&mut out, zigzag(delta));
        prev = value;
    }
    out
}

/// Decompress a blob produced by [`compress`].
///
/// # Errors
/// Returns [`CodecError::Truncated`] carrying the values decoded so far when the
/// blob ends inside the seed or inside a varint, and
/// [`CodecError::VarintOverflow`] for a varint wider than 32 bits.
pub fn decompress(blob: &[u8]) -> Result<Vec<u16>, CodecError> {
    if blob.is_empty() {
        return Ok(Vec::new());
    }
    let Some(seed) = get_u16_be(blob, 0) else {
        return Err(CodecError::Truncated { offset: 0, recovered: Vec::new() });
    };

    let mut out = Vec::with_capacity(blob.len());
    out.push(seed);

    let mut prev = seed;
    let mut cursor = 2;
    while cursor < blob.len() {
        let zz = match read_varint(blob, &mut cursor) {
            Ok(zz) => zz,
            Err(CodecError::Truncated { offset, .. }) => {
                tracing::trace!(offset, decoded = out.len(), "delta16 blob ends mid-varint");
                return Err(CodecError::Truncated { offset, recovered: out });
            }
            Err(e) => return Err(e),
        };
        prev = wrap_add(prev, unzigzag(zz));
        out.push(prev);
    }
    Ok(out)
}
