//! Internal constants and helper functions shared by the codecs and the envelope.

/// Bytes in the sequence number prefix of an envelope packet
pub const SEQ_LEN: usize = 4;

/// Bytes of per-message nonce
pub const NONCE_LEN: usize = 12;

/// Bytes of truncated authentication tag
pub const TAG_LEN: usize = 8;

/// Header fed to the tag: nonce followed by the little-endian sequence number
pub const HEADER_LEN: usize = NONCE_LEN + SEQ_LEN;

/// Smallest well-formed packet (empty ciphertext)
pub const MIN_PACKET_LEN: usize = SEQ_LEN + NONCE_LEN + TAG_LEN;

/// Widest frame the 16-bit large-change mask can describe
pub(crate) const MAX_FRAME_WIDTH: usize = 16;

/// Timestamp words (year, month, day, hour, minute, second) leading each snapshot
pub(crate) const TIMESTAMP_WORDS: usize = 6;

/// Register word marking a value that was not read
pub(crate) const UNREAD_REGISTER: u16 = 0xFFFF;

// FNV-1a parameters
pub(crate) const FNV32_OFFSET: u32 = 2_166_136_261;
pub(crate) const FNV32_PRIME: u32 = 16_777_619;
pub(crate) const FNV64_OFFSET: u64 = 1_469_598_103_934_665_603;
pub(crate) const FNV64_PRIME: u64 = 1_099_511_628_211;

/// Bytes of packed nibbles for a frame of `width` registers
#[inline]
pub(crate) const fn nibble_bytes(width: usize) -> usize {
    width.div_ceil(2)
}

/// Fixed part of an encoded delta frame: 2-byte mask plus packed nibbles
#[inline]
pub(crate) const fn frame_fixed_len(width: usize) -> usize {
    2 + nibble_bytes(width)
}

/// Encode a signed delta in [-8, 7] as a 4-bit two's-complement nibble
#[inline]
pub(crate) fn pack_s4(delta: i32) -> u8 {
    (delta as u8) & 0x0F
}

/// Sign-extend a 4-bit nibble back to [-8, 7]
#[inline]
pub(crate) fn unpack_s4(nibble: u8) -> i32 {
    let n = i32::from(nibble & 0x0F);
    if n & 0x8 != 0 {
        n - 16
    } else {
        n
    }
}

#[inline]
pub(crate) fn put_u16_be(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_be_bytes());
}

/// Read a big-endian u16 at `offset`, `None` if fewer than two bytes remain
#[inline]
pub(crate) fn get_u16_be(buf: &[u8], offset: usize) -> Option<u16> {
    let end = offset.checked_add(2)?;
    let bytes = buf.get(offset..end)?;
    Some(u16::from_be_bytes([bytes[0], bytes[1]]))
}

/// Wrapping add of a signed delta to a register value (mod 2^16)
#[inline]
pub(crate) fn wrap_add(prev: u16, delta: i32) -> u16 {
    (i32::from(prev).wrapping_add(delta) & 0xFFFF) as u16
}
