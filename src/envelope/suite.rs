//! Keystream and tag primitives behind the envelope.

use crate::constants::{
    FNV32_OFFSET, FNV32_PRIME, FNV64_OFFSET, FNV64_PRIME, HEADER_LEN, NONCE_LEN, TAG_LEN,
};

/// Keystream and authentication tag used by a [`SecureChannel`](super::SecureChannel).
///
/// The packet layout and sequence rules live in the channel; a suite only has to
/// turn `(key, nonce, seq)` into a keystream and `(key, header, ciphertext)` into
/// a tag. Applying the keystream twice must restore the input.
pub trait CipherSuite {
    /// XOR the keystream for `(key, nonce, seq)` into `data` in place
    fn apply_keystream(&self, key: &[u8], nonce: &[u8; NONCE_LEN], seq: u32, data: &mut [u8]);

    /// Tag over the header and ciphertext
    fn tag(&self, key: &[u8], header: &[u8; HEADER_LEN], ciphertext: &[u8]) -> [u8; TAG_LEN];
}

/// Wire-compatible suite spoken by deployed gateways and the cloud decoder.
///
/// FNV-1a seeded xorshift32 keystream, keyed FNV-1a-64 tag sent little-endian.
/// Neither primitive is cryptographically strong.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LegacySuite;

impl CipherSuite for LegacySuite {
    fn apply_keystream(&self, key: &[u8], nonce: &[u8; NONCE_LEN], seq: u32, data: &mut [u8]) {
        let mut state = derive_seed(key, nonce, seq);
        // one generator step per 4 bytes, low byte first
        for chunk in data.chunks_mut(4) {
            state = xorshift32(state);
            for (b, k) in chunk.iter_mut().zip(state.to_le_bytes()) {
                *b ^= k;
            }
        }
    }

    fn tag(&self, key: &[u8], header: &[u8; HEADER_LEN], ciphertext: &[u8]) -> [u8; TAG_LEN] {
        let h = [key, header.as_slice(), ciphertext]
            .into_iter()
            .flatten()
            .fold(FNV64_OFFSET, |h, &b| (h ^ u64::from(b)).wrapping_mul(FNV64_PRIME));
        h.to_le_bytes()
    }
}

#[inline]
pub(crate) fn xorshift32(mut s: u32) -> u32 {
    s ^= s << 13;
    s ^= s >> 17;
    s ^= s << 5;
    s
}

/// Fold key, nonce and sequence number into a non-zero generator seed
pub(crate) fn derive_seed(key: &[u8], nonce: &[u8; NONCE_LEN], seq: u32) -> u32 {
    let fnv = |acc: u32, b: u32| (acc ^ b).wrapping_mul(FNV32_PRIME);

    let mut acc = key.iter().chain(nonce).fold(FNV32_OFFSET, |acc, &b| fnv(acc, u32::from(b)));
    acc = fnv(acc, seq);

    acc ^= acc.rotate_left(13);
    acc ^= acc >> 7;
    acc ^= acc.rotate_left(17);

    // xorshift32 is stuck at zero
    if acc == 0 {
        1
    } else {
        acc
    }
}
