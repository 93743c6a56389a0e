//! Borrowed view of an envelope packet.

use crate::constants::{HEADER_LEN, MIN_PACKET_LEN, NONCE_LEN, SEQ_LEN, TAG_LEN};
use crate::error::EnvelopeError;

/// Fields of `seq (4, LE) | nonce (12) | ciphertext (n) | tag (8)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Packet<'a> {
    pub seq: u32,
    pub nonce: &'a [u8; NONCE_LEN],
    pub ciphertext: &'a [u8],
    pub tag: &'a [u8; TAG_LEN],
}

impl<'a> Packet<'a> {
    /// Split `buf` at the fixed offsets. Nothing is verified beyond length.
    ///
    /// # Errors
    /// Returns [`EnvelopeError::BufferUnderrun`] for buffers shorter than 24 bytes.
    pub fn parse(buf: &'a [u8]) -> Result<Self, EnvelopeError> {
        let underrun = || EnvelopeError::BufferUnderrun { expected: MIN_PACKET_LEN, actual: buf.len() };

        let (seq, rest) = buf.split_first_chunk::<SEQ_LEN>().ok_or_else(underrun)?;
        let (nonce, rest) = rest.split_first_chunk::<NONCE_LEN>().ok_or_else(underrun)?;
        let (ciphertext, tag) = rest.split_last_chunk::<TAG_LEN>().ok_or_else(underrun)?;

        Ok(Self { seq: u32::from_le_bytes(*seq), nonce, ciphertext, tag })
    }

    /// Bytes the tag covers ahead of the ciphertext: nonce then LE sequence number
    #[must_use]
    pub fn header(&self) -> [u8; HEADER_LEN] {
        header(self.nonce, self.seq)
    }
}

pub(crate) fn header(nonce: &[u8; NONCE_LEN], seq: u32) -> [u8; HEADER_LEN] {
    let mut out = [0u8; HEADER_LEN];
    out[..NONCE_LEN].copy_from_slice(nonce);
    out[NONCE_LEN..].copy_from_slice(&seq.to_le_bytes());
    out
}

/// Serialize packet fields in wire order
pub(crate) fn assemble(seq: u32, nonce: &[u8; NONCE_LEN], ciphertext: &[u8], tag: &[u8; TAG_LEN]) -> Vec<u8> {
    let mut out = Vec::with_capacity(MIN_PACKET_LEN + ciphertext.len());
    out.extend_from_slice(&seq.to_le_bytes());
    out.extend_from_slice(nonce);
    out.extend_from_slice(ciphertext);
    out.extend_from_slice(tag);
    out
}
