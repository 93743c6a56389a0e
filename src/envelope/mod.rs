//! Sequenced, tagged envelope for compressed payloads.
//!
//! # Packet Layout
//!
//! | Offset | Size | Field | Description |
//! |--------|------|-------|-------------|
//! | 0 | 4 | `seq` | Sender sequence number, little-endian. Starts at 1. |
//! | 4 | 12 | `nonce` | Fresh random bytes per packet |
//! | 16 | n | `ciphertext` | Payload XORed with the `(key, nonce, seq)` keystream |
//! | 16+n | 8 | `tag` | Keyed tag over `nonce || seq (LE) || ciphertext` |
//!
//! # Ordering
//!
//! A receiver accepts a packet only if its tag verifies and its `seq` is strictly
//! greater than every `seq` accepted before. There is no reordering window: a
//! late packet is a rejected packet. Receiver state moves only on success.

mod packet;
mod suite;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::constants::NONCE_LEN;
use crate::error::EnvelopeError;

pub use packet::Packet;
pub use suite::{CipherSuite, LegacySuite};
#[cfg(test)]
pub(crate) use suite::{derive_seed, xorshift32};

// one past the last usable sequence number
const EXHAUSTED: u64 = 1 << 32;

/// Counters a channel needs to resume where it stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelState {
    /// Sequence number the next sealed packet will carry. Values above
    /// `u32::MAX` mark a sender that has used every sequence number.
    pub next_seq: u64,
    /// Highest sequence number accepted so far (0 = none)
    pub last_seq_received: u32,
}

impl Default for ChannelState {
    fn default() -> Self {
        Self { next_seq: 1, last_seq_received: 0 }
    }
}

/// One end of a pre-shared-key link: seals outgoing payloads and opens incoming ones.
///
/// `seal` and `open` take `&mut self`, so sequence allocation and the replay
/// high-water mark have a single writer; share a channel across threads behind a
/// `Mutex`, never by cloning it.
pub struct SecureChannel<S: CipherSuite = LegacySuite> {
    key: Zeroizing<Vec<u8>>,
    suite: S,
    // u64 so that sealing with seq u32::MAX does not wrap back to 0
    next_seq: u64,
    last_seq_received: u32,
    rng: StdRng,
}

impl SecureChannel<LegacySuite> {
    /// Fresh channel with the wire-compatible suite and OS-seeded nonces
    #[must_use]
    pub fn new(key: &[u8]) -> Self {
        Self::from_parts(key, LegacySuite, ChannelState::default(), StdRng::from_os_rng())
    }

    /// Channel resuming from persisted counters
    ///
    /// # Errors
    /// Returns [`EnvelopeError::InvalidState`] when `state.next_seq` is 0.
    pub fn restore(key: &[u8], state: ChannelState) -> Result<Self, EnvelopeError> {
        Self::with_suite(key, LegacySuite, state, StdRng::from_os_rng())
    }
}

impl<S: CipherSuite> SecureChannel<S> {
    /// Channel with an explicit suite, starting counters and nonce generator.
    ///
    /// A `next_seq` past `u32::MAX` restores an exhausted sender.
    ///
    /// # Errors
    /// Returns [`EnvelopeError::InvalidState`] when `state.next_seq` is 0.
    pub fn with_suite(key: &[u8], suite: S, state: ChannelState, rng: StdRng) -> Result<Self, EnvelopeError> {
        if state.next_seq == 0 {
            return Err(EnvelopeError::InvalidState { next_seq: state.next_seq });
        }
        Ok(Self::from_parts(key, suite, state, rng))
    }

    fn from_parts(key: &[u8], suite: S, state: ChannelState, rng: StdRng) -> Self {
        Self {
            key: Zeroizing::new(key.to_vec()),
            suite,
            next_seq: state.next_seq.min(EXHAUSTED),
            last_seq_received: state.last_seq_received,
            rng,
        }
    }

    /// Sequence number the next [`seal`](Self::seal) will use, `None` once exhausted
    #[must_use]
    pub fn next_seq(&self) -> Option<u32> {
        u32::try_from(self.next_seq).ok()
    }

    #[must_use]
    pub fn last_seq_received(&self) -> u32 {
        self.last_seq_received
    }

    /// Snapshot of the counters for persistence
    #[must_use]
    pub fn state(&self) -> ChannelState {
        ChannelState { next_seq: self.next_seq, last_seq_received: self.last_seq_received }
    }

    /// Encrypt and tag `plaintext` under the next sequence number and a fresh nonce.
    ///
    /// # Errors
    /// Returns [`EnvelopeError::SequenceExhausted`] after `u32::MAX` packets.
    pub fn seal(&mut self, plaintext: &[u8]) -> Result<Vec<u8>, EnvelopeError> {
        let mut nonce = [0u8; NONCE_LEN];
        self.rng.fill_bytes(&mut nonce);
        self.seal_with_nonce(plaintext, &nonce)
    }

    pub(crate) fn seal_with_nonce(&mut self, plaintext: &[u8], nonce: &[u8; NONCE_LEN]) -> Result<Vec<u8>, EnvelopeError> {
        let seq = self.next_seq().ok_or(EnvelopeError::SequenceExhausted)?;

        let mut ciphertext = plaintext.to_vec();
        self.suite.apply_keystream(&self.key, nonce, seq, &mut ciphertext);
        let tag = self.suite.tag(&self.key, &packet::header(nonce, seq), &ciphertext);

        self.next_seq += 1;
        tracing::trace!(seq, len = plaintext.len(), "sealed packet");
        Ok(packet::assemble(seq, nonce, &ciphertext, &tag))
    }

    /// Verify and decrypt a packet.
    ///
    /// Checks run in order: length, tag, sequence. Only a packet passing all
    /// three raises the replay high-water mark.
    ///
    /// # Errors
    /// - [`EnvelopeError::BufferUnderrun`] for packets under 24 bytes
    /// - [`EnvelopeError::TagMismatch`] for corrupted or forged packets
    /// - [`EnvelopeError::ReplayOrOutOfOrder`] when `seq` does not exceed the last accepted one
    pub fn open(&mut self, buf: &[u8]) -> Result<Vec<u8>, EnvelopeError> {
        let packet = Packet::parse(buf)?;

        let expected = self.suite.tag(&self.key, &packet.header(), packet.ciphertext);
        if !tags_equal(&expected, packet.tag) {
            tracing::warn!(seq = packet.seq, "envelope tag mismatch");
            return Err(EnvelopeError::TagMismatch);
        }

        if packet.seq <= self.last_seq_received {
            tracing::warn!(seq = packet.seq, last = self.last_seq_received, "envelope replay rejected");
            return Err(EnvelopeError::ReplayOrOutOfOrder { seq: packet.seq, last: self.last_seq_received });
        }

        let mut plaintext = packet.ciphertext.to_vec();
        self.suite.apply_keystream(&self.key, packet.nonce, packet.seq, &mut plaintext);
        self.last_seq_received = packet.seq;
        tracing::trace!(seq = packet.seq, len = plaintext.len(), "opened packet");
        Ok(plaintext)
    }
}

impl<S: CipherSuite> std::fmt::Debug for SecureChannel<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureChannel")
            .field("next_seq", &self.next_seq)
            .field("last_seq_received", &self.last_seq_received)
            .finish_non_exhaustive()
    }
}

/// Compare without short-circuiting on the first differing byte
fn tags_equal(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
