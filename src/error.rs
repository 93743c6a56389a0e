//! Error types for regframe codecs, the secure envelope and the uplink pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Error returned when compressing or decompressing register values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Input ended before a complete varint, frame or absolute value was consumed.
    ///
    /// `recovered` holds every value fully decoded before the cut, so callers can
    /// salvage a prefix while still knowing the blob was incomplete.
    #[error("input truncated at byte {offset} after {} decoded values", .recovered.len())]
    Truncated { offset: usize, recovered: Vec<u16> },

    /// Value count is not a multiple of the frame width
    #[error("{len} values do not divide into frames of {width} registers")]
    FrameWidthMismatch { len: usize, width: usize },

    /// Frame width outside what the 16-bit change mask can describe
    #[error("frame width {width} is outside 1..=16")]
    FrameWidthOutOfRange { width: usize },

    /// Change mask flags registers beyond the frame width
    #[error("change mask {mask:#06x} has bits beyond frame width {width}")]
    InvalidMask { mask: u16, width: usize },

    /// Small-delta range does not fit a 4-bit nibble or excludes zero
    #[error("small-delta range [{min}, {max}] must lie within [-8, 7] and contain 0")]
    InvalidDeltaRange { min: i8, max: i8 },

    /// Varint runs past 32 bits
    #[error("varint at byte {offset} exceeds 32 bits")]
    VarintOverflow { offset: usize },
}

impl CodecError {
    /// Values decoded before the failure, if any were recoverable
    #[must_use]
    pub fn recovered(&self) -> &[u16] {
        match self {
            Self::Truncated { recovered, .. } => recovered,
            _ => &[],
        }
    }
}

/// Unrecognized algorithm name
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown compression algorithm `{0}`")]
pub struct UnknownAlgorithm(pub String);

/// Error returned when opening or sealing an envelope packet
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeError {
    /// Packet shorter than sequence + nonce + tag
    #[error("packet too short: expected at least {expected} bytes, got {actual}")]
    BufferUnderrun { expected: usize, actual: usize },

    /// Recomputed tag differs from the received one
    #[error("authentication tag mismatch")]
    TagMismatch,

    /// Sequence number not above the receiver's high-water mark
    #[error("sequence {seq} rejected, last accepted was {last}")]
    ReplayOrOutOfOrder { seq: u32, last: u32 },

    /// Sender used every 32-bit sequence number
    #[error("sender sequence space exhausted")]
    SequenceExhausted,

    /// Persisted counters no channel could have produced
    #[error("invalid channel state: next_seq {next_seq} (sequence numbers start at 1)")]
    InvalidState { next_seq: u64 },
}

/// Error returned when loading or validating agent configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config field `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Error returned by the uplink and downlink pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Envelope(#[from] EnvelopeError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("transport failed")]
    Transport {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Decompressed words disagree with the snapshot layout
    #[error("decoded {words} words do not form snapshots of {frame_words} words")]
    SnapshotLayout { words: usize, frame_words: usize },
}

impl PipelineError {
    /// Wrap a transport collaborator's failure
    pub fn transport<E>(source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Transport { source: source.into() }
    }

    /// Returns whether retrying the same operation later may succeed.
    ///
    /// Only transport failures qualify; a rejected or corrupt packet stays
    /// rejected no matter how often it is replayed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::Codec(_) | Self::Envelope(_) | Self::Config(_) | Self::SnapshotLayout { .. } => false,
        }
    }
}
