//! Agent configuration loaded from TOML.
//!
//! ```toml
//! register_count = 10
//! psk = [0x23, 0xAF, 0x77, 0x1D, 0x9B, 0x0F, 0xA5, 0x44, 0xC1, 0xE9, 0x56, 0x72, 0xAA, 0xDE, 0x19, 0xBB]
//! buffer_capacity = 64
//!
//! [delta_range]
//! min = -8
//! max = 7
//!
//! [channel]
//! next_seq = 1
//! last_seq_received = 0
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::MAX_FRAME_WIDTH;
use crate::envelope::{ChannelState, SecureChannel};
use crate::error::{CodecError, ConfigError, EnvelopeError};
use crate::frame::{DeltaRange, FrameCodec};
use crate::snapshot::frame_words;

/// Key shared by deployed gateways and the cloud decoder
pub const DEFAULT_PSK: [u8; 16] = [
    0x23, 0xAF, 0x77, 0x1D, 0x9B, 0x0F, 0xA5, 0x44, 0xC1, 0xE9, 0x56, 0x72, 0xAA, 0xDE, 0x19, 0xBB,
];

/// Registers polled per snapshot on the reference inverter
pub const DEFAULT_REGISTER_COUNT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AgentConfig {
    /// Registers per snapshot; frames carry six more timestamp words
    pub register_count: usize,
    /// Pre-shared envelope key
    pub psk: Vec<u8>,
    /// Deltas stored as nibbles by the frame codec
    pub delta_range: DeltaRange,
    /// Snapshots held before the oldest is dropped
    pub buffer_capacity: usize,
    /// Counters to resume the secure channel from
    pub channel: ChannelState,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            register_count: DEFAULT_REGISTER_COUNT,
            psk: DEFAULT_PSK.to_vec(),
            delta_range: DeltaRange::FULL,
            buffer_capacity: 64,
            channel: ChannelState::default(),
        }
    }
}

impl AgentConfig {
    /// Parse and validate a TOML document
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Invalid`] for values [`validate`](Self::validate) rejects.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    /// As [`from_toml_str`](Self::from_toml_str), plus [`ConfigError::Io`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), register_count = config.register_count, "config loaded");
        Ok(config)
    }

    /// # Errors
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let width = frame_words(self.register_count);
        if self.register_count == 0 || width > MAX_FRAME_WIDTH {
            return Err(ConfigError::Invalid {
                field: "register_count",
                reason: format!("must be 1..={}, got {}", MAX_FRAME_WIDTH - frame_words(0), self.register_count),
            });
        }
        if self.psk.is_empty() {
            return Err(ConfigError::Invalid { field: "psk", reason: "must not be empty".into() });
        }
        if self.buffer_capacity == 0 {
            return Err(ConfigError::Invalid { field: "buffer_capacity", reason: "must be at least 1".into() });
        }
        if self.channel.next_seq == 0 {
            return Err(ConfigError::Invalid { field: "channel.next_seq", reason: "sequence numbers start at 1".into() });
        }
        Ok(())
    }

    /// Frame width used for flattened snapshots
    #[must_use]
    pub fn frame_width(&self) -> usize {
        frame_words(self.register_count)
    }

    /// Frame codec for this configuration
    ///
    /// # Errors
    /// Returns [`CodecError::FrameWidthOutOfRange`] if the register count is too large.
    pub fn frame_codec(&self) -> Result<FrameCodec, CodecError> {
        Ok(FrameCodec::new(self.frame_width())?.with_delta_range(self.delta_range))
    }

    /// Secure channel keyed with the PSK, resuming from the configured counters
    ///
    /// # Errors
    /// Returns [`EnvelopeError::InvalidState`] for a zero `channel.next_seq`.
    pub fn secure_channel(&self) -> Result<SecureChannel, EnvelopeError> {
        SecureChannel::restore(&self.psk, self.channel)
    }
}
