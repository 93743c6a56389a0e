//! `regframe` - Register time series compression and secure framing for inverter gateways
//!
//! Polled Modbus-style registers arrive as 16-bit words that mostly drift by a few
//! counts between polls. This crate packs them with one of two lossless codecs,
//! picks whichever is smaller for the batch at hand, and wraps the result in a
//! sequenced, tagged envelope before it is handed to the uplink transport.
//!
//! # Example
//! ```
//! use regframe::{bench, envelope::SecureChannel, Algorithm, FrameCodec};
//!
//! // two frames of three registers
//! let values = [230u16, 4998, 512, 231, 4997, 512];
//! let codec = FrameCodec::new(3).unwrap();
//! let selection = bench::select(&values, &codec);
//!
//! let psk = [7u8; 16];
//! let mut gateway = SecureChannel::new(&psk);
//! let mut cloud = SecureChannel::new(&psk);
//!
//! let packet = gateway.seal(&selection.encoded.bytes).unwrap();
//! let payload = cloud.open(&packet).unwrap();
//! let decoded = selection.algorithm().decompress(&payload, codec.width()).unwrap();
//! assert_eq!(decoded, values);
//! ```
//!
//! # Codecs
//!
//! ## Delta16Var
//!
//! | Field | Encoding |
//! |-------|----------|
//! | seed | first value, 2 bytes big-endian |
//! | deltas | `varint(zigzag(v[i] - v[i-1]))`, 1-5 bytes each |
//!
//! ## TimeSeriesS4 (frame codec)
//!
//! | Part | Encoding |
//! |------|----------|
//! | baseline | first frame, `width` big-endian u16 |
//! | per frame: mask | u16 little-endian, bit `j` = register `j` escaped |
//! | per frame: nibbles | `ceil(width/2)` bytes, 4-bit signed deltas, even register in the high nibble |
//! | per frame: absolutes | big-endian u16 per escaped register, ascending |
//!
//! Each frame is relative to the one before it. Input that does not divide into
//! frames falls back to Delta16Var and is reported as such.
//!
//! # Selection
//!
//! TimeSeriesS4 is used only when it round-trips exactly and is strictly smaller
//! than Delta16Var. The chosen [`Algorithm`] travels out of band with the packet.
//!
//! # Envelope
//!
//! `seq (u32 LE) | nonce (12) | ciphertext | tag (8)`. Receivers require strictly
//! increasing `seq`. See [`envelope`] for details.
//!
//! ## Supported Ranges
//! - Frame width: 1-16 registers (one mask bit each)
//! - Snapshots: up to 10 registers plus 6 timestamp words per frame
//! - Sequence numbers: 1 to `u32::MAX` per channel

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]

pub mod aggregate;
mod algorithm;
pub mod bench;
mod buffer;
mod config;
mod constants;
pub mod delta16;
pub mod envelope;
mod error;
pub mod frame;
mod pipeline;
pub mod snapshot;
pub mod varint;


// Re-export public API
pub use aggregate::RegStats;
pub use algorithm::{Algorithm, Encoded};
pub use bench::{BenchReport, Selection};
pub use buffer::SnapshotBuffer;
pub use config::{AgentConfig, DEFAULT_PSK, DEFAULT_REGISTER_COUNT};
pub use constants::{HEADER_LEN, MIN_PACKET_LEN, NONCE_LEN, SEQ_LEN, TAG_LEN};
pub use envelope::{ChannelState, Packet, SecureChannel};
pub use error::{CodecError, ConfigError, EnvelopeError, PipelineError, UnknownAlgorithm};
pub use frame::{DeltaRange, FrameCodec};
pub use pipeline::{Downlink, Transport, UploadReceipt, Uplink};
pub use snapshot::{Sample, Snapshot, Timestamp};
