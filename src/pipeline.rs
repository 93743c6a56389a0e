//! Uplink and downlink glue between the snapshot buffer, the codecs, the
//! envelope and an external transport.

use crate::aggregate::{self, RegStats};
use crate::algorithm::Algorithm;
use crate::bench::{self, BenchReport};
use crate::buffer::SnapshotBuffer;
use crate::config::AgentConfig;
use crate::envelope::SecureChannel;
use crate::error::PipelineError;
use crate::frame::FrameCodec;
use crate::snapshot::{self, frame_words, Snapshot};

/// Byte-stream collaborator that delivers packets to the cloud
pub trait Transport {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Deliver `packet` verbatim along with the codec tag of its payload
    fn send(&mut self, algorithm: Algorithm, packet: &[u8]) -> Result<(), Self::Error>;
}

/// What one successful [`Uplink::flush`] sent
#[derive(Debug, Clone)]
pub struct UploadReceipt {
    pub algorithm: Algorithm,
    pub seq: u32,
    pub snapshots: usize,
    pub packet_len: usize,
    /// Per-register min/avg/max of the uploaded batch
    pub stats: Vec<RegStats>,
    pub frame: BenchReport,
    pub delta16: BenchReport,
}

/// Sending side: buffer → compress → seal → transport
#[derive(Debug)]
pub struct Uplink {
    channel: SecureChannel,
    codec: FrameCodec,
    register_count: usize,
}

impl Uplink {
    #[must_use]
    pub fn new(channel: SecureChannel, codec: FrameCodec, register_count: usize) -> Self {
        Self { channel, codec, register_count }
    }

    /// # Errors
    /// Returns [`PipelineError::Config`] or [`PipelineError::Codec`] for an invalid configuration.
    pub fn from_config(config: &AgentConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self::new(config.secure_channel()?, config.frame_codec()?, config.register_count))
    }

    #[must_use]
    pub fn channel(&self) -> &SecureChannel {
        &self.channel
    }

    /// Upload everything pending in `buffer`.
    ///
    /// Returns `Ok(None)` when there was nothing to send. If sealing or sending
    /// fails the drained snapshots are requeued; a sequence number consumed by a
    /// failed send is not reused.
    ///
    /// # Errors
    /// [`PipelineError::Envelope`] when the sequence space is exhausted and
    /// [`PipelineError::Transport`] when the transport rejects the packet.
    pub fn flush<T: Transport>(
        &mut self,
        buffer: &SnapshotBuffer,
        transport: &mut T,
    ) -> Result<Option<UploadReceipt>, PipelineError> {
        let mut batch = buffer.drain();
        if batch.is_empty() {
            return Ok(None);
        }
        for snap in &mut batch {
            snap.registers.resize(self.register_count, None);
        }

        let stats = aggregate::snapshot_stats(&batch);
        let words = snapshot::flatten(&batch);
        let selection = bench::select(&words, &self.codec);
        let algorithm = selection.algorithm();

        let packet = match self.channel.seal(&selection.encoded.bytes) {
            Ok(packet) => packet,
            Err(e) => {
                buffer.requeue(batch);
                return Err(e.into());
            }
        };
        // seal succeeded, so the sequence it used is one below the next
        let seq = self.channel.next_seq().map_or(u32::MAX, |next| next - 1);

        if let Err(e) = transport.send(algorithm, &packet) {
            tracing::warn!(seq, snapshots = batch.len(), "upload failed, requeueing batch");
            buffer.requeue(batch);
            return Err(PipelineError::transport(e));
        }

        tracing::debug!(
            seq,
            %algorithm,
            snapshots = batch.len(),
            compressed = selection.encoded.len(),
            packet = packet.len(),
            "batch uploaded"
        );
        Ok(Some(UploadReceipt {
            algorithm,
            seq,
            snapshots: batch.len(),
            packet_len: packet.len(),
            stats,
            frame: selection.frame,
            delta16: selection.delta16,
        }))
    }
}

/// Receiving side: packet → open → decompress → snapshots
#[derive(Debug)]
pub struct Downlink {
    channel: SecureChannel,
    register_count: usize,
}

impl Downlink {
    #[must_use]
    pub fn new(channel: SecureChannel, register_count: usize) -> Self {
        Self { channel, register_count }
    }

    /// # Errors
    /// Returns [`PipelineError::Config`] or [`PipelineError::Envelope`] for an invalid configuration.
    pub fn from_config(config: &AgentConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self::new(config.secure_channel()?, config.register_count))
    }

    #[must_use]
    pub fn channel(&self) -> &SecureChannel {
        &self.channel
    }

    /// Decode the raw register words carried by `packet`
    ///
    /// # Errors
    /// [`PipelineError::Envelope`] if the packet is rejected (receiver state is
    /// left untouched), [`PipelineError::Codec`] if the payload does not decode.
    pub fn receive_words(&mut self, packet: &[u8], algorithm: Algorithm) -> Result<Vec<u16>, PipelineError> {
        let payload = self.channel.open(packet)?;
        Ok(algorithm.decompress(&payload, frame_words(self.register_count))?)
    }

    /// Decode `packet` into snapshots
    ///
    /// # Errors
    /// As [`receive_words`](Self::receive_words), plus
    /// [`PipelineError::SnapshotLayout`] when the words do not divide into snapshots.
    pub fn receive(&mut self, packet: &[u8], algorithm: Algorithm) -> Result<Vec<Snapshot>, PipelineError> {
        let words = self.receive_words(packet, algorithm)?;
        let width = frame_words(self.register_count);
        if words.len() % width != 0 {
            return Err(PipelineError::SnapshotLayout { words: words.len(), frame_words: width });
        }
        Ok(snapshot::unflatten(&words, self.register_count))
    }
}
