//! Benchmark harness and compressor selection.
//!
//! Both codecs run over the same values; the frame codec wins only when it
//! round-trips exactly and is strictly smaller than Delta16Var.

use std::time::{Duration, Instant};

use crate::algorithm::{Algorithm, Encoded};
use crate::delta16;
use crate::frame::FrameCodec;

/// Size, timing and losslessness of one codec over one input
#[derive(Debug, Clone, PartialEq)]
pub struct BenchReport {
    /// Algorithm that actually produced the bytes (a frame fallback reports Delta16Var)
    pub method: Algorithm,
    pub sample_count: usize,
    pub original_bytes: usize,
    pub compressed_bytes: usize,
    pub lossless: bool,
    pub compress_time: Duration,
    pub decompress_time: Duration,
}

impl BenchReport {
    /// Compression ratio, original over compressed (1.0 for empty input)
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn ratio(&self) -> f64 {
        if self.compressed_bytes == 0 {
            return 1.0;
        }
        self.original_bytes as f64 / self.compressed_bytes as f64
    }

    /// Space saved as a percentage of the original size
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn reduction_percent(&self) -> f64 {
        if self.original_bytes == 0 {
            return 0.0;
        }
        100.0 * (self.original_bytes as f64 - self.compressed_bytes as f64) / self.original_bytes as f64
    }
}

/// Outcome of [`select`]: the bytes to upload plus both reports
#[derive(Debug, Clone)]
pub struct Selection {
    pub encoded: Encoded,
    pub frame: BenchReport,
    pub delta16: BenchReport,
}

impl Selection {
    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.encoded.algorithm
    }
}

fn measure(values: &[u16], compress: impl FnOnce(&[u16]) -> Encoded, width: usize) -> (BenchReport, Encoded) {
    let t0 = Instant::now();
    let encoded = compress(values);
    let compress_time = t0.elapsed();

    let t1 = Instant::now();
    let decoded = encoded.algorithm.decompress(&encoded.bytes, width);
    let decompress_time = t1.elapsed();

    let report = BenchReport {
        method: encoded.algorithm,
        sample_count: values.len(),
        original_bytes: values.len() * 2,
        compressed_bytes: encoded.len(),
        lossless: matches!(decoded, Ok(ref d) if d == values),
        compress_time,
        decompress_time,
    };
    (report, encoded)
}

/// Benchmark Delta16Var over `values`
#[must_use]
pub fn benchmark_delta16(values: &[u16]) -> BenchReport {
    measure(
        values,
        |v| Encoded { algorithm: Algorithm::Delta16Var, bytes: delta16::compress(v) },
        0,
    )
    .0
}

/// Benchmark the frame codec over `values`
#[must_use]
pub fn benchmark_frame(values: &[u16], codec: &FrameCodec) -> BenchReport {
    measure(values, |v| codec.compress(v), codec.width()).0
}

/// Run both codecs and keep the frame output only if it is lossless and strictly smaller.
#[must_use]
pub fn select(values: &[u16], codec: &FrameCodec) -> Selection {
    let (frame, frame_bytes) = measure(values, |v| codec.compress(v), codec.width());
    let (delta16, delta_bytes) = measure(
        values,
        |v| Encoded { algorithm: Algorithm::Delta16Var, bytes: delta16::compress(v) },
        0,
    );

    let encoded = if frame.lossless
        && frame.method == Algorithm::TimeSeriesS4
        && frame.compressed_bytes < delta16.compressed_bytes
    {
        frame_bytes
    } else {
        delta_bytes
    };

    tracing::debug!(
        samples = values.len(),
        frame_bytes = frame.compressed_bytes,
        delta16_bytes = delta16.compressed_bytes,
        frame_lossless = frame.lossless,
        chosen = %encoded.algorithm,
        "compressor selected"
    );

    Selection { encoded, frame, delta16 }
}
