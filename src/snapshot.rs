//! Register snapshots and their flattened word layout.
//!
//! A snapshot flattens to `6 + register_count` words: year, month, day, hour,
//! minute, second, then one word per register. Registers that were not read are
//! written as `0xFFFF`. The frame codec is run with that word count as its width.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{TIMESTAMP_WORDS, UNREAD_REGISTER};

/// One polled register reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    /// Acquisition time, seconds
    pub timestamp: u64,
    pub register: u16,
    pub raw: u16,
}

/// Wall-clock time of a snapshot as the gateway reports it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp {
    pub year: u16,
    pub month: u16,
    pub day: u16,
    pub hour: u16,
    pub minute: u16,
    pub second: u16,
}

impl Timestamp {
    /// Parse `YYYY-MM-DD HH:MM:SS` (a `T` separator is accepted too)
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let (date, time) = s.trim().split_once([' ', 'T'])?;
        let mut d = date.splitn(3, '-').map(|p| p.trim().parse::<u16>());
        let mut t = time.splitn(3, ':').map(|p| p.trim().parse::<u16>());
        Some(Self {
            year: d.next()?.ok()?,
            month: d.next()?.ok()?,
            day: d.next()?.ok()?,
            hour: t.next()?.ok()?,
            minute: t.next()?.ok()?,
            second: t.next()?.ok()?,
        })
    }

    /// Parse, or fall back to the all-zero timestamp the gateway sends for unknown times
    #[must_use]
    pub fn parse_or_zero(s: &str) -> Self {
        Self::parse(s).unwrap_or_default()
    }

    fn words(self) -> [u16; TIMESTAMP_WORDS] {
        [self.year, self.month, self.day, self.hour, self.minute, self.second]
    }

    fn from_words(w: &[u16]) -> Self {
        Self { year: w[0], month: w[1], day: w[2], hour: w[3], minute: w[4], second: w[5] }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// Readings of every register at one instant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub timestamp: Timestamp,
    /// Indexed by register address; `None` for registers that were not read
    pub registers: Vec<Option<u16>>,
}

impl Snapshot {
    #[must_use]
    pub fn new(timestamp: Timestamp, registers: Vec<Option<u16>>) -> Self {
        Self { timestamp, registers }
    }

    /// Collect samples into a snapshot of `register_count` registers.
    ///
    /// Samples addressing registers past `register_count` are ignored; a later
    /// sample for the same register overwrites an earlier one.
    #[must_use]
    pub fn from_samples(timestamp: Timestamp, register_count: usize, samples: &[Sample]) -> Self {
        let mut registers = vec![None; register_count];
        for s in samples {
            if let Some(slot) = registers.get_mut(usize::from(s.register)) {
                *slot = Some(s.raw);
            }
        }
        Self { timestamp, registers }
    }
}

/// Words per snapshot for `register_count` registers
#[must_use]
pub const fn frame_words(register_count: usize) -> usize {
    TIMESTAMP_WORDS + register_count
}

/// Flatten snapshots to the word stream handed to the compressors
#[must_use]
pub fn flatten(snapshots: &[Snapshot]) -> Vec<u16> {
    let mut out = Vec::with_capacity(snapshots.iter().map(|s| frame_words(s.registers.len())).sum());
    for snap in snapshots {
        out.extend_from_slice(&snap.timestamp.words());
        out.extend(snap.registers.iter().map(|r| r.unwrap_or(UNREAD_REGISTER)));
    }
    out
}

/// Rebuild snapshots from a decoded word stream.
///
/// Words are grouped by `6 + register_count`; a trailing incomplete group is
/// dropped. `0xFFFF` register words come back as `None`.
#[must_use]
pub fn unflatten(words: &[u16], register_count: usize) -> Vec<Snapshot> {
    words
        .chunks_exact(frame_words(register_count))
        .map(|frame| {
            let (ts, regs) = frame.split_at(TIMESTAMP_WORDS);
            Snapshot {
                timestamp: Timestamp::from_words(ts),
                registers: regs.iter().map(|&w| (w != UNREAD_REGISTER).then_some(w)).collect(),
            }
        })
        .collect()
}
