//! Per-register min/avg/max over a batch of readings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::snapshot::{Sample, Snapshot};

/// Summary of one register across a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegStats {
    pub register: u16,
    pub min: u16,
    pub max: u16,
    /// Integer mean, rounded down
    pub avg: u16,
    /// Readings that contributed
    pub count: usize,
}

#[derive(Default)]
struct Acc {
    sum: u64,
    min: u16,
    max: u16,
    count: usize,
}

impl Acc {
    fn add(&mut self, value: u16) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.sum += u64::from(value);
        self.count += 1;
    }
}

fn finish(acc: BTreeMap<u16, Acc>) -> Vec<RegStats> {
    acc.into_iter()
        .map(|(register, a)| RegStats {
            register,
            min: a.min,
            max: a.max,
            // mean of u16 values fits in u16
            avg: u16::try_from(a.sum / a.count as u64).unwrap_or(u16::MAX),
            count: a.count,
        })
        .collect()
}

/// Aggregate raw samples by register address, ascending.
///
/// Registers without samples do not appear.
#[must_use]
pub fn min_avg_max(samples: &[Sample]) -> Vec<RegStats> {
    let mut acc: BTreeMap<u16, Acc> = BTreeMap::new();
    for s in samples {
        acc.entry(s.register).or_default().add(s.raw);
    }
    finish(acc)
}

/// Aggregate the read registers of a snapshot batch, ascending by register index.
///
/// Unread registers are skipped rather than counted as `0xFFFF`.
#[must_use]
pub fn snapshot_stats(snapshots: &[Snapshot]) -> Vec<RegStats> {
    let mut acc: BTreeMap<u16, Acc> = BTreeMap::new();
    for snap in snapshots {
        for (reg, value) in snap.registers.iter().enumerate() {
            let (Some(value), Ok(reg)) = (value, u16::try_from(reg)) else {
                continue;
            };
            acc.entry(reg).or_default().add(*value);
        }
    }
    finish(acc)
}
