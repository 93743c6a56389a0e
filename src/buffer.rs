//! Bounded hand-off between acquisition and upload.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::snapshot::Snapshot;

/// Pending snapshots awaiting compression.
///
/// Producers [`push`](Self::push); the single uploader takes everything at once
/// with [`drain`](Self::drain), so a batch is never read while being appended to.
#[derive(Debug)]
pub struct SnapshotBuffer {
    inner: Mutex<VecDeque<Snapshot>>,
    capacity: usize,
}

impl SnapshotBuffer {
    /// Buffer holding at most `capacity` snapshots (at least one)
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { inner: Mutex::new(VecDeque::with_capacity(capacity)), capacity }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Snapshot>> {
        // a panicking producer leaves the queue structurally intact
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a snapshot.
    ///
    /// A snapshot with the same timestamp as the newest one replaces it. When
    /// full, the oldest snapshot is evicted and returned.
    pub fn push(&self, snapshot: Snapshot) -> Option<Snapshot> {
        let mut q = self.lock();
        if let Some(last) = q.back_mut() {
            if last.timestamp == snapshot.timestamp {
                *last = snapshot;
                return None;
            }
        }
        let evicted = if q.len() >= self.capacity { q.pop_front() } else { None };
        if let Some(old) = &evicted {
            tracing::warn!(timestamp = %old.timestamp, "snapshot buffer full, dropping oldest");
        }
        q.push_back(snapshot);
        evicted
    }

    /// Take every pending snapshot, leaving the buffer empty
    #[must_use]
    pub fn drain(&self) -> Vec<Snapshot> {
        let batch: Vec<_> = self.lock().drain(..).collect();
        tracing::debug!(count = batch.len(), "snapshot buffer drained");
        batch
    }

    /// Put a drained batch back ahead of anything pushed since.
    ///
    /// Oldest entries are dropped if the combined length exceeds capacity.
    pub fn requeue(&self, batch: Vec<Snapshot>) {
        let mut q = self.lock();
        let newer = std::mem::take(&mut *q);
        q.extend(batch);
        q.extend(newer);
        let overflow = q.len().saturating_sub(self.capacity);
        if overflow > 0 {
            tracing::warn!(dropped = overflow, "snapshot buffer overflow on requeue");
            q.drain(..overflow);
        }
        tracing::debug!(count = q.len(), "snapshot batch requeued");
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
