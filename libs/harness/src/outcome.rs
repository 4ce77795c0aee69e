//! Shared per-query result buffers written by the worker pool.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

/// Outcome of one query from the measurement pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOutcome {
    /// Engine call duration for this query.
    pub duration: Duration,
    /// Number of matches the engine returned.
    pub match_count: usize,
    /// False when the engine rejected the query.
    pub succeeded: bool,
}

/// Three parallel arrays indexed by query position: duration, match count,
/// success flag.
///
/// Many workers write here concurrently without locks. Safety rests on the
/// distributor's uniqueness guarantee: within a phase no two workers ever
/// hold the same index, so every slot sees at most one writer per phase.
/// Per-slot atomics with relaxed ordering keep the recording path free of
/// synchronization; the coordinator only reads after joining all workers.
#[derive(Debug)]
pub struct OutcomeBuffers {
    nanos: Vec<AtomicU64>,
    matches: Vec<AtomicU64>,
    succeeded: Vec<AtomicBool>,
}

impl OutcomeBuffers {
    /// Buffers for `len` queries, all slots in the unwritten state.
    pub fn new(len: usize) -> Self {
        Self {
            nanos: (0..len).map(|_| AtomicU64::new(0)).collect(),
            matches: (0..len).map(|_| AtomicU64::new(0)).collect(),
            succeeded: (0..len).map(|_| AtomicBool::new(false)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.nanos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nanos.is_empty()
    }

    /// Clear every slot back to its unwritten state before a run.
    pub fn reset(&self) {
        for slot in &self.nanos {
            slot.store(0, Ordering::Relaxed);
        }
        for slot in &self.matches {
            slot.store(0, Ordering::Relaxed);
        }
        for slot in &self.succeeded {
            slot.store(false, Ordering::Relaxed);
        }
    }

    /// Record a successful query at `index`.
    pub fn record_success(&self, index: usize, duration: Duration, match_count: usize) {
        self.nanos[index].store(duration.as_nanos() as u64, Ordering::Relaxed);
        self.matches[index].store(match_count as u64, Ordering::Relaxed);
        self.succeeded[index].store(true, Ordering::Relaxed);
    }

    /// Record a rejected query at `index`, clearing any warm-up values.
    pub fn record_failure(&self, index: usize) {
        self.nanos[index].store(0, Ordering::Relaxed);
        self.matches[index].store(0, Ordering::Relaxed);
        self.succeeded[index].store(false, Ordering::Relaxed);
    }

    /// Read one slot.
    pub fn outcome(&self, index: usize) -> QueryOutcome {
        QueryOutcome {
            duration: Duration::from_nanos(self.nanos[index].load(Ordering::Relaxed)),
            match_count: self.matches[index].load(Ordering::Relaxed) as usize,
            succeeded: self.succeeded[index].load(Ordering::Relaxed),
        }
    }

    /// Copy out every slot in query-log order.
    pub fn snapshot(&self) -> Vec<QueryOutcome> {
        (0..self.len()).map(|i| self.outcome(i)).collect()
    }
}
