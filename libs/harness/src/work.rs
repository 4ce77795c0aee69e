//! Lock-free work distribution across replay workers.
//!
//! One [`WorkQueue`] exists per phase. Workers race to claim slots with a
//! single atomic decrement-and-fetch; there is no ordering between workers'
//! claims, only the guarantee that every slot is handed out exactly once.

use std::sync::atomic::{AtomicI64, Ordering};

use anyhow::{ensure, Result};

/// Distributor that hands out each query slot of a phase to exactly one
/// claimant.
///
/// The claimed counter value `v` maps to slot `len - (v % len) - 1`; as `v`
/// counts down from `budget - 1` to `0`, every claim lands on a distinct
/// slot. The mapping is only injective while `budget <= len`, which is why
/// construction rejects anything larger.
#[derive(Debug)]
pub struct WorkQueue {
    remaining: AtomicI64,
    len: usize,
}

impl WorkQueue {
    /// Queue over `len` slots with a full budget of `len` claims.
    pub fn new(len: usize) -> Result<Self> {
        Self::with_budget(len, len)
    }

    /// Queue over `len` slots handing out at most `budget` claims.
    ///
    /// A budget larger than `len` would let two claimants derive the same
    /// slot from the modulo mapping and corrupt the result buffers, so it
    /// is rejected outright rather than documented away.
    pub fn with_budget(len: usize, budget: usize) -> Result<Self> {
        ensure!(len > 0, "work queue requires at least one slot");
        ensure!(
            budget <= len,
            "phase budget {} exceeds slot count {}",
            budget,
            len
        );
        Ok(Self {
            remaining: AtomicI64::new(budget as i64),
            len,
        })
    }

    /// Claim the next slot, or `None` once the phase budget is exhausted.
    ///
    /// Safe for any number of concurrent callers: the decrement-and-fetch
    /// is a single atomic read-modify-write, so no slot is lost or handed
    /// out twice. Never blocks.
    pub fn claim(&self) -> Option<usize> {
        let v = self.remaining.fetch_sub(1, Ordering::Relaxed) - 1;
        if v < 0 {
            None
        } else {
            Some(self.len - (v as usize % self.len) - 1)
        }
    }
}
