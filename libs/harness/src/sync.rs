//! Phase gates for the replay protocol.
//!
//! A [`Rendezvous`] is a single-use barrier: constructed for a fixed number
//! of participants, it blocks each caller of [`Rendezvous::arrive_and_wait`]
//! until every participant has arrived, then releases all of them together.
//! The final arrival records a monotonic release instant which the run
//! coordinator later reads to compute elapsed measurement time.
//!
//! A participant that cannot reach a gate (a panicking worker, a failed
//! phase) would leave everyone else blocked forever, so each gate also
//! supports [`Rendezvous::abort`]: it wakes all waiters with an error and
//! turns any later arrival into an error as well. Workers hold an
//! [`AbortGuard`] across the run so unwinding aborts every remaining gate.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use thiserror::Error;

/// A gate was aborted before all participants arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("rendezvous aborted before release")]
pub struct Aborted;

#[derive(Debug)]
struct GateState {
    arrived: usize,
    released_at: Option<Instant>,
    aborted: bool,
}

/// Single-use rendezvous barrier with a recorded release instant.
#[derive(Debug)]
pub struct Rendezvous {
    parties: usize,
    state: Mutex<GateState>,
    released: Condvar,
}

impl Rendezvous {
    /// Gate for exactly `parties` participants.
    ///
    /// # Panics
    ///
    /// Panics if `parties` is zero; a gate nobody arrives at can never
    /// release.
    pub fn new(parties: usize) -> Self {
        assert!(parties > 0, "rendezvous requires at least one participant");
        Self {
            parties,
            state: Mutex::new(GateState {
                arrived: 0,
                released_at: None,
                aborted: false,
            }),
            released: Condvar::new(),
        }
    }

    /// Number of participants this gate waits for.
    pub fn parties(&self) -> usize {
        self.parties
    }

    /// Block until all participants have arrived.
    ///
    /// The final arrival records the release instant, wakes every waiter,
    /// and returns immediately; all callers receive the same instant.
    /// Returns an error if the gate was aborted before it released.
    pub fn arrive_and_wait(&self) -> Result<Instant, Aborted> {
        let mut state = self.lock_state();
        if state.aborted {
            return Err(Aborted);
        }

        state.arrived += 1;
        if state.arrived == self.parties {
            let now = Instant::now();
            state.released_at = Some(now);
            self.released.notify_all();
            return Ok(now);
        }

        while state.released_at.is_none() && !state.aborted {
            state = self
                .released
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        state.released_at.ok_or(Aborted)
    }

    /// Wake every waiter with an error and fail all future arrivals.
    ///
    /// Aborting a gate that has already released is a no-op for the
    /// participants: they are gone and the release instant stays recorded.
    pub fn abort(&self) {
        let mut state = self.lock_state();
        state.aborted = true;
        self.released.notify_all();
    }

    /// The instant the gate released, if it has.
    pub fn release_instant(&self) -> Option<Instant> {
        self.lock_state().released_at
    }

    fn lock_state(&self) -> MutexGuard<'_, GateState> {
        // A worker panicking elsewhere must not wedge the gate; the state
        // is plain counters, safe to reuse after a poison.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Aborts a set of gates when dropped, unless disarmed first.
///
/// Each worker wraps its whole loop in one of these: on a clean pass it
/// disarms the guard after the finish gate, while a panic or phase failure
/// drops the guard armed and releases every peer with [`Aborted`] instead
/// of leaving them blocked.
pub struct AbortGuard<'a> {
    gates: [&'a Rendezvous; 3],
    armed: bool,
}

impl<'a> AbortGuard<'a> {
    pub fn new(gates: [&'a Rendezvous; 3]) -> Self {
        Self { gates, armed: true }
    }

    /// Consume the guard without aborting anything.
    pub fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for AbortGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            for gate in self.gates {
                gate.abort();
            }
        }
    }
}
