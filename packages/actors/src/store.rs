//! Shared state store for queue lengths and the open/closed flag.

use std::sync::{Mutex, MutexGuard, PoisonError};

use post_core::{QueueSnapshot, SERVICE_COUNT, ServiceKind};
use rand::Rng;
use rand::seq::SliceRandom;

/// State guarded by the office mutex.
#[derive(Debug, Clone)]
pub struct OfficeState {
    /// Waiting clients per service.
    queues: [u32; SERVICE_COUNT],
    /// Whether clients are still admitted.
    open: bool,
    admitted: u32,
    turned_away: u32,
    served: u32,
    released: u32,
}

impl Default for OfficeState {
    fn default() -> Self {
        Self {
            queues: [0; SERVICE_COUNT],
            open: true,
            admitted: 0,
            turned_away: 0,
            served: 0,
            released: 0,
        }
    }
}

impl OfficeState {
    fn snapshot(&self) -> QueueSnapshot {
        QueueSnapshot {
            lengths: self.queues,
        }
    }
}

/// Outcome of a worker trying to pick up a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
    /// One client of this service is now committed to the worker.
    Serve(ServiceKind),
    /// Nobody was waiting; `open` is the office flag read in the same
    /// critical section.
    Idle { open: bool },
}

/// Client counters accumulated over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub admitted: u32,
    pub turned_away: u32,
    pub served: u32,
    pub released: u32,
}

/// Pick a service uniformly among the queues that have someone waiting.
pub fn choose_nonempty<R: Rng + ?Sized>(
    snapshot: &QueueSnapshot,
    rng: &mut R,
) -> Option<ServiceKind> {
    let candidates: Vec<ServiceKind> = snapshot.nonempty().collect();
    candidates.choose(rng).copied()
}

/// The single store every actor reads and mutates.
///
/// All access goes through one mutex. No method holds it across a wait, so
/// the critical sections are a handful of integer operations.
#[derive(Debug, Default)]
pub struct OfficeStore {
    state: Mutex<OfficeState>,
}

impl OfficeStore {
    /// Create an open office with empty queues.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, OfficeState> {
        // Plain counters stay consistent even if a holder panicked.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current queue lengths.
    pub fn read_queue_snapshot(&self) -> QueueSnapshot {
        self.lock().snapshot()
    }

    pub fn is_open(&self) -> bool {
        self.lock().open
    }

    /// Put a client in the queue for `service` if the office is open.
    ///
    /// The open check and the increment form one critical section, so no
    /// client can join after [`OfficeStore::set_closed`] returns.
    pub fn enqueue(&self, service: ServiceKind) -> bool {
        let mut state = self.lock();
        if state.open {
            state.queues[service.index()] += 1;
            state.admitted += 1;
            true
        } else {
            state.turned_away += 1;
            false
        }
    }

    /// Commit to one waiting client, chosen uniformly among nonempty queues.
    pub fn try_claim_from_nonempty_queue<R: Rng + ?Sized>(&self, rng: &mut R) -> Claim {
        let mut state = self.lock();
        match choose_nonempty(&state.snapshot(), rng) {
            Some(service) => {
                state.queues[service.index()] -= 1;
                state.served += 1;
                Claim::Serve(service)
            }
            None => Claim::Idle { open: state.open },
        }
    }

    /// Stop admitting clients. Returns whether the office was open before.
    pub fn set_closed(&self) -> bool {
        let mut state = self.lock();
        std::mem::replace(&mut state.open, false)
    }

    /// Remove every waiting client and return how many were in each queue.
    ///
    /// The caller owes each of them one rendezvous release.
    pub fn drain(&self) -> QueueSnapshot {
        let mut state = self.lock();
        let drained = state.snapshot();
        state.queues = [0; SERVICE_COUNT];
        state.released += drained.total();
        drained
    }

    pub fn tally(&self) -> Tally {
        let state = self.lock();
        Tally {
            admitted: state.admitted,
            turned_away: state.turned_away,
            served: state.served,
            released: state.released,
        }
    }
}
