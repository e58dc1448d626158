//! A fair binary semaphore used to linearize competing readers or writers on
//! shared-end channels. Unlike `std::sync::Mutex` (whose wakeup order is not
//! specified), this keeps an explicit FIFO ticket queue so ordering among
//! competing claimers does not depend on the host platform's condvar queue
//! discipline.
use std::sync::{Arc, Condvar, Mutex};

use crate::error::{lock_result, Result};

/// Internal ticket-queue state, guarded by `FairMutex::cond`'s mutex.
#[derive(Debug, Default)]
struct State {
    /// `true` while some thread holds the claim.
    claimed: bool,
    /// Ticket handed to the next `claim()` caller.
    next_ticket: u64,
    /// Ticket currently permitted to proceed.
    now_serving: u64,
}

/// Fair FIFO mutex. `claim()` blocks until this caller's ticket is being
/// served and no one else holds the claim; the returned guard releases on
/// drop.
#[derive(Debug, Default)]
pub(crate) struct FairMutex {
    state: Mutex<State>,
    cond: Condvar,
}

impl FairMutex {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Blocks until ownership is obtained, in strict arrival order. Takes
    /// `self` behind an `Arc` (rather than borrowing) so the returned guard
    /// can outlive the call that created it — needed to bracket an extended
    /// rendezvous (`start_read` ... `end_read`) on a shared read end, where
    /// the claim must be held across two separate method calls.
    pub(crate) fn claim(self: &Arc<Self>) -> Result<FairMutexGuard> {
        let mut guard = lock_result(self.state.lock())?;
        let my_ticket = guard.next_ticket;
        guard.next_ticket += 1;

        while guard.claimed || guard.now_serving != my_ticket {
            log::trace!("FairMutex: ticket {my_ticket} waiting, now serving {}", guard.now_serving);
            guard = lock_result(self.cond.wait(guard))?;
        }
        guard.claimed = true;
        drop(guard);
        Ok(FairMutexGuard {
            mutex: Arc::clone(self),
        })
    }

    /// Unblocks the longest-waiting claimer.
    fn release(&self) {
        let Ok(mut guard) = self.state.lock() else {
            // A panicking prior holder already poisoned the lock; there is
            // nothing useful left to serialize, but we must not panic again
            // inside a Drop impl, so this this is the one place that
            // tolerates lock poisoning silently.
            return;
        };
        guard.claimed = false;
        guard.now_serving += 1;
        self.cond.notify_all();
    }
}

/// RAII claim on a [`FairMutex`]; releases on drop, unblocking the next
/// ticket holder. Owns its `Arc<FairMutex>` rather than borrowing so it can
/// be stashed across separate method calls (see [`FairMutex::claim`]).
pub(crate) struct FairMutexGuard {
    mutex: Arc<FairMutex>,
}

impl Drop for FairMutexGuard {
    fn drop(&mut self) {
        self.mutex.release();
    }
}
