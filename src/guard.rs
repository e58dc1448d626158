//! Events an `Alternative` can wait upon. A channel-read guard lives in
//! `crate::channel`, next to the kernel state it inspects; this module holds
//! the guard trait itself plus the multiplicity-independent guards
//! (timeout, skip, barrier).
use std::cell::Cell;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::alt_signal::{deadline_from, AltSignal};
use crate::error::lock_result;

/// A capability-bearing handle an [`crate::alt::Alternative`] can wait upon.
///
/// `enable`/`disable` implement a two-phase protocol: `enable` reports
/// whether the event is ready *right now*, and if not, registers `signal` so
/// a later event on this guard can wake the ALT. `disable` undoes that
/// registration and re-checks readiness.
pub trait Guard: Send {
    /// Called once per guard, in index order, during the enable phase.
    /// Returns `Ok(true)` if the guard is immediately ready.
    ///
    /// # Errors
    /// Returns `Err` for a programmer error (e.g. [`ChannelError::MisuseAlt`]
    /// surfaced as `io::Error`) or a poisoned internal lock.
    fn enable(&self, signal: &Arc<AltSignal>) -> io::Result<bool>;

    /// Called once per guard, in reverse index order, during the disable
    /// phase. Returns whether the guard is ready at the moment of disable.
    ///
    /// # Errors
    /// Propagates the same failure kinds as [`Guard::enable`].
    fn disable(&self) -> io::Result<bool>;

    /// The absolute instant this guard would become ready purely from the
    /// passage of time, if any. Used by the `Alternative` to bound how long
    /// it blocks between enable and disable. Guards with no deadline (the
    /// common case) use the default.
    fn deadline(&self) -> Option<Instant> {
        None
    }
}

/// A guard that is always ready. Used to express "do this if nothing else
/// is ready, without blocking" when placed last among a set of guards
/// alongside `priSelect`.
#[derive(Debug, Default)]
pub struct SkipGuard;

impl SkipGuard {
    /// Creates a new skip guard.
    pub fn new() -> Self {
        Self
    }
}

impl Guard for SkipGuard {
    fn enable(&self, _signal: &Arc<AltSignal>) -> io::Result<bool> {
        Ok(true)
    }

    fn disable(&self) -> io::Result<bool> {
        Ok(true)
    }
}

/// A guard that becomes ready once a fixed point in time has passed. The
/// sole deadline mechanism for an ALT: there is no external cancellation, so
/// a bounded wait has to be expressed as a guard like any other event.
#[derive(Debug)]
pub struct TimeoutGuard {
    deadline: Instant,
}

impl TimeoutGuard {
    /// Creates a guard that fires `duration` from now.
    pub fn new(duration: Duration) -> Self {
        Self {
            deadline: deadline_from(duration),
        }
    }

    /// Creates a guard that fires at a specific absolute instant.
    pub fn at(deadline: Instant) -> Self {
        Self { deadline }
    }
}

impl Guard for TimeoutGuard {
    fn enable(&self, _signal: &Arc<AltSignal>) -> io::Result<bool> {
        Ok(Instant::now() >= self.deadline)
    }

    fn disable(&self) -> io::Result<bool> {
        Ok(Instant::now() >= self.deadline)
    }

    fn deadline(&self) -> Option<Instant> {
        Some(self.deadline)
    }
}

/// Shared state behind an [`AltingBarrier`]: a multi-party rendezvous event
/// that becomes ready for every party simultaneously once all of them have
/// enabled their guard for the current generation.
#[derive(Debug)]
struct BarrierState {
    parties: usize,
    generation: u64,
    waiters: Vec<Arc<AltSignal>>,
    ready_generation: Option<u64>,
}

/// A barrier event that `parties` guards must all enable before any of them
/// becomes ready.
#[derive(Debug)]
pub struct AltingBarrier {
    state: Mutex<BarrierState>,
}

impl AltingBarrier {
    /// Creates a new barrier requiring `parties` guards to enable
    /// concurrently before any becomes ready. `parties` must be at least 1.
    pub fn new(parties: usize) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(BarrierState {
                parties: parties.max(1),
                generation: 0,
                waiters: Vec::with_capacity(parties),
                ready_generation: None,
            }),
        })
    }

    /// Mints one guard handle for one party. Call this once per party.
    pub fn guard(self: &Arc<Self>) -> BarrierGuard {
        BarrierGuard {
            barrier: Arc::clone(self),
            my_generation: Cell::new(0),
        }
    }
}

/// One party's handle on an [`AltingBarrier`].
#[derive(Debug)]
pub struct BarrierGuard {
    barrier: Arc<AltingBarrier>,
    my_generation: Cell<u64>,
}

impl Guard for BarrierGuard {
    fn enable(&self, signal: &Arc<AltSignal>) -> io::Result<bool> {
        let mut state = lock_result(self.barrier.state.lock()).map_err(io::Error::from)?;
        self.my_generation.set(state.generation);
        state.waiters.push(Arc::clone(signal));

        if state.waiters.len() >= state.parties {
            state.ready_generation = Some(state.generation);
            state.generation += 1;
            let to_wake = std::mem::take(&mut state.waiters);
            drop(state);
            for waiter in to_wake {
                waiter.wake();
            }
            return Ok(true);
        }

        Ok(false)
    }

    fn disable(&self) -> io::Result<bool> {
        let state = lock_result(self.barrier.state.lock()).map_err(io::Error::from)?;
        Ok(state.ready_generation == Some(self.my_generation.get()))
    }
}
