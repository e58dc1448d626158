//! The wakeup channel an `Alternative` blocks on between its enable and
//! disable phases. A channel-read guard registers a clone of this signal as
//! the channel's `altWaiter`; a writer that finds an `altWaiter` set
//! "schedules" the ALT by waking this signal instead of doing an ordinary
//! `notify`.
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

use crate::error::{lock_result, Result};

/// A one-shot, level-triggered wakeup: `wake()` may be called any number of
/// times (by multiple registered channels, or by poison) and is idempotent
/// until consumed by `wait_until`.
#[derive(Debug, Default)]
pub(crate) struct AltSignal {
    woken: Mutex<bool>,
    cond: Condvar,
}

impl AltSignal {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Schedules the waiting ALT: sets the wakeup flag and notifies.
    pub(crate) fn wake(&self) {
        let Ok(mut woken) = self.woken.lock() else {
            return;
        };
        *woken = true;
        log::trace!("AltSignal: woken");
        self.cond.notify_all();
    }

    /// Clears a latched wakeup without waiting for one. Used at the start of
    /// a fresh selection round so a wakeup raised during a previous round
    /// that never actually waited (because another guard was already ready)
    /// cannot leak into this round and be mistaken for a real event.
    pub(crate) fn reset(&self) {
        let Ok(mut woken) = self.woken.lock() else {
            return;
        };
        *woken = false;
    }

    /// Blocks until `wake()` has been called, or `deadline` (if any)
    /// elapses. Returns `Ok(true)` if woken, `Ok(false)` on timeout. Safe
    /// against spurious wakeups.
    pub(crate) fn wait_until(&self, deadline: Option<Instant>) -> Result<bool> {
        let mut woken = lock_result(self.woken.lock())?;
        loop {
            if *woken {
                *woken = false;
                return Ok(true);
            }
            match deadline {
                None => {
                    woken = lock_result(self.cond.wait(woken))?;
                }
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Ok(false);
                    }
                    let (next, timeout_result) =
                        lock_result(self.cond.wait_timeout(woken, deadline - now))?;
                    woken = next;
                    if *woken {
                        *woken = false;
                        return Ok(true);
                    }
                    if timeout_result.timed_out() && Instant::now() >= deadline {
                        return Ok(false);
                    }
                    // Spurious wakeup before the deadline with no signal set:
                    // loop back around and recompute the remaining duration.
                    log::trace!(
                        "AltSignal: spurious wakeup, {:?} remaining",
                        deadline.saturating_duration_since(Instant::now())
                    );
                }
            }
        }
    }
}

/// Turns a relative duration into an absolute deadline without depending on
/// `Instant::now()` being called more than once per guard (kept as a free
/// function so `TimeoutGuard` and tests share the same conversion).
pub(crate) fn deadline_from(duration: Duration) -> Instant {
    Instant::now() + duration
}
