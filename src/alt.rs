//! Selective wait over a vector of guards. An `Alternative` is typically
//! created once and `select`/`pri_select`/`fair_select` called on it
//! repeatedly; a single `Alternative` must not have two selection calls
//! in flight at once, but the internal enable → wait → disable cycle of one
//! call is independent of how many times the object is reused afterward.
use std::io;
use std::sync::atomic::{AtomicIsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::alt_signal::AltSignal;
use crate::error::ChannelError;
use crate::guard::Guard;

/// Which guard a selection call prefers among the ready set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Policy {
    /// Lowest-indexed ready guard.
    Priority,
    /// Next-ready guard strictly after the last chosen index, scanning
    /// cyclically.
    Fair,
}

/// A selective wait over an ordered set of [`Guard`]s.
///
/// `select()`'s tie-break among multiple ready guards is deliberately the
/// same cyclic cursor `fair_select()` uses, which is provably non-starving;
/// `select` and `fair_select` therefore behave identically on this
/// implementation and share one cursor.
pub struct Alternative {
    guards: Vec<Box<dyn Guard>>,
    signal: Arc<AltSignal>,
    /// Cursor shared by `select`/`fair_select`: the index most recently
    /// chosen, or `-1` before the first call.
    cursor: AtomicIsize,
}

impl Alternative {
    /// Creates a new `Alternative` over `guards`, in the given priority
    /// order (index 0 is highest priority for `pri_select`).
    #[must_use]
    pub fn new(guards: Vec<Box<dyn Guard>>) -> Self {
        Self {
            guards,
            signal: Arc::new(AltSignal::new()),
            cursor: AtomicIsize::new(-1),
        }
    }

    /// Selects an arbitrary ready guard without starving any other guard
    /// under uniform offered load (see the type-level doc comment for the
    /// tie-break actually used).
    ///
    /// # Errors
    /// Propagates [`ChannelError::MisuseAlt`] (two ALTs on one channel, or a
    /// guard mounted on a shared read end) and poisoned-lock failures from
    /// the underlying guards.
    pub fn select(&self) -> io::Result<usize> {
        self.run(Policy::Fair)
    }

    /// Selects the lowest-indexed ready guard.
    ///
    /// # Errors
    /// As [`Alternative::select`].
    pub fn pri_select(&self) -> io::Result<usize> {
        self.run(Policy::Priority)
    }

    /// Selects the next-ready guard strictly after the previously chosen
    /// index, scanning cyclically.
    ///
    /// # Errors
    /// As [`Alternative::select`].
    pub fn fair_select(&self) -> io::Result<usize> {
        self.run(Policy::Fair)
    }

    /// Returns the number of guards registered with this `Alternative`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.guards.len()
    }

    /// Returns `true` if no guards are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }

    fn run(&self, policy: Policy) -> io::Result<usize> {
        // Clear any wakeup latched by a guard that fired after a previous
        // round already found something ready and skipped waiting — without
        // this, that stale wakeup would make the next round's `wait_until`
        // return immediately with nothing actually ready.
        self.signal.reset();

        let ready = self.enable_all()?;
        if !ready.iter().any(|&r| r) {
            let deadline = self.earliest_deadline();
            self.signal
                .wait_until(deadline)
                .map_err(io::Error::from)?;
        }
        let ready = self.disable_all()?;
        self.choose(&ready, policy)
    }

    /// Enables every guard in index order. This always enables the full set
    /// rather than short-circuiting on the first ready guard, so the disable
    /// phase's bookkeeping (every enabled guard gets a matching disable
    /// call) stays uniform regardless of which guard turned out ready.
    fn enable_all(&self) -> io::Result<Vec<bool>> {
        self.guards
            .iter()
            .map(|guard| guard.enable(&self.signal))
            .collect()
    }

    /// Disables every guard in reverse index order, then un-reverses the
    /// result so indices line up with `self.guards`.
    fn disable_all(&self) -> io::Result<Vec<bool>> {
        let mut ready = vec![false; self.guards.len()];
        for (i, guard) in self.guards.iter().enumerate().rev() {
            ready[i] = guard.disable()?;
        }
        Ok(ready)
    }

    fn earliest_deadline(&self) -> Option<Instant> {
        self.guards
            .iter()
            .filter_map(|guard| guard.deadline())
            .min()
    }

    fn choose(&self, ready: &[bool], policy: Policy) -> io::Result<usize> {
        match policy {
            Policy::Priority => ready
                .iter()
                .position(|&r| r)
                .ok_or_else(Self::nothing_ready)
                .map(|i| {
                    self.cursor.store(i as isize, Ordering::SeqCst);
                    i
                }),
            Policy::Fair => {
                let len = ready.len();
                if len == 0 {
                    return Err(Self::nothing_ready());
                }
                let start = self.cursor.load(Ordering::SeqCst);
                let start = if start < 0 { 0 } else { (start as usize + 1) % len };
                for offset in 0..len {
                    let i = (start + offset) % len;
                    if ready[i] {
                        self.cursor.store(i as isize, Ordering::SeqCst);
                        return Ok(i);
                    }
                }
                Err(Self::nothing_ready())
            }
        }
    }

    fn nothing_ready() -> io::Error {
        io::Error::from(ChannelError::Internal(
            "ALT woke with no guard ready: internal invariant violation",
        ))
    }
}
