//! The public channel ends: `Sender` (`ChannelOutput`) and `Receiver`
//! (`ChannelInput`/`SharedChannelInput`), plus the read-guard ALT mounts on
//! a `Receiver`.
use std::cell::{Cell, RefCell};
use std::io;
use std::sync::Arc;

use crate::alt_signal::AltSignal;
use crate::error::{lock_result, ChannelError, Result};
use crate::guard::Guard;
use crate::mutex::{FairMutex, FairMutexGuard};

use super::state::{Backing, ChannelState, Shared};

/// Pops the ready value for an ordinary `read`, completing the rendezvous
/// (clears `has_data`/`reader_present` for unbuffered channels).
fn take_and_complete<T>(state: &mut ChannelState<T>) -> T {
    match &mut state.backing {
        Backing::Unbuffered {
            has_data,
            value,
            reader_present,
        } => {
            *has_data = false;
            *reader_present = false;
            value
                .take()
                .expect("has_data was true but value missing: internal invariant violation")
        }
        Backing::Buffered(store) => store.get(),
    }
}

/// Pops the ready value for `start_read`, leaving the writer parked
/// (unbuffered: `has_data` stays `true` until `end_read`).
fn take_and_keep_parked<T>(state: &mut ChannelState<T>) -> T {
    match &mut state.backing {
        Backing::Unbuffered {
            value,
            reader_present,
            ..
        } => {
            *reader_present = false;
            value
                .take()
                .expect("has_data was true but value missing: internal invariant violation")
        }
        Backing::Buffered(store) => store.get(),
    }
}

/// The write end of a channel (`ChannelOutput`).
pub struct Sender<T> {
    pub(crate) shared: Arc<Shared<T>>,
}

impl<T> Clone for Sender<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Send + 'static> Sender<T> {
    /// Writes one value, blocking until the matching read (or the store
    /// having room) completes the transfer.
    ///
    /// # Errors
    /// `io::Error` wrapping [`ChannelError::Poisoned`] if poison above this
    /// end's immunity has been raised, or [`ChannelError::Internal`] if an
    /// underlying lock was poisoned.
    pub fn write(&self, value: T) -> io::Result<()> {
        write(&self.shared, value).map_err(io::Error::from)
    }

    /// Raises poison at `strength` on this channel, waking every blocked
    /// party on both ends.
    ///
    /// # Errors
    /// `io::Error` if an underlying lock was poisoned.
    pub fn poison(&self, strength: u32) -> io::Result<()> {
        self.shared.poison(strength).map_err(io::Error::from)
    }
}

/// The read end of a channel (`ChannelInput` / `SharedChannelInput`).
pub struct Receiver<T> {
    pub(crate) shared: Arc<Shared<T>>,
    /// Holds this instance's `read_mutex` claim between `start_read` and
    /// `end_read` on a shared read end, so the bracketing covers the whole
    /// two-phase read and not just plain `read`. `None` on an exclusive read
    /// end, where `read_mutex` itself is `None`.
    read_claim: RefCell<Option<FairMutexGuard>>,
}

impl<T> Clone for Receiver<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            read_claim: RefCell::new(None),
        }
    }
}

impl<T> Receiver<T> {
    /// Wraps a channel core into a fresh, unclaimed `Receiver`. Used by the
    /// factory functions in `super`.
    pub(crate) fn new(shared: Arc<Shared<T>>) -> Self {
        Self {
            shared,
            read_claim: RefCell::new(None),
        }
    }
}

impl<T: Send + 'static> Receiver<T> {
    /// Reads one value, blocking until one is available.
    ///
    /// # Errors
    /// As [`Sender::write`].
    pub fn read(&self) -> io::Result<T> {
        read(&self.shared).map_err(io::Error::from)
    }

    /// Begins an extended (two-phase) rendezvous: takes the value but keeps
    /// the writer parked until [`Receiver::end_read`] is called. Lets the
    /// reader run arbitrary forwarding code in between while composing
    /// safely through pipelines without double-buffering.
    ///
    /// On a shared read end, holds the `read_mutex` claim across to the
    /// matching `end_read` rather than releasing it immediately, so a
    /// concurrent reader on the same shared end cannot interleave with this
    /// reader's in-progress extended rendezvous.
    ///
    /// # Errors
    /// As [`Sender::write`]. Also raises [`ChannelError::MisuseAlt`] if
    /// called while a previous `start_read` on this `Receiver` is still
    /// unmatched by `end_read`.
    pub fn start_read(&self) -> io::Result<T> {
        if self.read_claim.borrow().is_some() {
            return Err(io::Error::from(ChannelError::MisuseAlt(
                "start_read called again before the previous end_read",
            )));
        }
        let claim = self
            .shared
            .read_mutex
            .as_ref()
            .map(|m| m.claim())
            .transpose()
            .map_err(io::Error::from)?;
        match start_read(&self.shared) {
            Ok(value) => {
                *self.read_claim.borrow_mut() = claim;
                Ok(value)
            }
            Err(err) => Err(io::Error::from(err)),
        }
    }

    /// Completes an extended rendezvous begun by [`Receiver::start_read`],
    /// releasing the parked writer and (on a shared read end) the
    /// `read_mutex` claim held since `start_read`.
    ///
    /// # Errors
    /// `io::Error` if an underlying lock was poisoned. This always completes
    /// normally even if poison arrived mid-window; poison is observed by the
    /// next operation on either end rather than retroactively inside
    /// `end_read` itself.
    pub fn end_read(&self) -> io::Result<()> {
        let result = end_read(&self.shared).map_err(io::Error::from);
        self.read_claim.borrow_mut().take();
        result
    }

    /// Raises poison at `strength` on this channel.
    ///
    /// # Errors
    /// As [`Sender::poison`].
    pub fn poison(&self, strength: u32) -> io::Result<()> {
        self.shared.poison(strength).map_err(io::Error::from)
    }

    /// Mounts an ALT-able guard on this read end.
    ///
    /// # Errors
    /// `io::Error` wrapping [`ChannelError::MisuseAlt`] if this is a shared
    /// (One2Any/Any2Any) read end: shared read ends do not permit ALT.
    pub fn guard(&self) -> io::Result<ChannelReadGuard<T>> {
        if self.shared.read_mutex.is_some() {
            return Err(io::Error::from(ChannelError::MisuseAlt(
                "cannot mount an ALT guard on a shared (One2Any/Any2Any) read end",
            )));
        }
        Ok(ChannelReadGuard {
            shared: Arc::clone(&self.shared),
            registered: Cell::new(false),
        })
    }
}

/// A channel-read ALT guard mounted on an exclusive (non-shared)
/// [`Receiver`].
pub struct ChannelReadGuard<T> {
    shared: Arc<Shared<T>>,
    registered: Cell<bool>,
}

impl<T: Send + 'static> Guard for ChannelReadGuard<T> {
    fn enable(&self, signal: &Arc<AltSignal>) -> io::Result<bool> {
        let mut state = lock_result(self.shared.state.lock()).map_err(io::Error::from)?;
        if state.read_ready(self.shared.read_immunity) {
            log::trace!("ALT enable: channel-read guard already ready");
            return Ok(true);
        }
        if state.alt_waiter.is_some() {
            return Err(io::Error::from(ChannelError::MisuseAlt(
                "two ALTs registered concurrently on the same channel read end",
            )));
        }
        state.alt_waiter = Some(Arc::clone(signal));
        self.registered.set(true);
        log::trace!("ALT enable: channel-read guard registered, not yet ready");
        Ok(false)
    }

    fn disable(&self) -> io::Result<bool> {
        let mut state = lock_result(self.shared.state.lock()).map_err(io::Error::from)?;
        if self.registered.get() {
            state.alt_waiter = None;
            self.registered.set(false);
        }
        let ready = state.read_ready(self.shared.read_immunity);
        log::trace!("ALT disable: channel-read guard ready={ready}");
        Ok(ready)
    }
}

fn write<T: Send + 'static>(shared: &Shared<T>, value: T) -> Result<()> {
    let _claim = shared.write_mutex.as_ref().map(FairMutex::claim).transpose()?;
    let mut state = lock_result(shared.state.lock())?;

    Shared::check_poison(&state, shared.write_immunity)?;
    while state.backing.is_full_for_write() {
        log::trace!("write: waiting for capacity");
        state = lock_result(shared.cond.wait(state))?;
        Shared::check_poison(&state, shared.write_immunity)?;
    }

    let is_unbuffered = matches!(state.backing, Backing::Unbuffered { .. });
    match &mut state.backing {
        Backing::Unbuffered {
            has_data, value: slot, ..
        } => {
            if *has_data {
                return Err(ChannelError::Internal(
                    "write observed has_data=true immediately after waiting for capacity",
                ));
            }
            *slot = Some(value);
            *has_data = true;
        }
        Backing::Buffered(store) => store.put(value),
    }
    shared.wake_one_or_scheduled(&state);

    if !is_unbuffered {
        return Ok(());
    }

    // Block until the matching read (or extended end_read) clears
    // has_data, i.e. until the rendezvous actually completes.
    loop {
        let still_parked = matches!(state.backing, Backing::Unbuffered { has_data: true, .. });
        if !still_parked {
            return Ok(());
        }
        if state.poison_strength > shared.write_immunity {
            // The reader never arrived to claim it: reverse our own
            // deposit so the channel state stays consistent.
            if let Backing::Unbuffered { has_data, value: slot, .. } = &mut state.backing {
                *has_data = false;
                *slot = None;
            }
            return Err(ChannelError::Poisoned {
                strength: state.poison_strength,
            });
        }
        log::trace!("write: waiting for rendezvous to complete");
        state = lock_result(shared.cond.wait(state))?;
    }
}

fn read<T: Send + 'static>(shared: &Shared<T>) -> Result<T> {
    let _claim = shared.read_mutex.as_ref().map(FairMutex::claim).transpose()?;
    let mut state = lock_result(shared.state.lock())?;

    loop {
        Shared::check_poison(&state, shared.read_immunity)?;
        if state.backing.is_ready_to_read() {
            break;
        }
        if let Backing::Unbuffered { reader_present, .. } = &mut state.backing {
            *reader_present = true;
        }
        log::trace!("read: waiting for data");
        state = lock_result(shared.cond.wait(state))?;
    }

    let value = take_and_complete(&mut state);
    shared.cond.notify_all();
    Ok(value)
}

fn start_read<T: Send + 'static>(shared: &Shared<T>) -> Result<T> {
    let mut state = lock_result(shared.state.lock())?;

    loop {
        Shared::check_poison(&state, shared.read_immunity)?;
        if state.backing.is_ready_to_read() {
            break;
        }
        if let Backing::Unbuffered { reader_present, .. } = &mut state.backing {
            *reader_present = true;
        }
        log::trace!("read: waiting for data");
        state = lock_result(shared.cond.wait(state))?;
    }

    let value = take_and_keep_parked(&mut state);
    state.extended_read_in_progress = true;
    Ok(value)
}

fn end_read<T: Send + 'static>(shared: &Shared<T>) -> Result<()> {
    let mut state = lock_result(shared.state.lock())?;
    if let Backing::Unbuffered { has_data, .. } = &mut state.backing {
        *has_data = false;
    }
    state.extended_read_in_progress = false;
    shared.cond.notify_all();
    Ok(())
}
