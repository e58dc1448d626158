//! The channel monitor: one `Mutex` + `Condvar` pair per channel, shared by
//! every end and every guard. This is the "single channel kernel" the
//! design notes recommend in place of an inheritance lattice — the same
//! state machine serves all four multiplicities and both buffering modes;
//! only the presence of the two `FairMutex`es (for shared ends) and the
//! `Backing` variant (buffered vs. not) differ between configurations.
use std::sync::{Arc, Condvar, Mutex};

use crate::alt_signal::AltSignal;
use crate::data_store::{DataStore, StoreState};
use crate::error::{lock_result, ChannelError, Result};
use crate::mutex::FairMutex;

/// The two ways a channel's payload can be held between a write and a read.
pub(crate) enum Backing<T> {
    /// Unbuffered rendezvous: at most one value in flight, deposited
    /// directly into `value`.
    Unbuffered {
        has_data: bool,
        value: Option<T>,
        reader_present: bool,
    },
    /// A buffered channel delegating to a pluggable `DataStore`.
    Buffered(Box<dyn DataStore<T>>),
}

impl<T> Backing<T> {
    /// `true` if a `read`/`start_read` would succeed right now, ignoring
    /// poison.
    fn is_ready_to_read(&self) -> bool {
        match self {
            Self::Unbuffered { has_data, .. } => *has_data,
            Self::Buffered(store) => store.state() != StoreState::Empty,
        }
    }

    /// `true` if a `write` would have to block right now, ignoring poison.
    fn is_full_for_write(&self) -> bool {
        match self {
            Self::Unbuffered { has_data, .. } => *has_data,
            Self::Buffered(store) => store.state() == StoreState::Full,
        }
    }
}

/// Channel state protected by the monitor's lock.
pub(crate) struct ChannelState<T> {
    pub(crate) backing: Backing<T>,
    /// Set between `start_read` and `end_read`; the writer stays parked
    /// across this window even though the value has already been taken.
    pub(crate) extended_read_in_progress: bool,
    /// Monotone, sticky poison strength. `0` means not poisoned.
    pub(crate) poison_strength: u32,
    /// At most one ALT currently enabled on the read end.
    pub(crate) alt_waiter: Option<Arc<AltSignal>>,
}

impl<T> ChannelState<T> {
    /// Ready-to-read check that also accounts for poison visible at
    /// `read_immunity`: a poisoned end is always "ready" (the subsequent
    /// read raises the poison condition instead of returning a value).
    pub(crate) fn read_ready(&self, read_immunity: u32) -> bool {
        self.poison_strength > read_immunity || self.backing.is_ready_to_read()
    }
}

/// Shared channel core: one instance per channel, held behind an `Arc` by
/// every `Sender`/`Receiver`/guard referencing it.
pub(crate) struct Shared<T> {
    pub(crate) state: Mutex<ChannelState<T>>,
    pub(crate) cond: Condvar,
    /// `Some` when the read end is shared (One2Any / Any2Any); serializes
    /// competing readers and disallows mounting an ALT guard. `Arc`-wrapped
    /// so a `FairMutexGuard` claimed by `start_read` can be held across to
    /// the matching `end_read` call.
    pub(crate) read_mutex: Option<Arc<FairMutex>>,
    /// `Some` when the write end is shared (Any2One / Any2Any).
    pub(crate) write_mutex: Option<Arc<FairMutex>>,
    pub(crate) read_immunity: u32,
    pub(crate) write_immunity: u32,
}

impl<T> Shared<T> {
    pub(crate) fn new(
        backing: Backing<T>,
        shared_read: bool,
        shared_write: bool,
        read_immunity: u32,
        write_immunity: u32,
    ) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(ChannelState {
                backing,
                extended_read_in_progress: false,
                poison_strength: 0,
                alt_waiter: None,
            }),
            cond: Condvar::new(),
            read_mutex: shared_read.then(|| Arc::new(FairMutex::new())),
            write_mutex: shared_write.then(|| Arc::new(FairMutex::new())),
            read_immunity,
            write_immunity,
        })
    }

    /// Raises poison at `strength`, waking every waiter on this channel
    /// (readers, writers, and any enabled ALT).
    pub(crate) fn poison(&self, strength: u32) -> Result<()> {
        let mut state = lock_result(self.state.lock())?;
        if strength > state.poison_strength {
            state.poison_strength = strength;
            log::debug!("channel poisoned at strength {strength}");
        }
        if let Some(alt) = state.alt_waiter.clone() {
            alt.wake();
        }
        self.cond.notify_all();
        Ok(())
    }

    /// Checks poison visibility for an end with the given immunity,
    /// returning the distinguished error if it should terminate.
    pub(crate) fn check_poison(state: &ChannelState<T>, immunity: u32) -> Result<()> {
        if state.poison_strength > immunity {
            log::debug!(
                "poison strength {} observed above immunity {immunity}",
                state.poison_strength
            );
            return Err(ChannelError::Poisoned {
                strength: state.poison_strength,
            });
        }
        Ok(())
    }

    /// Wakes the registered ALT if any, else does an ordinary broadcast.
    /// Broadcast (rather than a single `notify`) is used for the ordinary
    /// case too rather than trying to target exactly one blocked reader or
    /// writer, relying on every wait being loop-guarded for correctness.
    pub(crate) fn wake_one_or_scheduled(&self, state: &ChannelState<T>) {
        if let Some(alt) = &state.alt_waiter {
            alt.wake();
        }
        self.cond.notify_all();
    }
}
