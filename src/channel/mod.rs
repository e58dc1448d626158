//! Four channel multiplicities (`one2one`, `one2any`, `any2one`, `any2any`),
//! each available unbuffered or backed by a [`crate::data_store::DataStore`].
//! All four share the single monitor-based kernel in [`state`]; only which
//! ends get a [`crate::mutex::FairMutex`] differs, letting one state machine
//! cover all four shapes instead of a type per multiplicity.
mod ends;
mod state;

pub use ends::{ChannelReadGuard, Receiver, Sender};

use crate::config::ChannelOptions;
use crate::data_store::DataStore;
use state::{Backing, Shared};

/// Which ends of a channel are shared among multiple processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Multiplicity {
    /// One writer, one reader.
    One2One,
    /// One writer, many readers (competing for each value).
    One2Any,
    /// Many writers (competing to deposit), one reader.
    Any2One,
    /// Many writers and many readers, all competing.
    Any2Any,
}

impl Multiplicity {
    fn shared_read(self) -> bool {
        matches!(self, Self::One2Any | Self::Any2Any)
    }

    fn shared_write(self) -> bool {
        matches!(self, Self::Any2One | Self::Any2Any)
    }
}

fn make<T: Send + 'static>(
    mult: Multiplicity,
    backing: Backing<T>,
    options: ChannelOptions,
) -> (Sender<T>, Receiver<T>) {
    let shared = Shared::new(
        backing,
        mult.shared_read(),
        mult.shared_write(),
        options.read_immunity,
        options.write_immunity,
    );
    (
        Sender {
            shared: std::sync::Arc::clone(&shared),
        },
        Receiver::new(shared),
    )
}

fn unbuffered_backing<T>() -> Backing<T> {
    Backing::Unbuffered {
        has_data: false,
        value: None,
        reader_present: false,
    }
}

/// Creates an unbuffered channel of the given multiplicity.
pub fn channel<T: Send + 'static>(
    mult: Multiplicity,
    options: ChannelOptions,
) -> (Sender<T>, Receiver<T>) {
    make(mult, unbuffered_backing(), options)
}

/// Creates a buffered channel of the given multiplicity, backed by `store`.
/// The store is cloned into a fresh, empty instance so the prototype passed
/// in is never itself aliased into the channel, and so `store` can be reused
/// to construct further independent channels afterward.
pub fn buffered_channel<T: Send + 'static>(
    mult: Multiplicity,
    store: Box<dyn DataStore<T>>,
    options: ChannelOptions,
) -> (Sender<T>, Receiver<T>) {
    make(mult, Backing::Buffered(store.clone_store()), options)
}

/// Convenience constructor: unbuffered `One2One` channel.
pub fn one2one<T: Send + 'static>(options: ChannelOptions) -> (Sender<T>, Receiver<T>) {
    channel(Multiplicity::One2One, options)
}

/// Convenience constructor: unbuffered `One2Any` channel (shared read end).
pub fn one2any<T: Send + 'static>(options: ChannelOptions) -> (Sender<T>, Receiver<T>) {
    channel(Multiplicity::One2Any, options)
}

/// Convenience constructor: unbuffered `Any2One` channel (shared write end).
pub fn any2one<T: Send + 'static>(options: ChannelOptions) -> (Sender<T>, Receiver<T>) {
    channel(Multiplicity::Any2One, options)
}

/// Convenience constructor: unbuffered `Any2Any` channel (both ends shared).
pub fn any2any<T: Send + 'static>(options: ChannelOptions) -> (Sender<T>, Receiver<T>) {
    channel(Multiplicity::Any2Any, options)
}

/// Convenience constructor: buffered `One2One` channel.
pub fn one2one_buffered<T: Send + 'static>(
    store: Box<dyn DataStore<T>>,
    options: ChannelOptions,
) -> (Sender<T>, Receiver<T>) {
    buffered_channel(Multiplicity::One2One, store, options)
}

/// Convenience constructor: buffered `One2Any` channel.
pub fn one2any_buffered<T: Send + 'static>(
    store: Box<dyn DataStore<T>>,
    options: ChannelOptions,
) -> (Sender<T>, Receiver<T>) {
    buffered_channel(Multiplicity::One2Any, store, options)
}

/// Convenience constructor: buffered `Any2One` channel.
pub fn any2one_buffered<T: Send + 'static>(
    store: Box<dyn DataStore<T>>,
    options: ChannelOptions,
) -> (Sender<T>, Receiver<T>) {
    buffered_channel(Multiplicity::Any2One, store, options)
}

/// Convenience constructor: buffered `Any2Any` channel.
pub fn any2any_buffered<T: Send + 'static>(
    store: Box<dyn DataStore<T>>,
    options: ChannelOptions,
) -> (Sender<T>, Receiver<T>) {
    buffered_channel(Multiplicity::Any2Any, store, options)
}
