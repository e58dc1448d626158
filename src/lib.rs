//! A CSP-style channel kernel and selective-wait (ALT) engine for a
//! thread-based runtime.
//!
//! The core building block is a channel created by one of the factory
//! functions in [`channel`] (`channel::one2one`, `channel::one2any`, ...),
//! which yields a [`channel::Sender`]/[`channel::Receiver`] pair rendezvousing
//! through a shared monitor. [`alt::Alternative`] lets a process wait on the
//! first-ready of several [`guard::Guard`]s, most commonly a
//! [`channel::ChannelReadGuard`] obtained from [`channel::Receiver::guard`].
//! [`parallel::parallel`] runs a batch of processes on their own threads and
//! joins all of them.
#![deny(clippy::correctness)]
#![warn(
    clippy::perf,
    clippy::complexity,
    clippy::style,
    clippy::nursery,
    clippy::pedantic,
    clippy::clone_on_ref_ptr,
    clippy::missing_docs_in_private_items,
    clippy::multiple_inherent_impl,
    clippy::unwrap_used,
    clippy::cargo_common_metadata,
    clippy::used_underscore_binding
)]

pub mod alt;
mod alt_signal;
pub mod channel;
pub mod config;
pub mod data_store;
pub mod error;
pub mod guard;
mod mutex;
pub mod parallel;

pub use alt::Alternative;
pub use channel::{
    any2any, any2any_buffered, any2one, any2one_buffered, buffered_channel, channel as make_channel,
    one2any, one2any_buffered, one2one, one2one_buffered, ChannelReadGuard, Multiplicity, Receiver,
    Sender,
};
pub use config::ChannelOptions;
pub use data_store::{DataStore, FixedFifo, InfiniteFifo, OverwritePolicy, Overwriting, StoreState};
pub use error::ChannelError;
pub use guard::{AltingBarrier, BarrierGuard, Guard, SkipGuard, TimeoutGuard};
pub use parallel::{parallel, Process};

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn one2one_rendezvous_round_trips_a_value() {
        let (tx, rx) = one2one::<i32>(ChannelOptions::new());
        let writer = std::thread::spawn(move || tx.write(42));
        assert_eq!(rx.read().unwrap(), 42);
        writer.join().unwrap().unwrap();
    }

    #[test]
    fn select_returns_timeout_guard_when_nothing_else_is_ready() {
        let (_tx, rx) = one2one::<i32>(ChannelOptions::new());
        let alt = Alternative::new(vec![
            Box::new(rx.guard().unwrap()),
            Box::new(TimeoutGuard::new(Duration::from_millis(10))),
        ]);
        assert_eq!(alt.select().unwrap(), 1);
    }

    #[test]
    fn buffered_channel_round_trips_in_order() {
        let (tx, rx) = one2one_buffered::<i32>(Box::new(FixedFifo::new(2)), ChannelOptions::new());
        tx.write(1).unwrap();
        tx.write(2).unwrap();
        assert_eq!(rx.read().unwrap(), 1);
        assert_eq!(rx.read().unwrap(), 2);
    }
}
