//! S1/S2/S4-style scenarios: plain unbuffered and buffered rendezvous.
use std::thread;
use std::time::Duration;

use csp_channel_kernel::{one2one, one2one_buffered, ChannelOptions, FixedFifo};

fn init_logging() {
    let _ = env_logger::try_init();
}

#[test]
fn unbuffered_one2one_delivers_in_order() {
    init_logging();
    let (tx, rx) = one2one::<i32>(ChannelOptions::new());
    let writer = thread::spawn(move || {
        for value in [1, 2, 3] {
            tx.write(value).unwrap();
        }
    });

    let mut received = Vec::new();
    for _ in 0..3 {
        received.push(rx.read().unwrap());
    }

    writer.join().unwrap();
    assert_eq!(received, vec![1, 2, 3]);
}

#[test]
fn buffered_one2one_never_exceeds_capacity_in_flight() {
    init_logging();
    let (tx, rx) = one2one_buffered::<i32>(Box::new(FixedFifo::new(2)), ChannelOptions::new());

    let writer = thread::spawn(move || {
        for value in [1, 2, 3, 4] {
            tx.write(value).unwrap();
        }
    });

    // Give the writer a head start; a correct FixedFifo(2) blocks it at two
    // values in flight regardless of how long we sleep here.
    thread::sleep(Duration::from_millis(20));

    let mut received = Vec::new();
    for _ in 0..4 {
        received.push(rx.read().unwrap());
    }

    writer.join().unwrap();
    assert_eq!(received, vec![1, 2, 3, 4]);
}

#[test]
fn extended_rendezvous_forwarder_orders_writer_after_end_read() {
    init_logging();
    let (a_tx, a_rx) = one2one::<i32>(ChannelOptions::new());
    let (m_tx, m_rx) = one2one::<i32>(ChannelOptions::new());

    let forwarder = thread::spawn(move || {
        let value = a_rx.start_read().unwrap();
        thread::sleep(Duration::from_millis(15));
        a_rx.end_read().unwrap();
        m_tx.write(value).unwrap();
    });

    let started = std::time::Instant::now();
    a_tx.write(7).unwrap();
    let write_elapsed = started.elapsed();

    assert_eq!(m_rx.read().unwrap(), 7);
    forwarder.join().unwrap();
    assert!(
        write_elapsed >= Duration::from_millis(15),
        "writer returned before the extended rendezvous completed: {write_elapsed:?}"
    );
}
