//! S6-style scenario: poison propagation after a run of successful values.
use std::thread;

use csp_channel_kernel::{one2one, one2one_buffered, ChannelOptions, FixedFifo};

fn init_logging() {
    let _ = env_logger::try_init();
}

#[test]
fn poison_is_observed_after_pending_values_are_drained() {
    init_logging();
    let (tx, rx) = one2one::<i32>(ChannelOptions::new());

    let writer = thread::spawn(move || {
        for value in 1..=5 {
            tx.write(value).unwrap();
        }
        tx.poison(1).unwrap();
        let err = tx.write(6).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::BrokenPipe);
    });

    for expected in 1..=5 {
        assert_eq!(rx.read().unwrap(), expected);
    }
    let err = rx.read().unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::BrokenPipe);

    writer.join().unwrap();
}

#[test]
fn immunity_hides_poison_at_or_below_its_level() {
    init_logging();
    let (tx, rx) = one2one_buffered::<i32>(
        Box::new(FixedFifo::new(1)),
        ChannelOptions::new().with_read_immunity(2),
    );

    tx.write(10).unwrap();
    tx.poison(2).unwrap();

    // Immunity 2 hides poison strength 2: the already-queued value still
    // reads normally.
    assert_eq!(rx.read().unwrap(), 10);

    tx.poison(3).unwrap();
    let err = rx.read().unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::BrokenPipe);
}
