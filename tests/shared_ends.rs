//! S5-style scenario: many competing writers on a shared write end, one
//! reader, fairness and per-writer ordering preserved.
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use csp_channel_kernel::{any2one, one2any, ChannelOptions};

fn init_logging() {
    let _ = env_logger::try_init();
}

#[test]
fn any2one_preserves_per_writer_order_across_competing_writers() {
    init_logging();
    const WRITERS: i32 = 3;
    const PER_WRITER: i32 = 100;

    let (tx, rx) = any2one::<(i32, i32)>(ChannelOptions::new());

    let mut handles = Vec::new();
    for writer_id in 0..WRITERS {
        let tx = tx.clone();
        handles.push(thread::spawn(move || {
            for seq in 0..PER_WRITER {
                tx.write((writer_id, seq)).unwrap();
            }
        }));
    }
    drop(tx);

    let mut per_writer: HashMap<i32, Vec<i32>> = HashMap::new();
    let mut total = 0;
    for _ in 0..(WRITERS * PER_WRITER) {
        let (writer_id, seq) = rx.read().unwrap();
        per_writer.entry(writer_id).or_default().push(seq);
        total += 1;
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(total, WRITERS * PER_WRITER);
    for writer_id in 0..WRITERS {
        let seqs = per_writer.get(&writer_id).expect("writer produced nothing");
        assert_eq!(seqs.len(), PER_WRITER as usize);
        let expected: Vec<i32> = (0..PER_WRITER).collect();
        assert_eq!(*seqs, expected, "writer {writer_id} was not delivered in send order");
    }
}

#[test]
fn guard_rejects_mounting_on_a_shared_read_end() {
    init_logging();
    let (_tx, rx) = csp_channel_kernel::one2any::<i32>(ChannelOptions::new());
    let err = rx.guard().unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::Other);
}

#[test]
fn extended_rendezvous_serializes_across_competing_readers_on_a_shared_end() {
    init_logging();
    let (tx, rx) = one2any::<i32>(ChannelOptions::new());

    let rx_a = rx.clone();
    let rx_b = rx.clone();
    let in_window = Arc::new(AtomicBool::new(false));
    let overlap_detected = Arc::new(AtomicBool::new(false));

    let writer = thread::spawn(move || {
        tx.write(1).unwrap();
        tx.write(2).unwrap();
    });

    let mut readers = Vec::new();
    for rx in [rx_a, rx_b] {
        let in_window = Arc::clone(&in_window);
        let overlap_detected = Arc::clone(&overlap_detected);
        readers.push(thread::spawn(move || {
            let value = rx.start_read().unwrap();
            if in_window.swap(true, Ordering::SeqCst) {
                overlap_detected.store(true, Ordering::SeqCst);
            }
            thread::sleep(Duration::from_millis(20));
            in_window.store(false, Ordering::SeqCst);
            rx.end_read().unwrap();
            value
        }));
    }

    let mut values: Vec<i32> = readers.into_iter().map(|h| h.join().unwrap()).collect();
    values.sort_unstable();

    writer.join().unwrap();
    assert_eq!(values, vec![1, 2]);
    assert!(
        !overlap_detected.load(Ordering::SeqCst),
        "two readers were inside an extended rendezvous window at the same time on a shared read end"
    );
}
