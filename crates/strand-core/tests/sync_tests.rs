//! Synchronization primitive integration tests
//!
//! Cross-thread behavior of the Flag, Promise/Future, Event and the
//! thread-level spawn helper.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use strand_core::sync::{wait_any, Event, Flag, Promise};

// ===== Flag =====

#[test]
fn test_flag_wakes_multiple_waiters() {
    let flag = Arc::new(Flag::new());
    let woken = Arc::new(AtomicUsize::new(0));

    let waiters: Vec<_> = (0..4)
        .map(|_| {
            let flag = flag.clone();
            let woken = woken.clone();
            thread::spawn(move || {
                flag.block();
                woken.fetch_add(1, Ordering::SeqCst);
            })
        })
        .collect();

    thread::sleep(Duration::from_millis(50));
    assert_eq!(woken.load(Ordering::SeqCst), 0);

    flag.signal();
    for waiter in waiters {
        waiter.join().unwrap();
    }
    assert_eq!(woken.load(Ordering::SeqCst), 4);
}

// ===== Promise / Future =====

#[test]
fn test_block_before_fill_sees_exact_value() {
    let future = Promise::future();
    let producer = future.clone();

    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        producer.fill(vec![1, 2, 3]);
    });

    assert!(!future.ready());
    assert_eq!(future.block(), vec![1, 2, 3]);
    assert!(future.ready());
    handle.join().unwrap();
}

#[test]
fn test_spawn_futures_share_result() {
    let future = strand_core::spawn(|| 99);
    let observer = future.clone();

    observer.wait();
    assert!(observer.ready());
    assert_eq!(future.block(), 99);
}

// ===== Event =====

#[test]
fn test_wait_any_over_growing_interest() {
    let events = vec![Event::new(), Event::new(), Event::new(), Event::new()];
    let target = events[3].clone();

    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        target.signal();
    });

    assert_eq!(wait_any(&events), 3);
    handle.join().unwrap();

    // Reset, then fire a different member of the same set.
    events[3].reset();
    let target = events[0].clone();
    let handle = thread::spawn(move || target.signal());
    assert_eq!(wait_any(&events), 0);
    handle.join().unwrap();
}

#[test]
fn test_event_try_wait_is_nonconsuming() {
    let event = Event::new();
    event.signal();
    assert!(event.try_wait());
    assert!(event.try_wait());
    event.reset();
    assert!(!event.try_wait());
}
