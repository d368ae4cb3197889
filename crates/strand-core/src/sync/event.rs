//! Waitable events and the any-of multiplex wait

use parking_lot::{Condvar, Mutex};
use std::sync::{Arc, Weak};

/// A waitable object with sticky signal, reset, and non-blocking poll.
///
/// Unlike [`Flag`](crate::sync::Flag) an event may be signaled and reset any
/// number of times, and a set of events can be multiplexed with [`wait_any`].
/// Cloning yields another handle to the same event.
#[derive(Clone)]
pub struct Event {
    inner: Arc<EventState>,
}

struct EventState {
    signaled: Mutex<bool>,
    watchers: Mutex<Vec<Weak<Watcher>>>,
}

/// One `wait_any` call's registration, shared with every event in its set.
///
/// The generation counter lets a waiter detect a signal that arrived between
/// its scan of the set and its decision to sleep.
struct Watcher {
    generation: Mutex<u64>,
    cond: Condvar,
}

impl Event {
    /// Create an unsignaled event.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(EventState {
                signaled: Mutex::new(false),
                watchers: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Mark the event signaled and wake any multiplexed waiters.
    ///
    /// Signaling an already-signaled event is allowed and has no further
    /// effect; the state stays signaled until [`reset`](Event::reset).
    pub fn signal(&self) {
        *self.inner.signaled.lock() = true;
        let mut watchers = self.inner.watchers.lock();
        watchers.retain(|watcher| {
            let Some(watcher) = watcher.upgrade() else {
                return false;
            };
            let mut generation = watcher.generation.lock();
            *generation += 1;
            watcher.cond.notify_all();
            true
        });
    }

    /// Clear the signaled state.
    pub fn reset(&self) {
        *self.inner.signaled.lock() = false;
    }

    /// Non-blocking, non-consuming poll of the signaled state.
    pub fn try_wait(&self) -> bool {
        *self.inner.signaled.lock()
    }

    fn register(&self, watcher: &Arc<Watcher>) {
        self.inner.watchers.lock().push(Arc::downgrade(watcher));
    }

    fn deregister(&self, watcher: &Arc<Watcher>) {
        self.inner
            .watchers
            .lock()
            .retain(|candidate| !std::ptr::eq(candidate.as_ptr(), Arc::as_ptr(watcher)));
    }
}

impl Default for Event {
    fn default() -> Self {
        Self::new()
    }
}

/// Block until at least one event in `events` is signaled and return its
/// index.
///
/// Level-triggered: an event that stays signaled keeps satisfying the wait
/// until it is reset or removed from the set. When several events are
/// signaled the lowest index is reported; no priority among them is defined.
pub fn wait_any(events: &[Event]) -> usize {
    assert!(!events.is_empty(), "wait_any on an empty set");

    let watcher = Arc::new(Watcher {
        generation: Mutex::new(0),
        cond: Condvar::new(),
    });
    for event in events {
        event.register(&watcher);
    }

    let fired = loop {
        let seen = *watcher.generation.lock();
        if let Some(index) = events.iter().position(|event| event.try_wait()) {
            break index;
        }
        // Sleep only if no signal arrived since the snapshot above.
        let mut generation = watcher.generation.lock();
        while *generation == seen {
            watcher.cond.wait(&mut generation);
        }
    };

    for event in events {
        event.deregister(&watcher);
    }
    fired
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_event_signal_reset_cycle() {
        let event = Event::new();
        assert!(!event.try_wait());

        event.signal();
        assert!(event.try_wait());
        // Sticky until reset, idempotent to re-signal.
        event.signal();
        assert!(event.try_wait());

        event.reset();
        assert!(!event.try_wait());
    }

    #[test]
    fn test_clones_share_state() {
        let event = Event::new();
        let clone = event.clone();
        event.signal();
        assert!(clone.try_wait());
    }

    #[test]
    fn test_wait_any_returns_signaled_index() {
        let events = [Event::new(), Event::new(), Event::new()];
        events[2].signal();
        assert_eq!(wait_any(&events), 2);
    }

    #[test]
    fn test_wait_any_prefers_lowest_index() {
        let events = [Event::new(), Event::new()];
        events[0].signal();
        events[1].signal();
        assert_eq!(wait_any(&events), 0);
    }

    #[test]
    fn test_wait_any_blocks_until_signal() {
        let events = vec![Event::new(), Event::new(), Event::new()];
        let target = events[1].clone();

        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            target.signal();
        });

        assert_eq!(wait_any(&events), 1);
        handle.join().unwrap();
    }

    #[test]
    fn test_wait_any_repeated_waits_on_same_set() {
        let events = vec![Event::new(), Event::new()];
        events[0].signal();
        assert_eq!(wait_any(&events), 0);
        events[0].reset();

        let target = events[1].clone();
        let handle = thread::spawn(move || target.signal());
        assert_eq!(wait_any(&events), 1);
        handle.join().unwrap();
    }
}
