//! Single-fill promise and its shared future handle

use crate::sync::Flag;
use parking_lot::Mutex;
use std::sync::Arc;

/// Shared, duplicable handle to a [`Promise`].
///
/// Cloning a future increments the share count; every clone observes the same
/// eventual fill, and the promise lives as long as its longest-lived handle.
pub type Future<T> = Arc<Promise<T>>;

/// Single-writer container filled exactly once and observed by any number of
/// waiters.
///
/// For a result-less completion use `Promise<()>`.
pub struct Promise<T> {
    flag: Flag,
    value: Mutex<Option<T>>,
}

impl<T> Promise<T> {
    /// Create an empty promise.
    pub fn new() -> Self {
        Self {
            flag: Flag::new(),
            value: Mutex::new(None),
        }
    }

    /// Create an empty promise behind a fresh shared [`Future`] handle.
    pub fn future() -> Future<T> {
        Arc::new(Self::new())
    }

    /// Store the value and wake every observer.
    ///
    /// Filling a promise twice is a contract violation.
    pub fn fill(&self, value: T) {
        {
            let mut slot = self.value.lock();
            assert!(slot.is_none(), "promise filled twice");
            *slot = Some(value);
        }
        self.flag.signal();
    }

    /// Block until the promise is filled, then move the value out.
    ///
    /// The value can be retrieved exactly once; observers that only need the
    /// rendezvous should use [`wait`](Promise::wait).
    pub fn block(&self) -> T {
        self.flag.block();
        self.value
            .lock()
            .take()
            .expect("promise value already taken")
    }

    /// Block until the promise is filled without consuming the value.
    pub fn wait(&self) {
        self.flag.block();
    }

    /// Non-blocking poll of the fill state.
    pub fn ready(&self) -> bool {
        self.flag.ready()
    }
}

impl<T> Default for Promise<T> {
    fn default() -> Self {
        Self::new()
    }
}
