//! One-shot signal flag

use parking_lot::{Condvar, Mutex};

/// Binary wait/signal primitive with exactly one signal transition.
///
/// Any number of threads may [`block`](Flag::block) or [`ready`](Flag::ready)
/// before and after the signal; once signaled the flag stays signaled for the
/// rest of its lifetime.
pub struct Flag {
    signaled: Mutex<bool>,
    cond: Condvar,
}

impl Flag {
    /// Create an unsignaled flag.
    pub fn new() -> Self {
        Self {
            signaled: Mutex::new(false),
            cond: Condvar::new(),
        }
    }

    /// Signal the flag, waking every current and future waiter.
    ///
    /// Signaling more than once is a contract violation.
    pub fn signal(&self) {
        let mut signaled = self.signaled.lock();
        debug_assert!(!*signaled, "flag signaled twice");
        *signaled = true;
        self.cond.notify_all();
    }

    /// Block the calling thread until the flag is signaled.
    pub fn block(&self) {
        let mut signaled = self.signaled.lock();
        while !*signaled {
            self.cond.wait(&mut signaled);
        }
    }

    /// Non-blocking poll of the signal state.
    pub fn ready(&self) -> bool {
        *self.signaled.lock()
    }
}

impl Default for Flag {
    fn default() -> Self {
        Self::new()
    }
}
