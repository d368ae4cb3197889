//! Worker slots and the worker thread loop

use crate::pool::{PoolState, Task};
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Per-worker record: a FIFO of ready continuations plus its wake signal.
///
/// The queue is mutated only by its own worker (pop) and by producers in
/// `enqueue` (push), always under the lock. `depth` mirrors the queue length
/// so the enqueue fast path can inspect occupancy without locking.
pub(crate) struct WorkerSlot {
    queue: Mutex<VecDeque<Arc<Task>>>,
    cond: Condvar,
    depth: AtomicUsize,
}

impl WorkerSlot {
    pub(crate) fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            cond: Condvar::new(),
            depth: AtomicUsize::new(0),
        }
    }

    /// Push a continuation and wake the worker. Queues are unbounded.
    pub(crate) fn push(&self, task: Arc<Task>) {
        let mut queue = self.queue.lock();
        queue.push_back(task);
        self.depth.store(queue.len(), Ordering::Relaxed);
        self.cond.notify_one();
    }

    /// Racy occupancy check for the enqueue heuristic.
    ///
    /// Read without the lock; the slot may gain work between this check and
    /// a subsequent push, which is accepted.
    pub(crate) fn looks_empty(&self) -> bool {
        self.depth.load(Ordering::Relaxed) == 0
    }

    /// Wake the worker without pushing work (shutdown path).
    pub(crate) fn interrupt(&self) {
        let _queue = self.queue.lock();
        self.cond.notify_one();
    }

    /// Drop every queued continuation without resuming it.
    pub(crate) fn discard(&self) {
        let mut queue = self.queue.lock();
        queue.clear();
        self.depth.store(0, Ordering::Relaxed);
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.queue.lock().len()
    }
}

/// Worker thread main loop.
///
/// Parks on the slot's condition variable while its queue is empty, pops the
/// front continuation otherwise, and resumes it outside the lock so the
/// coroutine can enqueue freely without deadlocking. Shutdown wins over
/// pending work: once the flag is observed the loop returns immediately.
pub(crate) fn run(state: &PoolState, index: usize) {
    let slot = state.slot(index);
    loop {
        let task = {
            let mut queue = slot.queue.lock();
            while queue.is_empty() && !state.is_shutting_down() {
                slot.cond.wait(&mut queue);
            }
            if state.is_shutting_down() {
                #[cfg(debug_assertions)]
                eprintln!("strand-worker-{} shutting down", index);
                return;
            }
            let task = queue.pop_front().expect("worker woken with empty queue");
            slot.depth.store(queue.len(), Ordering::Relaxed);
            task
        };

        task.run();
    }
}
