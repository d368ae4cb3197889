//! Coroutine-scheduling thread pool with asynchronous event multiplexing
//!
//! The [`Pool`] owns N−1 worker threads (N = hardware thread count), each
//! with its own FIFO queue of ready continuations, plus one dedicated event
//! thread that multiplexes a dynamic set of [`Event`]s and hands the
//! coroutine associated with whichever event fires back to the workers.

mod events;
mod schedule;
mod task;
mod worker;

pub use schedule::{Schedule, ScheduleEvent};

pub(crate) use task::Task;

use crate::sync::{Event, Promise};
use crate::thread::{self, Thread};
use crossbeam::utils::CachePadded;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::task::Waker;
use worker::WorkerSlot;

/// Hard cap on the number of worker threads a pool may own.
pub const MAX_WORKERS: usize = 64;

/// Golden ratio, the multiplicative constant of the low-discrepancy
/// destination sequence used when every queue is busy.
const GOLDEN_RATIO: f64 = 1.618_033_988_749_895;

/// Scheduler state shared between the pool handle, its workers, its event
/// thread, and the wakers of the tasks it owns.
pub(crate) struct PoolState {
    slots: Box<[CachePadded<WorkerSlot>]>,
    shutdown: AtomicBool,
    /// Process-wide enqueue counter driving the golden-ratio fallback.
    sequence: AtomicU64,
    /// (event, continuation) pairs submitted but not yet admitted into the
    /// live wait set. Producers only ever touch this staging vector; the
    /// live tables belong to the event thread.
    pub(crate) staged: Mutex<Vec<(Event, Waker)>>,
    /// Reserved wakeup event, slot 0 of the live wait set.
    pub(crate) wakeup: Event,
}

impl PoolState {
    pub(crate) fn new(workers: usize) -> Arc<Self> {
        let slots = (0..workers)
            .map(|_| CachePadded::new(WorkerSlot::new()))
            .collect();
        Arc::new(Self {
            slots,
            shutdown: AtomicBool::new(false),
            sequence: AtomicU64::new(0),
            staged: Mutex::new(Vec::new()),
            wakeup: Event::new(),
        })
    }

    pub(crate) fn slot(&self, index: usize) -> &WorkerSlot {
        &self.slots[index]
    }

    pub(crate) fn worker_count(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn is_shutting_down(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    /// Queue a ready continuation on some worker.
    ///
    /// Idle-first: the unlocked occupancy read may race with a concurrent
    /// push, occasionally placing two items on a reportedly-empty queue;
    /// that is accepted. When no queue looks empty, fall back to
    /// `floor(sequence · φ) mod workers` to spread load without per-slot
    /// accounting.
    pub(crate) fn enqueue(&self, task: Arc<Task>) {
        for slot in self.slots.iter() {
            if slot.looks_empty() {
                slot.push(task);
                return;
            }
        }

        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let index = ((sequence as f64 * GOLDEN_RATIO) as u64 % self.slots.len() as u64) as usize;
        self.slots[index].push(task);
    }

    /// Stage an (event, continuation) pair for the event thread to admit,
    /// and wake it through the reserved slot-0 event.
    pub(crate) fn enqueue_event(&self, event: Event, waker: Waker) {
        let mut staged = self.staged.lock();
        staged.push((event, waker));
        self.wakeup.signal();
    }
}

/// The scheduler: pinned worker threads, each owning a FIFO of ready
/// continuations, plus one unpinned event thread multiplexing a dynamic
/// wait set.
///
/// Dropping the pool shuts it down: workers and the event thread are joined,
/// and every continuation still queued or parked on an event is dropped
/// without being resumed.
pub struct Pool {
    state: Arc<PoolState>,
    workers: Vec<Thread>,
    event_thread: Option<Thread>,
}

impl Pool {
    /// Create a pool with `hardware_threads() − 1` workers (at least one).
    ///
    /// The worker count must not exceed the hardware thread count or
    /// [`MAX_WORKERS`]; violating either is a configuration error and fatal.
    pub fn new() -> Self {
        let hardware = thread::hardware_threads();
        let workers = hardware.saturating_sub(1).max(1);
        assert!(
            workers <= hardware && workers <= MAX_WORKERS,
            "worker count {} out of range",
            workers
        );
        Self::start(workers, hardware)
    }

    /// Create a pool with an explicit worker count between 1 and
    /// [`MAX_WORKERS`].
    pub fn with_workers(workers: usize) -> Self {
        assert!(
            (1..=MAX_WORKERS).contains(&workers),
            "worker count {} out of range",
            workers
        );
        Self::start(workers, thread::hardware_threads())
    }

    fn start(workers: usize, hardware: usize) -> Self {
        let state = PoolState::new(workers);

        let threads = (0..workers)
            .map(|i| {
                let state = Arc::clone(&state);
                Thread::spawn(&format!("strand-worker-{}", i), move || {
                    // Interleave workers across hyperthread siblings: even
                    // CPU indices for the first half, odd for the rest.
                    let cpu = if i < hardware / 2 {
                        i * 2
                    } else {
                        (i - hardware / 2) * 2 + 1
                    };
                    thread::set_affinity(cpu);
                    worker::run(&state, i);
                })
            })
            .collect();

        let event_state = Arc::clone(&state);
        let event_thread = Thread::spawn("strand-events", move || events::run(&event_state));

        Self {
            state,
            workers: threads,
            event_thread: Some(event_thread),
        }
    }

    /// Number of worker threads.
    pub fn workers(&self) -> usize {
        self.state.worker_count()
    }

    /// Submit a coroutine to the pool and return a future for its output.
    ///
    /// The coroutine starts on whichever worker the enqueue heuristic picks
    /// and stays on pool workers across its suspension points.
    pub fn spawn<F>(&self, future: F) -> crate::sync::Future<F::Output>
    where
        F: std::future::Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let promise = Promise::future();
        let result = Arc::clone(&promise);
        let task = Task::new(
            Box::pin(async move {
                result.fill(future.await);
            }),
            Arc::downgrade(&self.state),
        );
        self.state.enqueue(task);
        promise
    }

    /// Awaitable that unconditionally moves the coroutine onto a worker.
    pub fn schedule(&self) -> Schedule {
        Schedule::new()
    }

    /// Awaitable that resumes the coroutine on a worker once `event` fires,
    /// skipping the suspension entirely if it is already signaled.
    pub fn schedule_event(&self, event: Event) -> ScheduleEvent {
        ScheduleEvent::new(event, Arc::downgrade(&self.state))
    }
}

impl Default for Pool {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Pool {
    fn drop(&mut self) {
        self.state.shutdown.store(true, Ordering::Release);

        // Wake every parked worker so it observes the flag, then join them.
        for slot in self.state.slots.iter() {
            slot.interrupt();
        }
        self.workers.clear();

        // Wake and join the event thread. Signaling under the staging lock
        // pairs with the shutdown check it performs there.
        {
            let _staged = self.state.staged.lock();
            self.state.wakeup.signal();
        }
        if let Some(event_thread) = self.event_thread.take() {
            event_thread.join();
        }

        // Continuations still queued are dropped without being resumed: the
        // destruction order between a queued continuation and a coroutine
        // awaiting its result cannot be guaranteed, so resuming is refused.
        for slot in self.state.slots.iter() {
            slot.discard();
        }
    }
}
