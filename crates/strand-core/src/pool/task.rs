//! Pool-owned coroutines and their resumable handles

use crate::pool::PoolState;
use parking_lot::Mutex;
use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::task::{Context, Poll, Wake, Waker};

pub(crate) type TaskFuture = Pin<Box<dyn std::future::Future<Output = ()> + Send + 'static>>;

/// A coroutine owned by the pool.
///
/// The `Arc<Task>` is the continuation: at any moment it sits in exactly one
/// worker queue slot or behind one event-table waker, and resuming it
/// consumes that slot. The waker built from it re-enqueues the task on its
/// owning pool, so every resumption goes through ordinary worker scheduling.
pub(crate) struct Task {
    /// The coroutine body; `None` once it has run to completion.
    future: Mutex<Option<TaskFuture>>,
    /// Owning pool, used by the waker to re-enqueue.
    pool: Weak<PoolState>,
}

impl Task {
    pub(crate) fn new(future: TaskFuture, pool: Weak<PoolState>) -> Arc<Self> {
        Arc::new(Self {
            future: Mutex::new(Some(future)),
            pool,
        })
    }

    /// Resume the coroutine until its next suspension point or completion.
    ///
    /// Polls in place under the task's own lock: a wake that lands mid-poll
    /// (another worker picking the handle up immediately) serializes behind
    /// this resume instead of observing a checked-out coroutine.
    pub(crate) fn run(self: Arc<Self>) {
        let waker = Waker::from(Arc::clone(&self));
        let mut cx = Context::from_waker(&waker);
        let mut slot = self.future.lock();
        if let Some(future) = slot.as_mut() {
            if let Poll::Ready(()) = future.as_mut().poll(&mut cx) {
                *slot = None;
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn is_complete(&self) -> bool {
        self.future.lock().is_none()
    }
}

impl Wake for Task {
    fn wake(self: Arc<Self>) {
        if let Some(pool) = self.pool.upgrade() {
            pool.enqueue(self);
        }
    }

    fn wake_by_ref(self: &Arc<Self>) {
        if let Some(pool) = self.pool.upgrade() {
            pool.enqueue(Arc::clone(self));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_run_drives_future_to_completion() {
        let ran = Arc::new(AtomicUsize::new(0));
        let counter = ran.clone();
        let task = Task::new(
            Box::pin(async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
            Weak::new(),
        );

        assert!(!task.is_complete());
        task.clone().run();
        assert_eq!(ran.load(Ordering::SeqCst), 1);
        assert!(task.is_complete());
    }

    #[test]
    fn test_run_after_completion_is_noop() {
        let ran = Arc::new(AtomicUsize::new(0));
        let counter = ran.clone();
        let task = Task::new(
            Box::pin(async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
            Weak::new(),
        );

        task.clone().run();
        task.clone().run();
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_wake_without_pool_is_noop() {
        let task = Task::new(Box::pin(async {}), Weak::new());
        let waker = Waker::from(task);
        waker.wake_by_ref();
        waker.wake();
    }
}
