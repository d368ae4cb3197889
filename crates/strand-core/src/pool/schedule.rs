//! Awaitable adapters that hand a coroutine to the pool

use crate::pool::PoolState;
use crate::sync::Event;
use std::future::Future;
use std::pin::Pin;
use std::sync::Weak;
use std::task::{Context, Poll};

/// Awaitable that unconditionally suspends and relocates the coroutine onto
/// the pool's worker threads.
///
/// The wake path of a pool task is `enqueue`, so waking here hands the
/// continuation straight to a worker queue; the next poll happens on a
/// worker and completes the await.
#[derive(Debug, Default)]
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct Schedule {
    queued: bool,
}

impl Schedule {
    pub(crate) fn new() -> Self {
        Self { queued: false }
    }
}

impl Future for Schedule {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.queued {
            return Poll::Ready(());
        }
        self.queued = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}

/// Awaitable that parks the coroutine until its event fires, resuming it on
/// a worker thread.
///
/// If the event is already signaled at suspension time the await completes
/// inline: no table entry is created and no thread hop happens. Otherwise
/// the continuation waits in the pool's event tables and, once the event
/// fires, re-enters ordinary worker scheduling.
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct ScheduleEvent {
    event: Event,
    pool: Weak<PoolState>,
    queued: bool,
}

impl ScheduleEvent {
    pub(crate) fn new(event: Event, pool: Weak<PoolState>) -> Self {
        Self {
            event,
            pool,
            queued: false,
        }
    }
}

impl Future for ScheduleEvent {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.queued {
            return Poll::Ready(());
        }
        // Fast path: already signaled, skip the queue entirely.
        if self.event.try_wait() {
            return Poll::Ready(());
        }
        if let Some(state) = self.pool.upgrade() {
            state.enqueue_event(self.event.clone(), cx.waker().clone());
            self.queued = true;
        }
        // A dead pool never resumes anything; the task holding this future
        // is itself being torn down.
        Poll::Pending
    }
}
