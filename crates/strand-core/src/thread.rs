//! OS thread wrapper, lifecycle handlers, and promise-returning spawn

use crate::sync::{Future, Promise};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use std::thread::{Builder, JoinHandle, ThreadId};

type Handler = Box<dyn Fn() + Send + Sync>;

static START_HANDLER: OnceCell<Handler> = OnceCell::new();
static EXIT_HANDLER: OnceCell<Handler> = OnceCell::new();

/// Install a process-wide handler invoked at the start of every
/// [`Thread`]-created OS thread, before its closure runs.
///
/// This is the seam for external per-thread setup such as creating a scoped
/// memory region or emitting a profiler thread-start marker. At most one
/// handler can be installed; returns `false` if one already was.
pub fn set_start_handler<F>(handler: F) -> bool
where
    F: Fn() + Send + Sync + 'static,
{
    START_HANDLER.set(Box::new(handler)).is_ok()
}

/// Install a process-wide handler invoked when a [`Thread`]-created OS thread
/// finishes its closure, mirroring [`set_start_handler`].
pub fn set_exit_handler<F>(handler: F) -> bool
where
    F: Fn() + Send + Sync + 'static,
{
    EXIT_HANDLER.set(Box::new(handler)).is_ok()
}

/// Number of hardware threads available to the process.
pub fn hardware_threads() -> usize {
    num_cpus::get()
}

/// Pin the calling thread to the given logical CPU.
///
/// Pinning is a placement policy, not a correctness requirement, so failures
/// are ignored. Only implemented on Linux; a no-op elsewhere.
#[cfg(target_os = "linux")]
pub fn set_affinity(cpu: usize) {
    unsafe {
        let mut set: libc::cpu_set_t = std::mem::zeroed();
        libc::CPU_ZERO(&mut set);
        libc::CPU_SET(cpu % libc::CPU_SETSIZE as usize, &mut set);
        libc::sched_setaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &set);
    }
}

/// Pin the calling thread to the given logical CPU (no-op on this platform).
#[cfg(not(target_os = "linux"))]
pub fn set_affinity(_cpu: usize) {}

/// Owns exactly one OS thread running a single closure once.
///
/// The wrapper is move-only; [`join`](Thread::join) and
/// [`detach`](Thread::detach) each consume it. Dropping a still-joinable
/// `Thread` joins it.
pub struct Thread {
    handle: Option<JoinHandle<()>>,
}

impl Thread {
    /// Start a named OS thread running `f` inside the start/exit handler
    /// bracket.
    pub fn spawn<F>(name: &str, f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let handle = Builder::new()
            .name(name.to_string())
            .spawn(move || {
                if let Some(handler) = START_HANDLER.get() {
                    handler();
                }
                f();
                if let Some(handler) = EXIT_HANDLER.get() {
                    handler();
                }
            })
            .expect("Failed to spawn thread");
        Self {
            handle: Some(handle),
        }
    }

    /// OS identifier of the owned thread.
    pub fn id(&self) -> ThreadId {
        self.handle
            .as_ref()
            .expect("thread already consumed")
            .thread()
            .id()
    }

    /// Wait for the thread to finish.
    pub fn join(mut self) {
        let handle = self.handle.take().expect("thread already consumed");
        handle.join().expect("Failed to join thread");
    }

    /// Let the thread run to completion on its own.
    pub fn detach(mut self) {
        self.handle.take();
    }
}

impl Drop for Thread {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.join().expect("Failed to join thread");
        }
    }
}

/// Run `f` on a detached OS thread and return a [`Future`] for its result.
///
/// The future is returned immediately; the thread fills it when `f` returns.
pub fn spawn<T, F>(f: F) -> Future<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let future = Promise::future();
    let promise = Arc::clone(&future);
    Thread::spawn("strand-spawn", move || promise.fill(f())).detach();
    future
}
