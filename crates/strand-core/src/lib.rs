//! Strand runtime core
//!
//! This crate provides a small runtime foundation:
//! - Coroutine-scheduling thread pool with a dedicated event-multiplexing thread
//! - One-shot promise/future synchronization
//! - Waitable events with an any-of multiplex wait
//! - OS thread wrapper with start/exit instrumentation handlers
//!
//! Coroutines are ordinary Rust futures. A coroutine submitted to the [`Pool`]
//! runs on one of its worker threads; awaiting [`Pool::schedule`] hops it onto
//! another worker, and awaiting [`Pool::schedule_event`] parks it until the
//! event fires, after which it is resumed on a worker again.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod pool;
pub mod sync;
pub mod thread;

pub use pool::{Pool, Schedule, ScheduleEvent};
pub use sync::{Event, Flag, Promise};
pub use thread::{hardware_threads, spawn, Thread};
