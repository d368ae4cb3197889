//! Synchronization primitives beneath the pool
//!
//! This module provides the blocking primitives the scheduler and its users
//! are built on: the one-shot [`Flag`], the single-fill [`Promise`] with its
//! shared [`Future`] handle, and the waitable [`Event`] with the
//! [`wait_any`] multiplex used by the pool's event thread.

mod event;
mod flag;
mod promise;

pub use event::{wait_any, Event};
pub use flag::Flag;
pub use promise::{Future, Promise};
