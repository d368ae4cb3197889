//! Event thread: admits staged waits and demotes fired ones to the workers

use crate::pool::PoolState;
use crate::sync::{self, Event};
use std::task::Waker;

/// Event thread main loop.
///
/// The live tables are owned here: `events[0]` is the pool's reserved wakeup
/// event and `wakers[k - 1]` is the continuation for `events[k]`. Only this
/// thread touches them; producers go through the staging vector, which is
/// what the staging mutex guards.
pub(crate) fn run(state: &PoolState) {
    let mut events: Vec<Event> = vec![state.wakeup.clone()];
    let mut wakers: Vec<Waker> = Vec::new();

    loop {
        let fired = sync::wait_any(&events);

        if fired == 0 {
            let mut staged = state.staged.lock();
            if state.is_shutting_down() {
                // Remaining live wakers and staged pairs are dropped
                // unresumed, symmetric with the worker queues.
                return;
            }
            for (event, waker) in staged.drain(..) {
                events.push(event);
                wakers.push(waker);
            }
            state.wakeup.reset();
        } else {
            // O(1) removal; order among the remaining events is not
            // preserved. When the fired slot is last this is a plain pop.
            events.swap_remove(fired);
            let waker = wakers.swap_remove(fired - 1);
            // Demote to ordinary worker scheduling. The continuation is
            // never resumed inline on this thread.
            waker.wake();
        }
    }
}
