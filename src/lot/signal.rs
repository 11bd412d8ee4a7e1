//! Wakeups for actors waiting on the lane or on a free space.
//!
//! Each `notify` bumps a generation counter. A waiter takes a ticket before
//! its attempt and then waits for the generation to move past it, so a
//! change that lands between the attempt and the wait is not missed.

use parking_lot::{Condvar, Mutex};
use std::time::Duration;
use tokio::sync::futures::Notified;
use tokio::sync::Notify;

#[derive(Debug, Default)]
pub struct ChangeSignal {
    generation: Mutex<u64>,
    changed: Condvar,
    notify: Notify,
}

impl ChangeSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notify(&self) {
        *self.generation.lock() += 1;
        self.changed.notify_all();
        self.notify.notify_waiters();
    }

    pub fn ticket(&self) -> u64 {
        *self.generation.lock()
    }

    /// Blocks until the generation moves past `ticket` or `timeout` elapses.
    /// Returns `true` if woken by a change.
    pub fn wait_since(&self, ticket: u64, timeout: Duration) -> bool {
        let mut generation = self.generation.lock();
        if *generation != ticket {
            return true;
        }
        let result = self
            .changed
            .wait_while_for(&mut generation, |current| *current == ticket, timeout);
        !result.timed_out()
    }

    /// Future resolving on the next `notify`. Registration happens on
    /// creation, so create it before the attempt it should cover.
    pub fn notified(&self) -> Notified<'_> {
        self.notify.notified()
    }
}
