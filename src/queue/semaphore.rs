//! Counting signal used for the queue's "available slots" and "available items".
//!
//! A permit counter guarded by a `parking_lot::Mutex`, with a `Condvar` that
//! wakes one waiter per released permit. A wait that expires never touches the
//! counter, so an aborted `acquire_until` leaves nothing to compensate.

use std::time::Instant;

use parking_lot::{Condvar, Mutex};

#[derive(Debug)]
pub(crate) struct Semaphore {
    permits: Mutex<usize>,
    released: Condvar,
}

impl Semaphore {
    pub(crate) fn new(permits: usize) -> Self {
        Self {
            permits: Mutex::new(permits),
            released: Condvar::new(),
        }
    }

    /// Blocks until a permit is available, then takes it.
    pub(crate) fn acquire(&self) {
        let mut permits = self.permits.lock();
        while *permits == 0 {
            self.released.wait(&mut permits);
        }
        *permits -= 1;
    }

    /// Takes a permit if one is available right now.
    pub(crate) fn try_acquire(&self) -> bool {
        let mut permits = self.permits.lock();
        if *permits == 0 {
            return false;
        }
        *permits -= 1;
        true
    }

    /// Blocks until a permit is available or `deadline` passes.
    ///
    /// Returns `false` on expiry; the counter is left untouched in that case.
    pub(crate) fn acquire_until(&self, deadline: Instant) -> bool {
        let mut permits = self.permits.lock();
        while *permits == 0 {
            if self.released.wait_until(&mut permits, deadline).timed_out() {
                // A release may have landed together with the timeout.
                break;
            }
        }
        if *permits == 0 {
            return false;
        }
        *permits -= 1;
        true
    }

    /// Returns one permit and wakes at most one waiter.
    pub(crate) fn release(&self) {
        let mut permits = self.permits.lock();
        *permits += 1;
        drop(permits);
        self.released.notify_one();
    }

    pub(crate) fn available(&self) -> usize {
        *self.permits.lock()
    }
}
