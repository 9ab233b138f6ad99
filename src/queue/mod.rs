//! Bounded, thread-safe, blocking FIFO queue.
//!
//! This module provides [`BoundedQueue`], the hand-off point between producer
//! and consumer threads. Producers block in [`BoundedQueue::put`] while the
//! queue is full; consumers block in [`BoundedQueue::take`] while it is empty.
//!
//! # Overview
//!
//! Capacity is enforced with two counting signals:
//! - "available slots", initialized to the capacity
//! - "available items", initialized to zero
//!
//! `put` takes a slot, appends under the list lock, then gives an item.
//! `take` takes an item, pops under the list lock, then gives a slot.
//! Signals are always taken before the lock and given after it is released,
//! so no thread ever waits while holding the list lock.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::thread;
//! use getter_core::queue::BoundedQueue;
//!
//! let queue = Arc::new(BoundedQueue::new(2)?);
//!
//! let producer = {
//!     let queue = Arc::clone(&queue);
//!     thread::spawn(move || {
//!         for n in 0..5 {
//!             queue.put(n);
//!         }
//!     })
//! };
//!
//! let received: Vec<i32> = (0..5).map(|_| queue.take()).collect();
//! producer.join().unwrap();
//! assert_eq!(received, vec![0, 1, 2, 3, 4]);
//! # Ok::<(), getter_core::QueueError>(())
//! ```

mod error;
mod semaphore;

pub use error::{DestroyError, PutError, QueueError};

use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use semaphore::Semaphore;

/// Result type for queue operations.
pub type Result<T> = std::result::Result<T, QueueError>;

/// Occupancy of a queue at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueState {
    /// No items; `take` would block.
    Empty,
    /// Some items and some free slots; neither operation would block.
    Partial,
    /// Every slot is used; `put` would block.
    Full,
}

impl QueueState {
    fn from_counts(len: usize, capacity: usize) -> Self {
        if len == 0 {
            Self::Empty
        } else if len >= capacity {
            Self::Full
        } else {
            Self::Partial
        }
    }
}

/// Fixed-capacity FIFO shared by any number of producer and consumer threads.
///
/// Ownership of each item moves from the producer into the queue on `put` and
/// from the queue to the consumer on `take`. Items are delivered in global
/// insertion order across all producers.
///
/// # Thread Safety
///
/// `BoundedQueue<T>` is `Send + Sync` whenever `T: Send`; share it with `Arc`
/// or borrow it into scoped threads.
pub struct BoundedQueue<T> {
    capacity: usize,
    items: Mutex<VecDeque<T>>,
    available_slots: Semaphore,
    available_items: Semaphore,
}

impl<T> BoundedQueue<T> {
    /// Creates an empty queue holding at most `capacity` items.
    ///
    /// Any integer type is accepted so that negative requests can be reported
    /// rather than wrapped.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::InvalidCapacity`] if `capacity` is zero or
    /// negative, and [`QueueError::AllocationFailure`] if the slot ring cannot
    /// be reserved.
    pub fn new<C>(capacity: C) -> Result<Self>
    where
        C: TryInto<usize> + Copy + fmt::Display,
    {
        let Some(capacity) = capacity.try_into().ok().filter(|&c| c > 0) else {
            return Err(QueueError::invalid_capacity(capacity));
        };

        let mut ring = VecDeque::new();
        ring.try_reserve_exact(capacity)
            .map_err(|_| QueueError::AllocationFailure { capacity })?;

        debug!(capacity, "creating bounded queue");

        Ok(Self {
            capacity,
            items: Mutex::new(ring),
            available_slots: Semaphore::new(capacity),
            available_items: Semaphore::new(0),
        })
    }

    /// Inserts `item` at the tail, blocking while the queue is full.
    pub fn put(&self, item: T) {
        self.available_slots.acquire();
        self.push_back(item);
    }

    /// Removes the head item, blocking while the queue is empty.
    pub fn take(&self) -> T {
        self.available_items.acquire();
        self.pop_front()
    }

    /// Inserts `item` only if a slot is free right now.
    ///
    /// # Errors
    ///
    /// Returns [`PutError::Full`] carrying the item when the queue is full.
    pub fn try_put(&self, item: T) -> std::result::Result<(), PutError<T>> {
        if !self.available_slots.try_acquire() {
            return Err(PutError::Full(item));
        }
        self.push_back(item);
        Ok(())
    }

    /// Removes the head item only if one is present right now.
    pub fn try_take(&self) -> Option<T> {
        if self.available_items.try_acquire() {
            Some(self.pop_front())
        } else {
            None
        }
    }

    /// Like [`put`](Self::put), but gives up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`PutError::Timeout`] carrying the item when no slot freed up
    /// in time. The queue's counters are unchanged in that case.
    pub fn put_timeout(&self, item: T, timeout: Duration) -> std::result::Result<(), PutError<T>> {
        if !self.available_slots.acquire_until(deadline_after(timeout)) {
            return Err(PutError::Timeout {
                item,
                waited: timeout,
            });
        }
        self.push_back(item);
        Ok(())
    }

    /// Like [`take`](Self::take), but gives up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Timeout`] when no item arrived in time.
    pub fn take_timeout(&self, timeout: Duration) -> Result<T> {
        if !self.available_items.acquire_until(deadline_after(timeout)) {
            return Err(QueueError::Timeout { waited: timeout });
        }
        Ok(self.pop_front())
    }

    /// Maximum number of items the queue holds at once.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of items currently queued.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity
    }

    #[must_use]
    pub fn state(&self) -> QueueState {
        QueueState::from_counts(self.len(), self.capacity)
    }

    /// Current value of the "available slots" signal.
    ///
    /// While no `put`/`take` is in flight this equals `capacity() - len()`.
    #[must_use]
    pub fn available_slots(&self) -> usize {
        self.available_slots.available()
    }

    /// Current value of the "available items" signal.
    ///
    /// While no `put`/`take` is in flight this equals `len()`.
    #[must_use]
    pub fn available_items(&self) -> usize {
        self.available_items.available()
    }

    /// Tears the queue down if it holds no items.
    ///
    /// Taking `self` by value guarantees no other thread can still `put` or
    /// `take`; callers sharing the queue through `Arc` recover it with
    /// `Arc::try_unwrap` first.
    ///
    /// # Errors
    ///
    /// Returns [`DestroyError::NotEmpty`] with the queue untouched when items
    /// remain.
    pub fn destroy(self) -> std::result::Result<(), DestroyError<T>> {
        let remaining = self.len();
        if remaining > 0 {
            warn!(
                remaining,
                capacity = self.capacity,
                "refusing to destroy non-empty queue"
            );
            return Err(DestroyError::NotEmpty {
                remaining,
                queue: self,
            });
        }
        debug!(capacity = self.capacity, "destroying empty queue");
        Ok(())
    }

    /// Tears the queue down, handing every remaining item to `cleanup` in FIFO
    /// order.
    pub fn destroy_with<F>(self, cleanup: F)
    where
        F: FnMut(T),
    {
        let remaining = self.items.into_inner();
        debug!(
            remaining = remaining.len(),
            capacity = self.capacity,
            "destroying queue with cleanup"
        );
        remaining.into_iter().for_each(cleanup);
    }

    // Caller holds a slot permit.
    fn push_back(&self, item: T) {
        let mut items = self.items.lock();
        items.push_back(item);
        trace!(len = items.len(), "item enqueued");
        drop(items);
        self.available_items.release();
    }

    // Caller holds an item permit, so the ring cannot be empty.
    fn pop_front(&self) -> T {
        let mut items = self.items.lock();
        let Some(item) = items.pop_front() else {
            unreachable!("item permit held but queue is empty");
        };
        trace!(len = items.len(), "item dequeued");
        drop(items);
        self.available_slots.release();
        item
    }
}

impl<T> fmt::Debug for BoundedQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedQueue")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .field("available_slots", &self.available_slots())
            .field("available_items", &self.available_items())
            .finish()
    }
}

fn deadline_after(timeout: Duration) -> Instant {
    let now = Instant::now();
    // Effectively unbounded when the addition would overflow.
    now.checked_add(timeout)
        .unwrap_or_else(|| now + Duration::from_secs(u64::from(u32::MAX)))
}
