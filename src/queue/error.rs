//! Error types for queue operations.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use super::BoundedQueue;

/// Errors that can occur during queue construction or bounded waits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    /// Requested capacity is zero, negative, or not representable.
    #[error("invalid queue capacity {requested}: must be at least 1")]
    InvalidCapacity {
        /// The capacity as the caller supplied it.
        requested: String,
    },

    /// The slot ring could not be reserved.
    #[error("failed to allocate queue storage for {capacity} items")]
    AllocationFailure {
        /// Capacity that was being reserved.
        capacity: usize,
    },

    /// A deadline-bounded wait expired before the queue became ready.
    #[error("queue wait timed out after {waited:?}")]
    Timeout {
        /// How long the caller waited.
        waited: Duration,
    },
}

impl QueueError {
    /// Creates an `InvalidCapacity` error from any displayable capacity value.
    pub fn invalid_capacity(requested: impl fmt::Display) -> Self {
        Self::InvalidCapacity {
            requested: requested.to_string(),
        }
    }

    /// Returns true when this error is a deadline expiry.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// A rejected `put` variant. The item is handed back to the caller.
#[derive(Error, PartialEq, Eq)]
pub enum PutError<T> {
    /// `try_put` found no free slot.
    #[error("queue is full")]
    Full(T),

    /// `put_timeout` waited the full duration without a free slot.
    #[error("queue put timed out after {waited:?}")]
    Timeout {
        /// The rejected item.
        item: T,
        /// How long the caller waited.
        waited: Duration,
    },
}

impl<T> PutError<T> {
    /// Recovers the item that could not be enqueued.
    pub fn into_inner(self) -> T {
        match self {
            Self::Full(item) | Self::Timeout { item, .. } => item,
        }
    }
}

// Manual impl so `T` needs no `Debug` bound.
impl<T> fmt::Debug for PutError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full(_) => f.write_str("Full(..)"),
            Self::Timeout { waited, .. } => f
                .debug_struct("Timeout")
                .field("waited", waited)
                .finish_non_exhaustive(),
        }
    }
}

/// `destroy` refused to tear down a queue that still holds items.
///
/// The queue is handed back so the caller can drain it or switch to
/// [`BoundedQueue::destroy_with`].
#[derive(Error)]
pub enum DestroyError<T> {
    /// The queue was not empty.
    #[error(
        "queue still holds {remaining} item(s)\n  Suggestion: drain with take()/try_take() or use destroy_with()"
    )]
    NotEmpty {
        /// Number of items left in the queue.
        remaining: usize,
        /// The untouched queue.
        queue: BoundedQueue<T>,
    },
}

impl<T> DestroyError<T> {
    /// Recovers the queue that was refused.
    pub fn into_queue(self) -> BoundedQueue<T> {
        match self {
            Self::NotEmpty { queue, .. } => queue,
        }
    }
}

impl<T> fmt::Debug for DestroyError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotEmpty { remaining, queue } => f
                .debug_struct("NotEmpty")
                .field("remaining", remaining)
                .field("queue", queue)
                .finish(),
        }
    }
}
