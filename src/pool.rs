//! Worker pool that fetches a fixed list of urls through bounded queues.
//!
//! This module provides [`FetchPool`], which wires a [`Fetch`] implementation
//! between two [`BoundedQueue`]s:
//!
//! ```text
//! feeder ──jobs──▶ worker × N ──results──▶ caller
//! ```
//!
//! # Concurrency Model
//!
//! - A feeder thread puts every url, then one end marker per worker
//! - Each worker takes jobs until it sees an end marker, fetching each url
//!   and putting the outcome on the result queue
//! - The calling thread drains results until every worker has reported that
//!   it finished
//! - Both queues are bounded, so a slow consumer stalls the workers and the
//!   workers stall the feeder; memory stays proportional to the capacity
//!
//! Work is never discovered: the pool fetches exactly the urls it is given.
//!
//! # Example
//!
//! ```no_run
//! use getter_core::{FetchPool, Fetcher, PoolConfig};
//!
//! # fn example() -> Result<(), getter_core::PoolError> {
//! let pool = FetchPool::new(PoolConfig::default(), Fetcher::new())?;
//! let urls = vec!["example.com/a".to_string(), "example.com/b".to_string()];
//! let stats = pool.run(urls, |outcome| match outcome.body() {
//!     Some(body) => println!("{}: {} bytes", outcome.url, body.len()),
//!     None => eprintln!("{} failed", outcome.url),
//! })?;
//! println!("completed {}, failed {}", stats.completed(), stats.failed());
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use crate::fetch::{Fetch, FetchError, ResponseBuffer};
use crate::queue::{BoundedQueue, QueueError};

/// Minimum allowed worker count.
const MIN_WORKERS: usize = 1;

/// Maximum allowed worker count.
const MAX_WORKERS: usize = 100;

/// Default worker count if not specified.
pub const DEFAULT_WORKERS: usize = 4;

/// Default capacity of the job and result queues.
pub const DEFAULT_QUEUE_CAPACITY: usize = 16;

/// Poll interval while unblocking the feeder after a failure.
const DRAIN_POLL: Duration = Duration::from_millis(10);

/// Error type for pool operations.
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    /// Invalid worker count provided.
    #[error("invalid worker count {value}: must be between {MIN_WORKERS} and {MAX_WORKERS}")]
    InvalidWorkers {
        /// The invalid value that was provided.
        value: usize,
    },

    /// Queue construction failed.
    #[error("queue error: {0}")]
    Queue(#[from] QueueError),

    /// An OS thread could not be started.
    #[error("failed to spawn {role} thread: {source}")]
    Spawn {
        /// Which thread failed to start.
        role: &'static str,
        /// The underlying OS error.
        #[source]
        source: io::Error,
    },

    /// A worker or the feeder panicked.
    #[error("{role} thread panicked")]
    WorkerPanicked {
        /// Which thread panicked.
        role: &'static str,
    },
}

/// Sizing for a [`FetchPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Number of worker threads (1-100).
    pub workers: usize,
    /// Capacity of both the job queue and the result queue.
    pub queue_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

/// Result of fetching one url.
#[derive(Debug)]
pub struct FetchOutcome {
    /// The url as it was submitted.
    pub url: String,
    /// The raw response, or the stage that failed.
    pub result: Result<ResponseBuffer, FetchError>,
}

impl FetchOutcome {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// Content after the header/body separator, for successful fetches.
    #[must_use]
    pub fn body(&self) -> Option<&[u8]> {
        self.result.as_ref().ok().map(ResponseBuffer::body)
    }
}

/// Statistics from a pool run.
///
/// Updated by the worker threads with atomic counters.
#[derive(Debug, Default)]
pub struct PoolStats {
    completed: AtomicUsize,
    failed: AtomicUsize,
    bytes: AtomicU64,
}

impl PoolStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of successful fetches.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Returns the number of failed fetches.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }

    /// Returns the total number of urls processed (completed + failed).
    #[must_use]
    pub fn total(&self) -> usize {
        self.completed() + self.failed()
    }

    /// Returns the raw response bytes received across successful fetches.
    #[must_use]
    pub fn bytes(&self) -> u64 {
        self.bytes.load(Ordering::SeqCst)
    }

    fn record(&self, result: &Result<ResponseBuffer, FetchError>) {
        match result {
            Ok(buffer) => {
                self.completed.fetch_add(1, Ordering::SeqCst);
                self.bytes.fetch_add(buffer.len() as u64, Ordering::SeqCst);
            }
            Err(_) => {
                self.failed.fetch_add(1, Ordering::SeqCst);
            }
        }
    }
}

enum Job {
    Fetch(String),
    Stop,
}

enum Event {
    Fetched(FetchOutcome),
    WorkerDone,
}

/// Fixed-size pool of fetch workers fed through bounded queues.
pub struct FetchPool<F> {
    config: PoolConfig,
    fetcher: F,
}

impl<F> fmt::Debug for FetchPool<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchPool")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<F: Fetch> FetchPool<F> {
    /// Creates a pool with the given sizing and fetcher.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidWorkers`] if `workers` is outside 1-100 and
    /// [`PoolError::Queue`] if `queue_capacity` is zero.
    #[instrument(level = "debug", skip(fetcher))]
    pub fn new(config: PoolConfig, fetcher: F) -> Result<Self, PoolError> {
        if !(MIN_WORKERS..=MAX_WORKERS).contains(&config.workers) {
            return Err(PoolError::InvalidWorkers {
                value: config.workers,
            });
        }
        if config.queue_capacity == 0 {
            return Err(QueueError::invalid_capacity(config.queue_capacity).into());
        }

        debug!(
            workers = config.workers,
            queue_capacity = config.queue_capacity,
            "creating fetch pool"
        );

        Ok(Self { config, fetcher })
    }

    #[must_use]
    pub fn config(&self) -> PoolConfig {
        self.config
    }

    #[must_use]
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Fetches every url, handing each outcome to `on_outcome` on the calling
    /// thread as soon as a worker produces it.
    ///
    /// Outcomes arrive in completion order, not submission order. A failed
    /// fetch is reported through its outcome and does not stop the run.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Spawn`] if a thread cannot be started and
    /// [`PoolError::WorkerPanicked`] if a worker or the feeder panicked.
    ///
    /// # Panics
    ///
    /// Re-raises a panic from `on_outcome` once every pool thread has stopped.
    #[instrument(skip(self, urls, on_outcome), fields(workers = self.config.workers))]
    pub fn run<I, C>(&self, urls: I, mut on_outcome: C) -> Result<PoolStats, PoolError>
    where
        I: IntoIterator<Item = String>,
        I::IntoIter: Send,
        C: FnMut(FetchOutcome),
    {
        let workers = self.config.workers;
        let jobs = BoundedQueue::new(self.config.queue_capacity)?;
        let events = BoundedQueue::new(self.config.queue_capacity)?;
        let stats = PoolStats::new();
        let urls = urls.into_iter();

        thread::scope(|scope| -> Result<(), PoolError> {
            let feeder = thread::Builder::new()
                .name("getter-feeder".to_string())
                .spawn_scoped(scope, || feed(&jobs, urls, workers))
                .map_err(|source| PoolError::Spawn {
                    role: "feeder",
                    source,
                })?;

            let mut handles = Vec::with_capacity(workers);
            for index in 0..workers {
                let spawned = thread::Builder::new()
                    .name(format!("getter-worker-{index}"))
                    .spawn_scoped(scope, || work(&self.fetcher, &jobs, &events, &stats));
                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(source) => {
                        // Workers already running would wait on jobs forever.
                        abandon(&jobs, &events, handles.len(), &feeder);
                        return Err(PoolError::Spawn {
                            role: "worker",
                            source,
                        });
                    }
                }
            }

            let mut finished = 0;
            while finished < workers {
                match events.take() {
                    Event::Fetched(outcome) => {
                        let delivered =
                            panic::catch_unwind(AssertUnwindSafe(|| on_outcome(outcome)));
                        if let Err(payload) = delivered {
                            // Workers and feeder would block on full queues forever.
                            abandon(&jobs, &events, workers - finished, &feeder);
                            panic::resume_unwind(payload);
                        }
                    }
                    Event::WorkerDone => finished += 1,
                }
            }

            // Only non-empty if a worker died early; unblocks the feeder.
            while !feeder.is_finished() {
                let _ = jobs.take_timeout(DRAIN_POLL);
            }

            let submitted = feeder.join().map_err(|_| PoolError::WorkerPanicked {
                role: "feeder",
            })?;
            for handle in handles {
                handle.join().map_err(|_| PoolError::WorkerPanicked { role: "worker" })?;
            }

            info!(
                submitted,
                completed = stats.completed(),
                failed = stats.failed(),
                bytes = stats.bytes(),
                "fetch pool finished"
            );
            Ok(())
        })?;

        Ok(stats)
    }
}

fn feed<I>(jobs: &BoundedQueue<Job>, urls: I, workers: usize) -> usize
where
    I: Iterator<Item = String>,
{
    let mut submitted = 0;
    for url in urls {
        jobs.put(Job::Fetch(url));
        submitted += 1;
    }
    for _ in 0..workers {
        jobs.put(Job::Stop);
    }
    debug!(submitted, "feeder done");
    submitted
}

fn work<F: Fetch>(
    fetcher: &F,
    jobs: &BoundedQueue<Job>,
    events: &BoundedQueue<Event>,
    stats: &PoolStats,
) {
    // Reports completion even if the fetcher panics, so the caller's drain
    // loop still terminates and the panic surfaces on join.
    struct DoneGuard<'a>(&'a BoundedQueue<Event>);
    impl Drop for DoneGuard<'_> {
        fn drop(&mut self) {
            self.0.put(Event::WorkerDone);
        }
    }
    let _done = DoneGuard(events);

    while let Job::Fetch(url) = jobs.take() {
        let result = fetcher.fetch_url(&url);
        stats.record(&result);
        if let Err(e) = &result {
            warn!(url = %url, stage = e.stage(), error = %e, "fetch failed");
        }
        events.put(Event::Fetched(FetchOutcome { url, result }));
    }
}

/// Stops the `running` workers and the feeder, discarding pending jobs and
/// outcomes. Used after a partial spawn or a panic in the outcome callback.
fn abandon(
    jobs: &BoundedQueue<Job>,
    events: &BoundedQueue<Event>,
    running: usize,
    feeder: &thread::ScopedJoinHandle<'_, usize>,
) {
    warn!(running, "abandoning pool run");
    let mut finished = 0;
    while finished < running || !feeder.is_finished() {
        while jobs.try_take().is_some() {}
        if finished < running {
            let _ = jobs.try_put(Job::Stop);
        }
        if let Ok(Event::WorkerDone) = events.take_timeout(DRAIN_POLL) {
            finished += 1;
        }
    }
}
