//! Getter Core Library
//!
//! Building blocks for a concurrent downloader: a bounded blocking FIFO queue
//! that hands work between producer and consumer threads, and a minimal
//! HTTP/1.0 fetcher speaking over a raw TCP socket.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`queue`] - Bounded, thread-safe, blocking FIFO queue
//! - [`fetch`] - HTTP/1.0 GET over `std::net::TcpStream`
//! - [`pool`] - Worker threads wiring the fetcher to a pair of queues
//! - [`config`] - File-backed defaults for the fetcher and the pool

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod fetch;
pub mod pool;
pub mod queue;

// Re-export commonly used types
pub use config::{Config, ConfigError};
pub use fetch::{
    DEFAULT_PORT, Fetch, FetchError, Fetcher, FetcherConfig, ResponseBuffer, fetch, fetch_url,
    split_body,
};
pub use pool::{FetchOutcome, FetchPool, PoolConfig, PoolError, PoolStats};
pub use queue::{BoundedQueue, DestroyError, PutError, QueueError, QueueState};
