//! Minimal HTTP/1.0 fetcher over a raw TCP socket.
//!
//! This module issues a single `GET` per call, reads until the server closes
//! the connection, and returns the raw response. There is no TLS, no
//! keep-alive, no redirect handling, and no header parsing beyond locating
//! the header/body separator.
//!
//! # Wire format
//!
//! ```text
//! GET /{path} HTTP/1.0\r\n
//! Host: {host}\r\n
//! User-Agent: getter\r\n
//! \r\n
//! ```
//!
//! # Example
//!
//! ```no_run
//! use getter_core::fetch::{fetch_url, split_body};
//!
//! # fn example() -> Result<(), getter_core::FetchError> {
//! let response = fetch_url("example.com/index.html")?;
//! let body = split_body(response.as_bytes());
//! println!("{} body bytes", body.len());
//! # Ok(())
//! # }
//! ```

mod buffer;
mod client;
mod constants;
mod error;
mod url;

pub use buffer::{ResponseBuffer, split_body};
pub use client::{Fetch, Fetcher, FetcherConfig};
pub use constants::{DEFAULT_MAX_RESPONSE_BYTES, DEFAULT_PORT, MAX_URL_LEN, USER_AGENT};
pub use error::FetchError;
pub use url::{Target, build_request, split_url};

/// Fetches `host:port/path` with a default [`Fetcher`].
///
/// # Errors
///
/// See [`Fetcher::fetch`].
pub fn fetch(host: &str, path: &str, port: u16) -> Result<ResponseBuffer, FetchError> {
    Fetcher::new().fetch(host, path, port)
}

/// Fetches a `host/path` url on port 80 with a default [`Fetcher`].
///
/// # Errors
///
/// See [`Fetcher::fetch_url`].
pub fn fetch_url(url: &str) -> Result<ResponseBuffer, FetchError> {
    Fetcher::new().fetch_url(url)
}
