//! Constants for the fetch module (wire format, sizes, timeouts).

/// Port used by [`fetch_url`](super::fetch_url).
pub const DEFAULT_PORT: u16 = 80;

/// User-Agent sent with every request.
pub const USER_AGENT: &str = "getter";

/// Size of each socket read; the response buffer grows by this much per read.
pub const READ_CHUNK_SIZE: usize = 2048;

/// Longest url accepted by `fetch_url`.
pub const MAX_URL_LEN: usize = 2048;

/// Default cap on a full response (headers + body), 16 MiB.
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 16 * 1024 * 1024;

/// Default TCP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default socket read/write timeout (5 minutes for large responses).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Separator between headers and body.
pub const HEADER_BODY_SEPARATOR: &[u8] = b"\r\n\r\n";
