//! Blocking HTTP/1.0 client over `std::net::TcpStream`.

use std::io::Write;
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::{debug, instrument, warn};

use super::buffer::ResponseBuffer;
use super::constants::{CONNECT_TIMEOUT_SECS, DEFAULT_MAX_RESPONSE_BYTES, READ_TIMEOUT_SECS};
use super::error::FetchError;
use super::url::{build_request, split_url};

/// Anything that turns a `host/path` url into a raw response.
///
/// [`Fetcher`] is the socket implementation; the pool accepts any
/// implementation so callers can substitute their own transport.
pub trait Fetch: Send + Sync {
    /// Fetches `url` and returns the raw response (headers + body).
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] naming the stage that failed.
    fn fetch_url(&self, url: &str) -> Result<ResponseBuffer, FetchError>;
}

/// Timeouts and size cap applied to every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetcherConfig {
    /// Per-address TCP connect timeout.
    pub connect_timeout: Duration,
    /// Socket read and write timeout.
    pub read_timeout: Duration,
    /// Largest full response accepted, in bytes.
    pub max_response_bytes: usize,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(CONNECT_TIMEOUT_SECS),
            read_timeout: Duration::from_secs(READ_TIMEOUT_SECS),
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
        }
    }
}

/// HTTP/1.0 GET client. Holds only configuration, so one instance can be
/// shared by every worker thread.
///
/// # Example
///
/// ```no_run
/// use getter_core::fetch::Fetcher;
///
/// # fn example() -> Result<(), getter_core::FetchError> {
/// let fetcher = Fetcher::new();
/// let response = fetcher.fetch_url("example.com/index.html")?;
/// println!("{}", String::from_utf8_lossy(response.body()));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Fetcher {
    config: FetcherConfig,
}

impl Fetcher {
    /// Creates a fetcher with default timeouts and a 16 MiB response cap.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: FetcherConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// Sends `GET /{path}` to `host:port` and reads until the peer closes.
    ///
    /// # Errors
    ///
    /// - [`FetchError::ResolutionFailure`] if `host:port` has no address
    /// - [`FetchError::ConnectFailed`] if no address accepts the connection
    /// - [`FetchError::SocketSetupFailed`] if socket timeouts cannot be applied
    /// - [`FetchError::SendFailed`] if the request cannot be written
    /// - [`FetchError::RecvFailed`] if a read fails or times out
    /// - [`FetchError::ResponseTooLarge`] past `max_response_bytes`
    #[instrument(level = "debug", skip(self))]
    pub fn fetch(&self, host: &str, path: &str, port: u16) -> Result<ResponseBuffer, FetchError> {
        let addrs = resolve(host, port)?;
        let mut stream = self.connect(host, port, &addrs)?;

        stream
            .set_read_timeout(Some(self.config.read_timeout))
            .and_then(|()| stream.set_write_timeout(Some(self.config.read_timeout)))
            .map_err(|e| FetchError::socket_setup(host, e))?;

        let request = build_request(host, path);
        stream
            .write_all(request.as_bytes())
            .map_err(|e| FetchError::send(host, e))?;
        debug!(bytes = request.len(), "request sent");

        let mut buffer = ResponseBuffer::new()?;
        buffer.fill_from(&mut stream, self.config.max_response_bytes, host)?;

        // Peer already closed; a failed shutdown changes nothing for the caller.
        let _ = stream.shutdown(Shutdown::Both);

        debug!(bytes = buffer.len(), "response received");
        Ok(buffer)
    }

    /// Splits `url` at its first `/` and fetches it on port 80.
    ///
    /// # Errors
    ///
    /// [`FetchError::MalformedUrl`] / [`FetchError::UrlTooLong`] for bad
    /// input, otherwise as [`fetch`](Self::fetch).
    pub fn fetch_url(&self, url: &str) -> Result<ResponseBuffer, FetchError> {
        let target = split_url(url)?;
        self.fetch(&target.host, &target.path, target.port)
    }

    fn connect(
        &self,
        host: &str,
        port: u16,
        addrs: &[SocketAddr],
    ) -> Result<TcpStream, FetchError> {
        let mut last_error = None;
        for addr in addrs {
            match TcpStream::connect_timeout(addr, self.config.connect_timeout) {
                Ok(stream) => {
                    debug!(%addr, "connected");
                    return Ok(stream);
                }
                Err(e) => {
                    debug!(%addr, error = %e, "connect attempt failed");
                    last_error = Some(e);
                }
            }
        }

        let source = last_error.unwrap_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::AddrNotAvailable, "no address to try")
        });
        warn!(host, port, error = %source, "connection failed");
        Err(FetchError::connect(host, port, source))
    }
}

impl Fetch for Fetcher {
    fn fetch_url(&self, url: &str) -> Result<ResponseBuffer, FetchError> {
        Fetcher::fetch_url(self, url)
    }
}

fn resolve(host: &str, port: u16) -> Result<Vec<SocketAddr>, FetchError> {
    let addrs: Vec<SocketAddr> = (host, port)
        .to_socket_addrs()
        .map_err(|e| FetchError::resolution(host, port, e))?
        .collect();

    if addrs.is_empty() {
        return Err(FetchError::resolution(
            host,
            port,
            std::io::Error::new(std::io::ErrorKind::NotFound, "no addresses returned"),
        ));
    }

    debug!(host, port, addresses = addrs.len(), "resolved host");
    Ok(addrs)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::{BufRead, BufReader};
    use std::net::TcpListener;
    use std::thread;

    use super::*;
    use crate::fetch::constants::DEFAULT_PORT;

    /// Serves one connection: reads the request head, writes `response`, closes.
    fn serve_once(response: &'static [u8]) -> (u16, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut head = String::new();
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                head.push_str(&line);
                if line == "\r\n" || line.is_empty() {
                    break;
                }
            }
            stream.write_all(response).unwrap();
            head
        });
        (port, handle)
    }

    #[test]
    fn test_default_config_values() {
        let config = FetcherConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(30));
        assert_eq!(config.read_timeout, Duration::from_secs(300));
        assert_eq!(config.max_response_bytes, 16 * 1024 * 1024);
    }

    #[test]
    fn test_fetch_sends_wire_format_and_reads_to_close() {
        let (port, server) = serve_once(b"HTTP/1.0 200 OK\r\nContent-Type: text/plain\r\n\r\nhello");
        let response = Fetcher::new().fetch("127.0.0.1", "page", port).unwrap();

        assert_eq!(response.body(), b"hello");
        assert!(response.as_bytes().starts_with(b"HTTP/1.0 200 OK"));
        let head = server.join().unwrap();
        assert_eq!(
            head,
            "GET /page HTTP/1.0\r\nHost: 127.0.0.1\r\nUser-Agent: getter\r\n\r\n"
        );
    }

    #[test]
    fn test_fetch_connection_refused_is_connect_failed() {
        // Bind then drop to get a port with nothing listening.
        let port = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let err = Fetcher::new().fetch("127.0.0.1", "", port).unwrap_err();
        assert!(matches!(err, FetchError::ConnectFailed { .. }), "{err:?}");
    }

    #[test]
    fn test_fetch_unresolvable_host_is_resolution_failure() {
        let err = Fetcher::new()
            .fetch("host.invalid", "", 80)
            .unwrap_err();
        assert!(matches!(err, FetchError::ResolutionFailure { .. }), "{err:?}");
    }

    #[test]
    fn test_fetch_respects_response_cap() {
        static BIG: [u8; 10_000] = [b'a'; 10_000];
        let (port, server) = serve_once(&BIG);
        let fetcher = Fetcher::with_config(FetcherConfig {
            max_response_bytes: 4096,
            ..FetcherConfig::default()
        });
        let err = fetcher.fetch("127.0.0.1", "big", port).unwrap_err();
        assert!(matches!(err, FetchError::ResponseTooLarge { limit: 4096, .. }));
        drop(server.join());
    }

    #[test]
    fn test_fetch_url_malformed_does_not_touch_network() {
        let err = Fetcher::new().fetch_url("noslash").unwrap_err();
        assert!(matches!(err, FetchError::MalformedUrl { .. }));
    }

    #[test]
    fn test_fetch_url_targets_default_port() {
        let target = split_url("example.com/page").unwrap();
        assert_eq!(target.port, DEFAULT_PORT);
        assert_eq!(DEFAULT_PORT, 80);
    }

    #[test]
    fn test_fetch_zero_read_timeout_is_socket_setup_failure() {
        // Connections complete in the listen backlog without an accept.
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let fetcher = Fetcher::with_config(FetcherConfig {
            read_timeout: Duration::ZERO,
            ..FetcherConfig::default()
        });

        let err = fetcher.fetch("127.0.0.1", "", port).unwrap_err();

        assert!(matches!(err, FetchError::SocketSetupFailed { .. }), "{err:?}");
        assert_eq!(err.stage(), "setup");
        drop(listener);
    }
}
