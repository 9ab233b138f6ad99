//! Error types for the fetch module.
//!
//! Each socket stage has its own variant so a caller can tell resolution,
//! connect and I/O failures apart and skip the url without stopping.

use thiserror::Error;

/// Errors that can occur while fetching a url.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The url has no `/` separating host from path.
    #[error("could not split url into host/page: {url}")]
    MalformedUrl {
        /// The url as given.
        url: String,
    },

    /// The url exceeds the accepted length.
    #[error("url is {len} bytes, longer than the {max} byte limit")]
    UrlTooLong {
        /// Length of the rejected url.
        len: usize,
        /// Accepted maximum.
        max: usize,
    },

    /// Host name did not resolve to any address.
    #[error("failed to resolve {host}:{port}: {source}")]
    ResolutionFailure {
        /// Host that failed to resolve.
        host: String,
        /// Port requested.
        port: u16,
        /// The underlying resolver error.
        #[source]
        source: std::io::Error,
    },

    /// No resolved address accepted a TCP connection.
    #[error("failed to connect to {host}:{port}: {source}")]
    ConnectFailed {
        /// Host being connected to.
        host: String,
        /// Port being connected to.
        port: u16,
        /// The error from the last address tried.
        #[source]
        source: std::io::Error,
    },

    /// Socket timeouts could not be applied to an established connection.
    #[error("failed to configure socket for {host}: {source}")]
    SocketSetupFailed {
        /// Host the socket is connected to.
        host: String,
        /// The underlying socket error.
        #[source]
        source: std::io::Error,
    },

    /// Writing the request to the socket failed.
    #[error("failed to send request to {host}: {source}")]
    SendFailed {
        /// Host the request was for.
        host: String,
        /// The underlying socket error.
        #[source]
        source: std::io::Error,
    },

    /// Reading the response from the socket failed.
    #[error("failed to receive response from {host} after {received} bytes: {source}")]
    RecvFailed {
        /// Host the response was from.
        host: String,
        /// Bytes already received when the read failed.
        received: usize,
        /// The underlying socket error.
        #[source]
        source: std::io::Error,
    },

    /// The response grew past the configured cap.
    #[error("response from {host} exceeded {limit} bytes")]
    ResponseTooLarge {
        /// Host the response was from.
        host: String,
        /// Configured maximum response size.
        limit: usize,
    },

    /// The response buffer could not grow.
    #[error("failed to allocate {requested} more bytes for the response buffer")]
    AllocationFailure {
        /// Additional bytes requested.
        requested: usize,
    },
}

impl FetchError {
    /// Creates a malformed url error.
    pub fn malformed_url(url: impl Into<String>) -> Self {
        Self::MalformedUrl { url: url.into() }
    }

    /// Creates a resolution error.
    pub fn resolution(host: impl Into<String>, port: u16, source: std::io::Error) -> Self {
        Self::ResolutionFailure {
            host: host.into(),
            port,
            source,
        }
    }

    /// Creates a connect error.
    pub fn connect(host: impl Into<String>, port: u16, source: std::io::Error) -> Self {
        Self::ConnectFailed {
            host: host.into(),
            port,
            source,
        }
    }

    /// Creates a socket setup error.
    pub fn socket_setup(host: impl Into<String>, source: std::io::Error) -> Self {
        Self::SocketSetupFailed {
            host: host.into(),
            source,
        }
    }

    /// Creates a send error.
    pub fn send(host: impl Into<String>, source: std::io::Error) -> Self {
        Self::SendFailed {
            host: host.into(),
            source,
        }
    }

    /// Creates a receive error.
    pub fn recv(host: impl Into<String>, received: usize, source: std::io::Error) -> Self {
        Self::RecvFailed {
            host: host.into(),
            received,
            source,
        }
    }

    /// Short, stable label for the stage that failed.
    #[must_use]
    pub fn stage(&self) -> &'static str {
        match self {
            Self::MalformedUrl { .. } | Self::UrlTooLong { .. } => "input",
            Self::ResolutionFailure { .. } => "resolve",
            Self::ConnectFailed { .. } => "connect",
            Self::SocketSetupFailed { .. } => "setup",
            Self::SendFailed { .. } => "send",
            Self::RecvFailed { .. } | Self::ResponseTooLarge { .. } => "recv",
            Self::AllocationFailure { .. } => "alloc",
        }
    }
}
