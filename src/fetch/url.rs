//! Splitting `host/path` urls and formatting the GET request.

use super::constants::{DEFAULT_PORT, MAX_URL_LEN, USER_AGENT};
use super::error::FetchError;

/// A url split at its first `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Everything before the first `/`.
    pub host: String,
    /// Everything after the first `/`, without the leading slash.
    pub path: String,
    /// Always [`DEFAULT_PORT`]; the url form has no port syntax.
    pub port: u16,
}

/// Splits `url` into host and path at the first `/`.
///
/// `"example.com/page"` becomes host `example.com`, path `page`, port 80. No scheme is
/// understood; `http://` style inputs are not supported.
///
/// # Errors
///
/// Returns [`FetchError::UrlTooLong`] for urls over 2048 bytes and
/// [`FetchError::MalformedUrl`] when there is no `/`.
pub fn split_url(url: &str) -> Result<Target, FetchError> {
    if url.len() > MAX_URL_LEN {
        return Err(FetchError::UrlTooLong {
            len: url.len(),
            max: MAX_URL_LEN,
        });
    }

    let (host, path) = url
        .split_once('/')
        .ok_or_else(|| FetchError::malformed_url(url))?;

    Ok(Target {
        host: host.to_string(),
        path: path.to_string(),
        port: DEFAULT_PORT,
    })
}

/// Formats the request line and headers sent verbatim on the socket.
#[must_use]
pub fn build_request(host: &str, path: &str) -> String {
    format!("GET /{path} HTTP/1.0\r\nHost: {host}\r\nUser-Agent: {USER_AGENT}\r\n\r\n")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_split_url_host_and_path() {
        let target = split_url("example.com/page").unwrap();
        assert_eq!(target.host, "example.com");
        assert_eq!(target.path, "page");
        assert_eq!(target.port, 80);
    }

    #[test]
    fn test_split_url_only_first_slash() {
        let target = split_url("example.com/a/b/c.html").unwrap();
        assert_eq!(target.host, "example.com");
        assert_eq!(target.path, "a/b/c.html");
    }

    #[test]
    fn test_split_url_trailing_slash_gives_empty_path() {
        let target = split_url("example.com/").unwrap();
        assert_eq!(target.path, "");
    }

    #[test]
    fn test_split_url_without_slash_is_malformed() {
        let err = split_url("noslash").unwrap_err();
        assert!(matches!(err, FetchError::MalformedUrl { ref url } if url == "noslash"));
    }

    #[test]
    fn test_split_url_rejects_overlong_input() {
        let url = format!("example.com/{}", "p".repeat(MAX_URL_LEN));
        let err = split_url(&url).unwrap_err();
        assert!(matches!(err, FetchError::UrlTooLong { max: MAX_URL_LEN, .. }));
    }

    #[test]
    fn test_split_url_accepts_limit_exactly() {
        let url = format!("h/{}", "p".repeat(MAX_URL_LEN - 2));
        assert_eq!(url.len(), MAX_URL_LEN);
        assert!(split_url(&url).is_ok());
    }

    #[test]
    fn test_build_request_wire_format() {
        assert_eq!(
            build_request("example.com", "page"),
            "GET /page HTTP/1.0\r\nHost: example.com\r\nUser-Agent: getter\r\n\r\n"
        );
    }
}
