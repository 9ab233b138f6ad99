//! Growable response buffer filled by the socket read loop.

use std::borrow::Cow;
use std::io::{self, Read};

use super::constants::{HEADER_BODY_SEPARATOR, READ_CHUNK_SIZE};
use super::error::FetchError;

/// Owned bytes of a raw HTTP response (headers + body).
///
/// The logical length is `len()`; the allocation may be larger. The buffer is
/// filled by a single thread and handed to the caller once the peer closes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseBuffer {
    data: Vec<u8>,
}

impl ResponseBuffer {
    /// Creates an empty buffer with room for one read chunk.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::AllocationFailure`] if the first chunk cannot be
    /// reserved.
    pub fn new() -> Result<Self, FetchError> {
        let mut data = Vec::new();
        data.try_reserve(READ_CHUNK_SIZE)
            .map_err(|_| FetchError::AllocationFailure {
                requested: READ_CHUNK_SIZE,
            })?;
        Ok(Self { data })
    }

    /// Reads from `reader` until end of stream, growing one chunk at a time.
    ///
    /// `limit` caps the total size; `host` only labels errors.
    pub(crate) fn fill_from<R: Read>(
        &mut self,
        reader: &mut R,
        limit: usize,
        host: &str,
    ) -> Result<(), FetchError> {
        let mut chunk = [0_u8; READ_CHUNK_SIZE];
        loop {
            let received = match reader.read(&mut chunk) {
                Ok(0) => return Ok(()),
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(FetchError::recv(host, self.data.len(), e)),
            };

            if self.data.len() + received > limit {
                return Err(FetchError::ResponseTooLarge {
                    host: host.to_string(),
                    limit,
                });
            }

            self.data
                .try_reserve(received)
                .map_err(|_| FetchError::AllocationFailure {
                    requested: received,
                })?;
            self.data.extend_from_slice(&chunk[..received]);
        }
    }

    /// Logical length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Allocated capacity in bytes; always at least `len()`.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// The full raw response.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// The content after the header/body separator.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        split_body(&self.data)
    }

    /// Lossy UTF-8 view of the full response, for inspection and logs.
    #[must_use]
    pub fn as_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.data)
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

impl From<Vec<u8>> for ResponseBuffer {
    fn from(data: Vec<u8>) -> Self {
        Self { data }
    }
}

impl AsRef<[u8]> for ResponseBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

/// Returns the bytes after the first `\r\n\r\n`.
///
/// When the separator is absent the whole input is treated as body.
#[must_use]
pub fn split_body(response: &[u8]) -> &[u8] {
    response
        .windows(HEADER_BODY_SEPARATOR.len())
        .position(|window| window == HEADER_BODY_SEPARATOR)
        .map_or(response, |start| {
            &response[start + HEADER_BODY_SEPARATOR.len()..]
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn test_split_body_after_separator() {
        assert_eq!(split_body(b"HTTP/1.0 200 OK\r\n\r\nhello"), b"hello");
    }

    #[test]
    fn test_split_body_without_separator_returns_input() {
        assert_eq!(split_body(b"hello"), b"hello");
        assert_eq!(split_body(b""), b"");
    }

    #[test]
    fn test_split_body_uses_first_separator() {
        assert_eq!(
            split_body(b"HTTP/1.0 200 OK\r\nA: b\r\n\r\nline\r\n\r\nmore"),
            b"line\r\n\r\nmore"
        );
    }

    #[test]
    fn test_split_body_empty_body() {
        assert_eq!(split_body(b"HTTP/1.0 204 No Content\r\n\r\n"), b"");
    }

    #[test]
    fn test_fill_from_reads_multiple_chunks() {
        let payload = vec![b'x'; READ_CHUNK_SIZE * 3 + 17];
        let mut buf = ResponseBuffer::new().unwrap();
        buf.fill_from(&mut Cursor::new(payload.clone()), usize::MAX, "test")
            .unwrap();
        assert_eq!(buf.len(), payload.len());
        assert!(buf.capacity() >= buf.len());
        assert_eq!(buf.as_bytes(), payload.as_slice());
    }

    #[test]
    fn test_fill_from_enforces_limit() {
        let mut buf = ResponseBuffer::new().unwrap();
        let err = buf
            .fill_from(&mut Cursor::new(vec![0_u8; 5000]), 4096, "big.example")
            .unwrap_err();
        assert!(matches!(
            err,
            FetchError::ResponseTooLarge { limit: 4096, .. }
        ));
    }

    #[test]
    fn test_fill_from_maps_read_errors() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::from(io::ErrorKind::ConnectionReset))
            }
        }
        let mut buf = ResponseBuffer::new().unwrap();
        let err = buf.fill_from(&mut Broken, usize::MAX, "h").unwrap_err();
        assert!(matches!(err, FetchError::RecvFailed { received: 0, .. }));
    }

    #[test]
    fn test_body_and_text_views() {
        let buf = ResponseBuffer::from(b"HTTP/1.0 200 OK\r\n\r\n<p>hi</p>".to_vec());
        assert_eq!(buf.body(), b"<p>hi</p>");
        assert!(buf.as_text().starts_with("HTTP/1.0 200 OK"));
    }
}
