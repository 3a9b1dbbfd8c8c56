/*!
 * HTTP transport primitive
 *
 * The client only needs "send a request, get status, headers and a body
 * stream back". Implementations decide connection pooling, TLS and
 * redirect handling; the default is [`http::ReqwestTransport`].
 *
 * Timeouts belong to the transport. A request only says whether it is
 * subject to the read timeout: when it is, waiting for the response head
 * and every single body read are bounded, but a slow body that keeps
 * making progress is not cut short.
 */

pub mod http;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use http::ReqwestTransport;
#[cfg(any(test, feature = "test-util"))]
pub use mock::{MockReply, MockTransport, RecordedRequest};

use crate::error::HdfsError;
use std::fmt;
use std::io::{self, Read};
use thiserror::Error;

/// Streamed request or response body
pub type Body = Box<dyn Read + Send>;

/// HTTP verbs used by the protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One outgoing HTTP exchange
pub struct HttpRequest {
    pub method: Method,
    /// Absolute URL without query string
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Body>,
    /// Follow 3xx responses; disabled for the control leg of a create
    pub follow_redirects: bool,
    /// Bound the wait for the response head and each body read; when
    /// false only the connect timeout applies
    pub read_timeout: bool,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
            follow_redirects: true,
            read_timeout: true,
        }
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    pub fn follow_redirects(mut self, follow: bool) -> Self {
        self.follow_redirects = follow;
        self
    }

    pub fn read_timeout(mut self, bounded: bool) -> Self {
        self.read_timeout = bounded;
        self
    }
}

impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("query", &self.query)
            .field("headers", &self.headers)
            .field("body", &self.body.as_ref().map(|_| "<stream>"))
            .field("follow_redirects", &self.follow_redirects)
            .field("read_timeout", &self.read_timeout)
            .finish()
    }
}

/// Response with a not-yet-consumed body
pub struct HttpResponse {
    pub status: u16,
    /// Final URL after any followed redirects
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Body,
}

impl HttpResponse {
    /// Canonical reason phrase, empty when the status has none
    pub fn reason(&self) -> &'static str {
        reqwest::StatusCode::from_u16(self.status)
            .ok()
            .and_then(|code| code.canonical_reason())
            .unwrap_or("")
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Drain the body into memory
    pub fn read_body(&mut self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.body.read_to_end(&mut buf)?;
        Ok(buf)
    }
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("url", &self.url)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Failure below the HTTP layer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("cannot connect to {url}: {message}")]
    Connect { url: String, message: String },

    #[error("request to {url} timed out: {message}")]
    Timeout { url: String, message: String },

    #[error("request to {url} failed: {message}")]
    Other { url: String, message: String },
}

impl TransportError {
    /// Endpoint is presumed down and the next one should be tried
    pub fn is_failover(&self) -> bool {
        matches!(
            self,
            TransportError::Connect { .. } | TransportError::Timeout { .. }
        )
    }
}

impl From<TransportError> for HdfsError {
    fn from(err: TransportError) -> Self {
        HdfsError::Connection(err.to_string())
    }
}

/// Issues HTTP exchanges on behalf of the client
pub trait Transport: Send + Sync {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_request_builder() {
        let request = HttpRequest::new(Method::Put, "http://nn1:50070/webhdfs/v1/x")
            .query("op", "MKDIRS")
            .header("content-type", "application/octet-stream")
            .follow_redirects(false)
            .read_timeout(false);

        assert_eq!(request.query, vec![("op".to_string(), "MKDIRS".to_string())]);
        assert!(!request.follow_redirects);
        assert!(!request.read_timeout);
        assert!(HttpRequest::new(Method::Get, "http://nn1:50070/").read_timeout);
        assert!(format!("{:?}", request).contains("MKDIRS"));
    }

    #[test]
    fn test_response_header_lookup() {
        let mut response = HttpResponse {
            status: 307,
            url: "http://nn1:50070/webhdfs/v1/x".to_string(),
            headers: vec![("Location".to_string(), "http://dn1:50075/x".to_string())],
            body: Box::new(Cursor::new(b"abc".to_vec())),
        };

        assert_eq!(response.reason(), "Temporary Redirect");
        assert_eq!(response.header("location"), Some("http://dn1:50075/x"));
        assert_eq!(response.header("content-type"), None);
        assert_eq!(response.read_body().unwrap(), b"abc");
    }

    #[test]
    fn test_failover_classification() {
        let connect = TransportError::Connect {
            url: "http://nn1".into(),
            message: "refused".into(),
        };
        let other = TransportError::Other {
            url: "http://nn1".into(),
            message: "bad header".into(),
        };
        assert!(connect.is_failover());
        assert!(!other.is_failover());
        assert!(matches!(HdfsError::from(other), HdfsError::Connection(_)));
    }
}
