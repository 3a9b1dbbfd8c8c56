//! Scripted transport for testing
//!
//! Replies are served either from a queue, in order, or from a handler that
//! sees each request. Every request is recorded with its body drained, so
//! tests can assert on URLs, query parameters and uploaded bytes.

use super::{HttpRequest, HttpResponse, Method, Transport, TransportError};
use std::collections::VecDeque;
use std::io::{Cursor, Read};
use std::sync::{Arc, Mutex};

/// Canned outcome of one exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockReply {
    Response {
        status: u16,
        headers: Vec<(String, String)>,
        body: Vec<u8>,
    },
    /// Connection refused
    Refused,
    Timeout,
}

impl MockReply {
    pub fn status(status: u16) -> Self {
        MockReply::Response {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// JSON body with the given status
    pub fn json(status: u16, value: serde_json::Value) -> Self {
        MockReply::Response {
            status,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: value.to_string().into_bytes(),
        }
    }

    pub fn ok_json(value: serde_json::Value) -> Self {
        Self::json(200, value)
    }

    /// `{"boolean": value}`
    pub fn boolean(value: bool) -> Self {
        Self::ok_json(serde_json::json!({ "boolean": value }))
    }

    /// Raw file content
    pub fn bytes(body: impl Into<Vec<u8>>) -> Self {
        MockReply::Response {
            status: 200,
            headers: vec![(
                "Content-Type".to_string(),
                "application/octet-stream".to_string(),
            )],
            body: body.into(),
        }
    }

    /// `307 Temporary Redirect` to `location`
    pub fn redirect(location: &str) -> Self {
        MockReply::Response {
            status: 307,
            headers: vec![("Location".to_string(), location.to_string())],
            body: Vec::new(),
        }
    }

    /// Structured `RemoteException` error payload
    pub fn remote_exception(status: u16, exception: &str, message: &str) -> Self {
        Self::json(
            status,
            serde_json::json!({
                "RemoteException": {
                    "exception": exception,
                    "javaClassName": format!("org.apache.hadoop.{}", exception),
                    "message": message,
                }
            }),
        )
    }

    /// Reply of a namenode that is not the active one
    pub fn standby() -> Self {
        Self::remote_exception(
            403,
            "StandbyException",
            "Operation category READ is not supported in state standby",
        )
    }

    pub fn with_header(self, name: &str, value: &str) -> Self {
        match self {
            MockReply::Response {
                status,
                mut headers,
                body,
            } => {
                headers.push((name.to_string(), value.to_string()));
                MockReply::Response {
                    status,
                    headers,
                    body,
                }
            }
            other => other,
        }
    }
}

/// A request as seen by the mock, body already read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
    pub follow_redirects: bool,
    pub read_timeout: bool,
}

impl RecordedRequest {
    /// First value of query parameter `name`
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// The `op` parameter
    pub fn op(&self) -> Option<&str> {
        self.param("op")
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// `scheme://host:port` of the request URL
    pub fn origin(&self) -> String {
        url::Url::parse(&self.url)
            .map(|u| u.origin().ascii_serialization())
            .unwrap_or_default()
    }

    /// Path below the protocol prefix as sent, e.g. `/a/b`
    pub fn path(&self) -> Option<String> {
        let url = url::Url::parse(&self.url).ok()?;
        let segments: Vec<&str> = url.path_segments()?.skip(2).collect();
        Some(format!("/{}", segments.join("/")))
    }
}

type Handler = Box<dyn FnMut(&RecordedRequest) -> MockReply + Send>;

#[derive(Default)]
struct MockState {
    replies: VecDeque<MockReply>,
    handler: Option<Handler>,
    requests: Vec<RecordedRequest>,
}

/// In-memory [`Transport`]
///
/// Clones share state, so a test can keep one handle after moving the
/// other into a client.
///
/// # Example
///
/// ```rust
/// use webhdfs::transport::{MockReply, MockTransport};
/// use webhdfs::{ClientConfig, WebHdfsClient};
/// use webhdfs_core_topology::EndpointSet;
///
/// let mock = MockTransport::new();
/// mock.push(MockReply::boolean(true));
///
/// let mut client = WebHdfsClient::with_transport(
///     &ClientConfig::default(),
///     EndpointSet::single("http://nn1:50070"),
///     Box::new(mock.clone()),
/// );
/// assert!(client.mkdir("/tmp/new").unwrap());
/// assert_eq!(mock.requests()[0].op(), Some("MKDIRS"));
/// ```
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every request through `handler` instead of the queue
    pub fn with_handler<F>(handler: F) -> Self
    where
        F: FnMut(&RecordedRequest) -> MockReply + Send + 'static,
    {
        let mock = Self::new();
        if let Ok(mut state) = mock.state.lock() {
            state.handler = Some(Box::new(handler));
        }
        mock
    }

    /// Queue one reply
    pub fn push(&self, reply: MockReply) -> &Self {
        if let Ok(mut state) = self.state.lock() {
            state.replies.push_back(reply);
        }
        self
    }

    /// Requests seen so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state
            .lock()
            .map(|state| state.requests.clone())
            .unwrap_or_default()
    }

    /// Replies still queued
    pub fn pending(&self) -> usize {
        self.state
            .lock()
            .map(|state| state.replies.len())
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("requests", &self.requests().len())
            .field("pending", &self.pending())
            .finish()
    }
}

impl Transport for MockTransport {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = request.url.clone();
        let other = |message: String| TransportError::Other {
            url: url.clone(),
            message,
        };

        let body = match request.body {
            Some(mut source) => {
                let mut buf = Vec::new();
                source
                    .read_to_end(&mut buf)
                    .map_err(|e| other(format!("failed to read request body: {}", e)))?;
                Some(buf)
            }
            None => None,
        };

        let recorded = RecordedRequest {
            method: request.method,
            url: request.url,
            query: request.query,
            headers: request.headers,
            body,
            follow_redirects: request.follow_redirects,
            read_timeout: request.read_timeout,
        };

        let mut guard = self
            .state
            .lock()
            .map_err(|_| other("mock transport state poisoned".to_string()))?;
        let state = &mut *guard;

        let reply = match state.handler.as_mut() {
            Some(handler) => Some(handler(&recorded)),
            None => state.replies.pop_front(),
        };
        state.requests.push(recorded);
        drop(guard);

        match reply {
            Some(MockReply::Response {
                status,
                headers,
                body,
            }) => Ok(HttpResponse {
                status,
                url,
                headers,
                body: Box::new(Cursor::new(body)),
            }),
            Some(MockReply::Refused) => Err(TransportError::Connect {
                url,
                message: "connection refused".to_string(),
            }),
            Some(MockReply::Timeout) => Err(TransportError::Timeout {
                url,
                message: "operation timed out".to_string(),
            }),
            None => Err(TransportError::Other {
                url,
                message: "no scripted reply".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_order_and_recording() {
        let mock = MockTransport::new();
        mock.push(MockReply::boolean(true)).push(MockReply::Refused);

        let request = HttpRequest::new(Method::Put, "http://nn1:50070/webhdfs/v1/a%20b/c")
            .query("op", "MKDIRS")
            .body(Box::new(Cursor::new(b"data".to_vec())));
        let mut response = mock.send(request).unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.read_body().unwrap(), br#"{"boolean":true}"#);

        let err = mock
            .send(HttpRequest::new(Method::Get, "http://nn2:50070/"))
            .unwrap_err();
        assert!(err.is_failover());

        let requests = mock.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].op(), Some("MKDIRS"));
        assert_eq!(requests[0].body.as_deref(), Some(&b"data"[..]));
        assert_eq!(requests[0].origin(), "http://nn1:50070");
        assert_eq!(requests[0].path().as_deref(), Some("/a%20b/c"));
    }

    #[test]
    fn test_exhausted_queue_is_error() {
        let mock = MockTransport::new();
        let err = mock
            .send(HttpRequest::new(Method::Get, "http://nn1:50070/"))
            .unwrap_err();
        assert!(!err.is_failover());
    }

    #[test]
    fn test_handler() {
        let mock = MockTransport::with_handler(|request| {
            if request.origin() == "http://nn2:50070" {
                MockReply::boolean(true)
            } else {
                MockReply::standby()
            }
        });

        let first = mock
            .send(HttpRequest::new(Method::Get, "http://nn1:50070/webhdfs/v1/"))
            .unwrap();
        assert_eq!(first.status, 403);

        let second = mock
            .send(HttpRequest::new(Method::Get, "http://nn2:50070/webhdfs/v1/"))
            .unwrap();
        assert_eq!(second.status, 200);
    }
}
