//! Blocking reqwest transport
//!
//! Redirect policy and the client-wide timeout are fixed per reqwest
//! client, so one client is kept per combination and built on first use.
//! The blocking client's own timeout bounds the wait for the response head
//! and each read from the body, which is the read timeout exchanges need.
//! Per-request timeouts are never set: reqwest applies those to the whole
//! exchange, body included.

use super::{HttpRequest, HttpResponse, Method, Transport, TransportError};
use crate::error::{HdfsError, Result};
use reqwest::blocking::{Body, Client, Response};
use reqwest::redirect::Policy;
use std::io::{self, Read};
use std::sync::OnceLock;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    connect_timeout: Duration,
    read_timeout: Duration,
    /// Indexed by [`slot`]
    clients: [OnceLock<Client>; 4],
}

fn slot(follow_redirects: bool, read_timeout: bool) -> usize {
    (usize::from(follow_redirects) << 1) | usize::from(read_timeout)
}

impl ReqwestTransport {
    /// Build a transport with the given connect and read timeouts
    ///
    /// The client used by metadata calls is built eagerly so that TLS or
    /// resolver setup problems surface here.
    pub fn new(connect_timeout: Duration, read_timeout: Duration) -> Result<Self> {
        let transport = Self {
            connect_timeout,
            read_timeout,
            clients: Default::default(),
        };
        transport
            .client(true, true)
            .map_err(|e| HdfsError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(transport)
    }

    fn client(
        &self,
        follow_redirects: bool,
        read_timeout: bool,
    ) -> std::result::Result<&Client, reqwest::Error> {
        let cell = &self.clients[slot(follow_redirects, read_timeout)];
        if let Some(client) = cell.get() {
            return Ok(client);
        }

        let policy = if follow_redirects {
            Policy::default()
        } else {
            Policy::none()
        };
        let client = Client::builder()
            .connect_timeout(self.connect_timeout)
            .timeout(read_timeout.then_some(self.read_timeout))
            .redirect(policy)
            .build()?;
        Ok(cell.get_or_init(|| client))
    }
}

fn map_error(url: &str, err: reqwest::Error) -> TransportError {
    let url = url.to_string();
    let message = err.to_string();
    if err.is_timeout() {
        TransportError::Timeout { url, message }
    } else if err.is_connect() {
        TransportError::Connect { url, message }
    } else {
        TransportError::Other { url, message }
    }
}

/// Response body whose stalled reads report `ErrorKind::TimedOut`
struct ResponseBody(Response);

impl Read for ResponseBody {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf).map_err(|e| {
            let timed_out = e
                .get_ref()
                .and_then(|inner| inner.downcast_ref::<reqwest::Error>())
                .is_some_and(reqwest::Error::is_timeout);
            if timed_out {
                io::Error::new(io::ErrorKind::TimedOut, e)
            } else {
                e
            }
        })
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
        let client = self
            .client(request.follow_redirects, request.read_timeout)
            .map_err(|e| map_error(&request.url, e))?;

        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = client
            .request(method, request.url.as_str())
            .query(&request.query);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(Body::new(body));
        }

        let response = builder.send().map_err(|e| map_error(&request.url, e))?;

        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        Ok(HttpResponse {
            status: response.status().as_u16(),
            url: response.url().to_string(),
            headers,
            body: Box::new(ResponseBody(response)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slots_are_distinct() {
        let slots = [
            slot(false, false),
            slot(false, true),
            slot(true, false),
            slot(true, true),
        ];
        assert_eq!(slots, [0, 1, 2, 3]);
    }

    #[test]
    fn test_build_transport() {
        let transport =
            ReqwestTransport::new(Duration::from_millis(500), Duration::from_millis(500)).unwrap();
        assert!(transport.clients[slot(true, true)].get().is_some());
        assert!(transport.clients[slot(false, false)].get().is_none());
    }

    #[test]
    fn test_refused_endpoint_is_failover() {
        let transport =
            ReqwestTransport::new(Duration::from_millis(500), Duration::from_millis(500)).unwrap();
        // Port 1 on loopback is not expected to accept connections
        let request = HttpRequest::new(Method::Get, "http://127.0.0.1:1/webhdfs/v1/")
            .query("op", "GETFILESTATUS");

        let err = transport.send(request).unwrap_err();
        assert!(err.is_failover(), "unexpected error: {:?}", err);
    }
}
