//! Rotating set of candidate front-end endpoints
//!
//! The set remembers which endpoint answered last so that the next operation
//! starts there. Nothing is persisted: a process restart begins again from
//! the discovery order.

use crate::error::{TopologyError, TopologyResult};
use url::Url;

/// Default namenode HTTP port used when an `hdfs://` URL omits one
pub const DEFAULT_HTTP_PORT: u16 = 50070;

/// Ordered, non-empty list of endpoint base URLs (scheme + host + port)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointSet {
    urls: Vec<String>,
}

impl EndpointSet {
    /// Build a set from discovered base URLs
    ///
    /// # Errors
    ///
    /// Returns `TopologyError::Empty` if `urls` has no entries.
    pub fn new(urls: Vec<String>) -> TopologyResult<Self> {
        if urls.is_empty() {
            return Err(TopologyError::Empty);
        }
        Ok(Self { urls })
    }

    /// Single-endpoint set for clusters without HA
    pub fn single(url: impl Into<String>) -> Self {
        Self {
            urls: vec![url.into()],
        }
    }

    /// Number of candidates
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// Endpoint tried first on the next operation
    pub fn head(&self) -> &str {
        &self.urls[0]
    }

    /// Candidates in the order they will be tried
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.urls.iter().map(String::as_str)
    }

    /// Current rotation order
    pub fn as_slice(&self) -> &[String] {
        &self.urls
    }

    /// Make the endpoint at `index` the new head, keeping cyclic order
    ///
    /// Out-of-range indices wrap, so rotating by `len()` is a no-op.
    pub fn rotate_to(&mut self, index: usize) {
        let index = index % self.urls.len();
        if index != 0 {
            self.urls.rotate_left(index);
            tracing::debug!(head = %self.urls[0], "endpoint rotation updated");
        }
    }
}

/// Normalize a caller-supplied base URL into an HTTP endpoint
///
/// `hdfs://host[:port]` becomes `http://host:port` with the namenode HTTP port
/// defaulting to 50070. Other schemes keep their scheme, host and port; any
/// path, query or trailing slash is dropped.
pub fn normalize_endpoint(raw: &str) -> TopologyResult<String> {
    let parsed = Url::parse(raw).map_err(|e| TopologyError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    let host = parsed.host_str().ok_or_else(|| TopologyError::InvalidUrl {
        url: raw.to_string(),
        reason: "missing host".to_string(),
    })?;

    let endpoint = match parsed.scheme() {
        "hdfs" => format!(
            "http://{}:{}",
            host,
            parsed.port().unwrap_or(DEFAULT_HTTP_PORT)
        ),
        scheme => match parsed.port() {
            Some(port) => format!("{}://{}:{}", scheme, host, port),
            None => format!("{}://{}", scheme, host),
        },
    };

    Ok(endpoint)
}

/// Replace the authority (`host:port`) of a base URL, then normalize it
pub fn with_authority(base: &str, authority: &str) -> TopologyResult<String> {
    let parsed = Url::parse(base).map_err(|e| TopologyError::InvalidUrl {
        url: base.to_string(),
        reason: e.to_string(),
    })?;
    normalize_endpoint(&format!("{}://{}", parsed.scheme(), authority.trim()))
}

/// Host part of a base URL; for HA clusters this is the nameservice id
pub fn nameservice(base: &str) -> TopologyResult<String> {
    let parsed = Url::parse(base).map_err(|e| TopologyError::InvalidUrl {
        url: base.to_string(),
        reason: e.to_string(),
    })?;
    parsed
        .host_str()
        .map(str::to_string)
        .ok_or_else(|| TopologyError::InvalidUrl {
            url: base.to_string(),
            reason: "missing host".to_string(),
        })
}
