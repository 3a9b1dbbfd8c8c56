/*!
 * WebHDFS protocol client
 *
 * Every operation is one or more HTTP exchanges issued through [`Transport`]
 * against the current [`EndpointSet`]. Metadata exchanges fail over:
 * a standby namenode or an unreachable endpoint moves on to the next
 * candidate, any other classified error is raised at once. When the loop
 * ends, the endpoint reached becomes the head of the rotation so that the
 * next call starts at the namenode that answered last.
 *
 * Content transfers are two-phase. `CREATE` is sent with redirects disabled
 * and the bytes are then streamed to the `Location` it returns; `OPEN`
 * follows the redirect and streams the response body into the sink. Both
 * are verified against a follow-up stat.
 */

use crate::config::ClientConfig;
use crate::error::{HdfsError, Result};
use crate::listing::{self, Listing};
use crate::path;
use crate::protocol::remote;
use crate::protocol::wire::{
    BooleanEnvelope, ContentSummaryEnvelope, FileStatusEnvelope, FileStatusesEnvelope,
};
use crate::protocol::{self, Operation};
use crate::status::{ContentSummary, FileStatus, SummaryField};
use crate::transport::{
    Body, HttpRequest, HttpResponse, Method, ReqwestTransport, Transport, TransportError,
};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use std::fmt;
use std::io::{self, Cursor, Read, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};
use webhdfs_core_topology::EndpointSet;

/// Raised when every endpoint was tried without an answer
pub const NO_ENDPOINT_MESSAGE: &str = "cannot connect to any webhdfs endpoint";

/// Content type of the data leg of an upload
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Largest permission value `chmod` accepts
pub const MAX_PERMISSION: u16 = 0o7777;

/// Shape of a fail-over exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Leg {
    /// JSON metadata call; the body is read before the attempt counts as answered
    Metadata,
    /// `CREATE` control call; the redirect is returned, not followed
    Control,
    /// `OPEN`; redirects followed, the body is left for the caller to stream
    Stream,
}

impl Leg {
    fn of(op: Operation) -> Self {
        match op {
            Operation::Create => Leg::Control,
            Operation::Open => Leg::Stream,
            _ => Leg::Metadata,
        }
    }
}

/// Outcome of one endpoint attempt that did not succeed
enum Failure {
    /// Namenode is not active; try the next one
    Standby(String),
    /// Endpoint did not answer; try the next one
    Unreachable(TransportError),
    /// Raise to the caller
    Fatal(HdfsError),
}

/// High-availability WebHDFS client
///
/// Holds the endpoint rotation, so operations take `&mut self`. Use one
/// client per thread.
pub struct WebHdfsClient {
    user: String,
    chunk_size: usize,
    endpoints: EndpointSet,
    transport: Box<dyn Transport>,
    calls: u64,
}

impl fmt::Debug for WebHdfsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebHdfsClient")
            .field("user", &self.user)
            .field("endpoints", &self.endpoints.as_slice())
            .field("calls", &self.calls)
            .finish_non_exhaustive()
    }
}

impl WebHdfsClient {
    /// Discover the cluster topology and connect over HTTP
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let endpoints = config.topology().resolve(&config.base_url)?;
        debug!(
            base = %config.base_url,
            endpoints = ?endpoints.as_slice(),
            "resolved namenode endpoints"
        );

        let transport = ReqwestTransport::new(config.timeout(), config.timeout())?;
        Ok(Self::with_transport(config, endpoints, Box::new(transport)))
    }

    /// Build a client over explicit endpoints and transport
    pub fn with_transport(
        config: &ClientConfig,
        endpoints: EndpointSet,
        transport: Box<dyn Transport>,
    ) -> Self {
        Self {
            user: config.user.clone(),
            chunk_size: config.chunk_size.max(1),
            endpoints,
            transport,
            calls: 0,
        }
    }

    /// Number of HTTP exchanges that received a response
    pub fn calls(&self) -> u64 {
        self.calls
    }

    /// Endpoints in the order the next operation will try them
    pub fn endpoints(&self) -> &EndpointSet {
        &self.endpoints
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    /// Run one operation through the fail-over loop
    ///
    /// `op` and `user.name` are added to `params`. Standby and unreachable
    /// endpoints are skipped; any other error response is classified and
    /// returned. `CREATE` does not follow its redirect, so the response
    /// carries the `Location` of the data leg. For `OPEN` the body is left
    /// unread; for every other operation it has already been received.
    pub fn invoke(
        &mut self,
        op: Operation,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<HttpResponse> {
        let path = path::normalize(path);
        let leg = Leg::of(op);
        let candidates: Vec<String> = self.endpoints.iter().map(str::to_string).collect();
        let mut reached = 0;
        let mut outcome = None;

        for (index, base) in candidates.iter().enumerate() {
            reached = index;
            match self.attempt(base, op, &path, params, leg) {
                Ok(response) => {
                    outcome = Some(Ok(response));
                    break;
                }
                Err(Failure::Standby(message)) => {
                    debug!(endpoint = %base, %op, %message, "standby namenode, trying next endpoint");
                }
                Err(Failure::Unreachable(err)) => {
                    warn!(endpoint = %base, %op, error = %err, "endpoint unreachable, trying next endpoint");
                }
                Err(Failure::Fatal(err)) => {
                    outcome = Some(Err(err));
                    break;
                }
            }
        }

        self.endpoints.rotate_to(reached);
        outcome.unwrap_or_else(|| Err(HdfsError::Connection(NO_ENDPOINT_MESSAGE.to_string())))
    }

    fn attempt(
        &mut self,
        base: &str,
        op: Operation,
        path: &str,
        params: &[(&str, String)],
        leg: Leg,
    ) -> std::result::Result<HttpResponse, Failure> {
        let url = protocol::request_url(base, path).map_err(Failure::Fatal)?;

        let mut request = HttpRequest::new(op.method(), url)
            .query("op", op.as_str())
            .query("user.name", self.user.as_str())
            .follow_redirects(leg != Leg::Control);
        for (name, value) in params {
            request = request.query(*name, value.as_str());
        }

        let mut response = match self.transport.send(request) {
            Ok(response) => response,
            Err(err) if err.is_failover() => return Err(Failure::Unreachable(err)),
            Err(err) => return Err(Failure::Fatal(err.into())),
        };
        self.calls += 1;
        log_response(&response);

        if response.status < 400 && leg != Leg::Metadata {
            return Ok(response);
        }

        // A body that stalls is an endpoint that stopped answering
        let url = response.url.clone();
        let body = response.read_body().map_err(|e| {
            if e.kind() == io::ErrorKind::TimedOut {
                Failure::Unreachable(TransportError::Timeout {
                    url,
                    message: e.to_string(),
                })
            } else {
                Failure::Fatal(HdfsError::Io(e))
            }
        })?;
        if response.status < 400 {
            response.body = Box::new(Cursor::new(body));
            return Ok(response);
        }

        let classified = remote::classify_response(response.status, &body, path);
        if classified.is_standby() {
            Err(Failure::Standby(classified.message))
        } else {
            Err(Failure::Fatal(classified.into_error()))
        }
    }

    fn invoke_json<T: DeserializeOwned>(
        &mut self,
        op: Operation,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let mut response = self.invoke(op, path, params)?;
        let body = response.read_body()?;
        serde_json::from_slice(&body).map_err(|e| {
            HdfsError::Protocol(format!("{}: unexpected {} response: {}", path, op, e))
        })
    }

    /// Metadata call whose body carries nothing of interest
    fn invoke_empty(&mut self, op: Operation, path: &str, params: &[(&str, String)]) -> Result<()> {
        self.invoke(op, path, params)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Metadata
    // ------------------------------------------------------------------

    pub fn stat(&mut self, path: &str) -> Result<FileStatus> {
        let path = path::normalize(path);
        let envelope: FileStatusEnvelope = self.invoke_json(Operation::GetFileStatus, &path, &[])?;
        FileStatus::from_wire(&path, envelope.file_status)
    }

    /// Like [`stat`](Self::stat), with a missing path reported as `None`
    pub fn try_stat(&mut self, path: &str) -> Result<Option<FileStatus>> {
        match self.stat(path) {
            Ok(status) => Ok(Some(status)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// One `LISTSTATUS` exchange
    pub(crate) fn list_dir(&mut self, path: &str) -> Result<Vec<FileStatus>> {
        let path = path::normalize(path);
        let envelope: FileStatusesEnvelope = self.invoke_json(Operation::ListStatus, &path, &[])?;
        envelope
            .file_statuses
            .file_status
            .into_iter()
            .map(|entry| FileStatus::from_wire(&path, entry))
            .collect()
    }

    /// Lazily list `path`, descending into subdirectories when `recurse`
    pub fn ls(&mut self, path: &str, recurse: bool) -> Listing<'_> {
        Listing::new(self, path, recurse, None)
    }

    /// Like [`ls`](Self::ls), yielding only entries accepted by `filter`
    ///
    /// A rejected directory is not descended into.
    pub fn ls_filtered<'a, F>(&'a mut self, path: &str, recurse: bool, filter: F) -> Listing<'a>
    where
        F: FnMut(&FileStatus) -> bool + 'a,
    {
        Listing::new(self, path, recurse, Some(Box::new(filter)))
    }

    /// Expand a shell-style pattern level by level
    pub fn glob(&mut self, pattern: &str) -> Result<Vec<FileStatus>> {
        listing::glob(self, pattern)
    }

    pub fn content_summary(&mut self, path: &str) -> Result<ContentSummary> {
        let path = path::normalize(path);
        let envelope: ContentSummaryEnvelope =
            self.invoke_json(Operation::GetContentSummary, &path, &[])?;
        Ok(envelope.content_summary)
    }

    /// Logical bytes under `path`, or physical bytes when `real`
    pub fn du(&mut self, path: &str, real: bool) -> Result<u64> {
        Ok(self.content_summary(path)?.usage(real))
    }

    /// One named summary field (`dirs`, `files`, `hdfs_usage`, ...)
    pub fn du_field(&mut self, path: &str, name: &str) -> Result<i64> {
        let field = SummaryField::from_name(name)?;
        Ok(self.content_summary(path)?.get(field))
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    pub fn mkdir(&mut self, path: &str) -> Result<bool> {
        let path = path::normalize(path);
        let envelope: BooleanEnvelope = self.invoke_json(Operation::Mkdirs, &path, &[])?;
        Ok(envelope.boolean)
    }

    pub fn rename(&mut self, path: &str, destination: &str) -> Result<bool> {
        let path = path::normalize(path);
        let params = [("destination", path::normalize(destination))];
        let envelope: BooleanEnvelope = self.invoke_json(Operation::Rename, &path, &params)?;
        Ok(envelope.boolean)
    }

    pub fn delete(&mut self, path: &str) -> Result<bool> {
        let path = path::normalize(path);
        let envelope: BooleanEnvelope = self.invoke_json(Operation::Delete, &path, &[])?;
        Ok(envelope.boolean)
    }

    pub fn set_replication(&mut self, path: &str, replication: u16) -> Result<bool> {
        let path = path::normalize(path);
        let params = [("replication", replication.to_string())];
        let envelope: BooleanEnvelope =
            self.invoke_json(Operation::SetReplication, &path, &params)?;
        Ok(envelope.boolean)
    }

    /// Change owner and/or group; at least one must be given
    pub fn chown(&mut self, path: &str, owner: Option<&str>, group: Option<&str>) -> Result<()> {
        if owner.is_none() && group.is_none() {
            return Err(HdfsError::IllegalArgument(
                "chown requires an owner or a group".to_string(),
            ));
        }

        let path = path::normalize(path);
        let mut params = Vec::with_capacity(2);
        if let Some(owner) = owner {
            params.push(("owner", owner.to_string()));
        }
        if let Some(group) = group {
            params.push(("group", group.to_string()));
        }
        self.invoke_empty(Operation::SetOwner, &path, &params)
    }

    /// Set permission bits; sent in octal
    pub fn chmod(&mut self, path: &str, mode: u16) -> Result<()> {
        if mode > MAX_PERMISSION {
            return Err(HdfsError::IllegalArgument(format!(
                "'{:o}' is an invalid permission",
                mode
            )));
        }

        let path = path::normalize(path);
        let params = [("permission", format!("{:o}", mode))];
        self.invoke_empty(Operation::SetPermission, &path, &params)
    }

    /// Set the modification time, creating an empty file if `path` is missing
    ///
    /// `None` means now. Precision on the wire is whole seconds.
    pub fn touch(&mut self, path: &str, time: Option<DateTime<Utc>>) -> Result<()> {
        let path = path::normalize(path);
        let when = time.unwrap_or_else(Utc::now);

        if self.try_stat(&path)?.is_none() {
            self.put_bytes(&path, Vec::new())?;
        }

        let params = [("modificationtime", (when.timestamp() * 1000).to_string())];
        self.invoke_empty(Operation::SetTimes, &path, &params)
    }

    /// [`touch`](Self::touch) with a time given in seconds since the epoch
    pub fn touch_at_epoch(&mut self, path: &str, secs: i64) -> Result<()> {
        let when = (secs >= 0)
            .then(|| DateTime::<Utc>::from_timestamp(secs, 0))
            .flatten()
            .ok_or_else(|| {
                HdfsError::IllegalArgument(format!("'{}' is an invalid time argument", secs))
            })?;
        self.touch(path, Some(when))
    }

    // ------------------------------------------------------------------
    // Content
    // ------------------------------------------------------------------

    /// Stream the content of `path` into `sink`, returning the byte count
    pub fn get(&mut self, path: &str, sink: &mut dyn Write) -> Result<u64> {
        let path = path::normalize(path);
        let mut response = self.invoke(Operation::Open, &path, &[])?;

        let mut buf = vec![0u8; self.chunk_size];
        let mut received = 0u64;
        loop {
            let n = match response.body.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            sink.write_all(&buf[..n])?;
            received += n as u64;
        }
        sink.flush()?;

        debug!(path = %path, bytes = received, "download finished");
        if received != self.stat(&path)?.length() {
            return Err(HdfsError::IncompleteTransfer(format!(
                "{}: download incomplete",
                path
            )));
        }
        Ok(received)
    }

    /// Download `path` into memory
    pub fn get_bytes(&mut self, path: &str) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        self.get(path, &mut data)?;
        Ok(data)
    }

    /// Upload everything `source` yields to `path`, returning the byte count
    pub fn put<R>(&mut self, path: &str, source: R) -> Result<u64>
    where
        R: Read + Send + 'static,
    {
        let path = path::normalize(path);
        let sent = Arc::new(AtomicU64::new(0));
        let body = CountingReader {
            inner: source,
            count: Arc::clone(&sent),
        };

        self.create(&path, Box::new(body))?;

        let sent = sent.load(Ordering::Relaxed);
        debug!(path = %path, bytes = sent, "upload finished");
        if sent != self.stat(&path)?.length() {
            return Err(HdfsError::IncompleteTransfer(format!(
                "{}: upload incomplete",
                path
            )));
        }
        Ok(sent)
    }

    /// Upload an in-memory buffer
    pub fn put_bytes(&mut self, path: &str, data: Vec<u8>) -> Result<u64> {
        self.put(path, Cursor::new(data))
    }

    /// Two-phase create; the data leg never fails over
    fn create(&mut self, path: &str, body: Body) -> Result<()> {
        let control = self.invoke(Operation::Create, path, &[])?;
        let location = control
            .header("location")
            .map(str::to_string)
            .ok_or_else(|| {
                HdfsError::Protocol(format!(
                    "{}: create response carried no Location header",
                    path
                ))
            })?;
        drop(control);

        debug!(path = %path, location = %location, "streaming upload to data node");
        let request = HttpRequest::new(Method::Put, location)
            .header("content-type", OCTET_STREAM)
            .read_timeout(false)
            .body(body);

        let mut response = self.transport.send(request)?;
        self.calls += 1;
        log_response(&response);

        if response.status >= 400 {
            let body = response.read_body()?;
            return Err(remote::classify_response(response.status, &body, path).into_error());
        }
        response.read_body()?;
        Ok(())
    }
}

/// Counts bytes as the transport pulls them
struct CountingReader<R> {
    inner: R,
    count: Arc<AtomicU64>,
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.count.fetch_add(n as u64, Ordering::Relaxed);
        Ok(n)
    }
}

/// Exchange log: final URL, status line, then headers sorted and aligned
fn log_response(response: &HttpResponse) {
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return;
    }

    debug!("url:  {}", response.url);
    debug!("code: {} {}", response.status, response.reason());

    let mut headers: Vec<&(String, String)> = response.headers.iter().collect();
    headers.sort();
    let width = headers.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    for (name, value) in headers {
        debug!("  {:<width$} : {}", name, value, width = width);
    }
}
