//! Remote exception classification
//!
//! Error responses carry a payload such as
//!
//! ```json
//! {"RemoteException": {"exception": "FileNotFoundException",
//!                      "javaClassName": "java.io.FileNotFoundException",
//!                      "message": "File does not exist: /tmp/x"}}
//! ```
//!
//! The exception class name is mapped through a fixed table onto an error
//! kind. Only the first line of the message is kept.

use crate::error::HdfsError;
use reqwest::StatusCode;
use serde::Deserialize;

/// Message used when the payload names no message
pub const UNKNOWN_REMOTE_MESSAGE: &str = "unknown remote error has occurred";

#[derive(Debug, Clone, Default, Deserialize)]
struct RemoteExceptionEnvelope {
    #[serde(rename = "RemoteException", default)]
    remote_exception: RemoteException,
}

/// Body of a `RemoteException` envelope
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteException {
    #[serde(default)]
    pub exception: Option<String>,
    #[serde(default)]
    pub java_class_name: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Kinds of remote exception the client distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteExceptionKind {
    /// Contacted namenode is not the active one
    Standby,
    FileNotFound,
    IllegalArgument,
    AccessControl,
    Security,
    UnsupportedOperation,
    Unknown,
}

impl RemoteExceptionKind {
    /// Map an exception class name; qualified Java names match on their last component
    pub fn from_class_name(name: &str) -> Self {
        let short = name.rsplit('.').next().unwrap_or(name);
        match short {
            "StandbyException" => RemoteExceptionKind::Standby,
            "FileNotFoundException" => RemoteExceptionKind::FileNotFound,
            "IllegalArgumentException" => RemoteExceptionKind::IllegalArgument,
            "AccessControlException" => RemoteExceptionKind::AccessControl,
            "SecurityException" => RemoteExceptionKind::Security,
            "UnsupportedOperationException" => RemoteExceptionKind::UnsupportedOperation,
            _ => RemoteExceptionKind::Unknown,
        }
    }
}

/// A classified remote failure, before it becomes an [`HdfsError`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedRemote {
    pub kind: RemoteExceptionKind,
    pub message: String,
}

impl ClassifiedRemote {
    pub fn is_standby(&self) -> bool {
        self.kind == RemoteExceptionKind::Standby
    }

    /// Convert to the caller-facing error; standby surfaces as unknown remote
    pub fn into_error(self) -> HdfsError {
        let message = self.message;
        match self.kind {
            RemoteExceptionKind::FileNotFound => HdfsError::FileNotFound(message),
            RemoteExceptionKind::IllegalArgument => HdfsError::IllegalArgument(message),
            RemoteExceptionKind::AccessControl => HdfsError::AccessControl(message),
            RemoteExceptionKind::Security => HdfsError::Security(message),
            RemoteExceptionKind::UnsupportedOperation => {
                HdfsError::UnsupportedOperation(message)
            }
            RemoteExceptionKind::Standby | RemoteExceptionKind::Unknown => {
                HdfsError::UnknownRemote(message)
            }
        }
    }
}

impl From<RemoteException> for ClassifiedRemote {
    fn from(exception: RemoteException) -> Self {
        let kind = exception
            .exception
            .as_deref()
            .or(exception.java_class_name.as_deref())
            .map(RemoteExceptionKind::from_class_name)
            .unwrap_or(RemoteExceptionKind::Unknown);

        let message = exception
            .message
            .as_deref()
            .map(|m| m.lines().next().unwrap_or("").to_string())
            .unwrap_or_else(|| UNKNOWN_REMOTE_MESSAGE.to_string());

        ClassifiedRemote { kind, message }
    }
}

/// Classify a structured error payload; `None` if the body is not one
pub fn classify_payload(body: &[u8]) -> Option<ClassifiedRemote> {
    serde_json::from_slice::<RemoteExceptionEnvelope>(body)
        .ok()
        .map(|envelope| envelope.remote_exception.into())
}

/// Classify an HTTP error response for `path`
///
/// Bodies that are not a structured payload fall back to a message built
/// from the status line and the request path.
pub fn classify_response(status: u16, body: &[u8], path: &str) -> ClassifiedRemote {
    classify_payload(body).unwrap_or_else(|| {
        let reason = StatusCode::from_u16(status)
            .ok()
            .and_then(|code| code.canonical_reason())
            .map(str::to_string)
            .unwrap_or_else(|| status.to_string());

        ClassifiedRemote {
            kind: RemoteExceptionKind::Unknown,
            message: format!("{}: {}", reason, path),
        }
    })
}
