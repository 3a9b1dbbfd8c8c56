/*!
 * Error types for the WebHDFS client
 */

use std::fmt;
use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, HdfsError>;

/// Exit code constants for structured process exit
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_REMOTE: i32 = 1;
pub const EXIT_FATAL: i32 = 2;
pub const EXIT_INTEGRITY: i32 = 3;

/// Classified client failure
///
/// The first eight variants form the remote-facing taxonomy; each carries the
/// human-readable message extracted from the remote payload (first line
/// only) or built locally. The remaining variants cover local concerns.
#[derive(Error, Debug)]
pub enum HdfsError {
    /// No endpoint could be reached
    #[error("{0}")]
    Connection(String),

    /// Remote path does not exist
    #[error("{0}")]
    FileNotFound(String),

    /// Caller passed a semantically invalid parameter
    #[error("{0}")]
    IllegalArgument(String),

    /// Permission denied by the cluster
    #[error("{0}")]
    AccessControl(String),

    /// Authentication or security-layer rejection
    #[error("{0}")]
    Security(String),

    /// Operation not supported by the cluster
    #[error("{0}")]
    UnsupportedOperation(String),

    /// Post-transfer size verification failed
    #[error("{0}")]
    IncompleteTransfer(String),

    /// Remote exception class not recognized
    #[error("{0}")]
    UnknownRemote(String),

    /// Local sink or source failure
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid configuration, endpoint URL or topology
    #[error("Configuration error: {0}")]
    Config(String),

    /// A successful response did not carry the expected payload
    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl HdfsError {
    /// Get the process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            HdfsError::Connection(_) | HdfsError::Config(_) => EXIT_FATAL,
            HdfsError::IncompleteTransfer(_) => EXIT_INTEGRITY,
            _ => EXIT_REMOTE,
        }
    }

    /// Check if this error is transient (another endpoint or a later call may succeed)
    pub fn is_transient(&self) -> bool {
        matches!(self, HdfsError::Connection(_))
    }

    /// Check if this error reports a missing path
    pub fn is_not_found(&self) -> bool {
        matches!(self, HdfsError::FileNotFound(_))
    }

    /// Get error category for logging and reporting
    pub fn category(&self) -> ErrorCategory {
        match self {
            HdfsError::Connection(_) => ErrorCategory::Network,
            HdfsError::FileNotFound(_) => ErrorCategory::NotFound,
            HdfsError::IllegalArgument(_) => ErrorCategory::Validation,
            HdfsError::AccessControl(_) | HdfsError::Security(_) => ErrorCategory::Security,
            HdfsError::UnsupportedOperation(_) => ErrorCategory::Unsupported,
            HdfsError::IncompleteTransfer(_) => ErrorCategory::Integrity,
            HdfsError::UnknownRemote(_) => ErrorCategory::Remote,
            HdfsError::Io(_) => ErrorCategory::IoError,
            HdfsError::Config(_) => ErrorCategory::Configuration,
            HdfsError::Protocol(_) => ErrorCategory::Protocol,
        }
    }
}

/// Error category for classification and reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Endpoint unreachable
    Network,
    /// Missing remote path
    NotFound,
    /// Invalid arguments
    Validation,
    /// Authorization and authentication
    Security,
    /// Operation not available on the cluster
    Unsupported,
    /// Transfer size mismatch
    Integrity,
    /// Unrecognized remote exception
    Remote,
    /// Local I/O
    IoError,
    /// Configuration
    Configuration,
    /// Malformed responses
    Protocol,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Network => write!(f, "network"),
            ErrorCategory::NotFound => write!(f, "not-found"),
            ErrorCategory::Validation => write!(f, "validation"),
            ErrorCategory::Security => write!(f, "security"),
            ErrorCategory::Unsupported => write!(f, "unsupported"),
            ErrorCategory::Integrity => write!(f, "integrity"),
            ErrorCategory::Remote => write!(f, "remote"),
            ErrorCategory::IoError => write!(f, "io"),
            ErrorCategory::Configuration => write!(f, "configuration"),
            ErrorCategory::Protocol => write!(f, "protocol"),
        }
    }
}

impl From<webhdfs_core_topology::TopologyError> for HdfsError {
    fn from(err: webhdfs_core_topology::TopologyError) -> Self {
        HdfsError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for HdfsError {
    fn from(err: serde_json::Error) -> Self {
        HdfsError::Protocol(format!("JSON parse error: {}", err))
    }
}
