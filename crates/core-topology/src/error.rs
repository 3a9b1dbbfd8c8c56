//! Error types for topology discovery

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for topology operations
pub type TopologyResult<T> = std::result::Result<T, TopologyError>;

#[derive(Error, Debug)]
pub enum TopologyError {
    /// An endpoint set must always hold at least one candidate
    #[error("Endpoint set is empty")]
    Empty,

    /// A base or namenode URL could not be parsed
    #[error("Invalid endpoint URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Reading a site file failed for a reason other than absence
    #[error("Failed to read site file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}
