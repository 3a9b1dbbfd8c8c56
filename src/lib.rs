/*!
 * webhdfs - High-availability WebHDFS client
 *
 * A synchronous client for the Hadoop WebHDFS REST API with:
 * - Namenode discovery from Hadoop configuration or an explicit list
 * - Transparent fail-over across standby and unreachable namenodes
 * - Two-phase uploads and streamed downloads with size verification
 * - Lazy recursive listing and shell-style globbing
 * - A closed, typed error taxonomy for remote exceptions
 */

pub mod cli_style;
pub mod client;
pub mod config;
pub mod error;
pub mod listing;
pub mod logging;
pub mod path;
pub mod protocol;
pub mod status;
pub mod transport;

// Re-export commonly used types
pub use client::WebHdfsClient;
pub use config::{ClientConfig, LogLevel};
pub use error::{HdfsError, Result};
pub use listing::Listing;
pub use protocol::wire::FileKind;
pub use protocol::Operation;
pub use status::{ContentSummary, FileStatus, SummaryField};
pub use transport::{Transport, TransportError};
pub use webhdfs_core_topology::{EndpointSet, TopologySource};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(VERSION, env!("CARGO_PKG_VERSION"));
    }
}
