//! WebHDFS Core Topology: pure-logic endpoint discovery and rotation
//!
//! # Overview
//!
//! A WebHDFS cluster may front its metadata service with several namenodes,
//! only one of which is active at a time. This crate answers two questions
//! for a client, without ever touching the network:
//!
//! - **Which endpoints exist?** A [`TopologySource`] turns the caller's base
//!   URL into an ordered candidate list, either from an explicit list or from
//!   the Hadoop client configuration (`hdfs-site.xml`, `core-site.xml`).
//! - **Which endpoint to try first?** An [`EndpointSet`] holds the candidates
//!   and is rotated so the last endpoint contacted becomes the head.
//!
//! ```text
//!   base URL ──► TopologySource ──► EndpointSet ──► client fail-over loop
//!                 (static | site)    (rotate_to)
//! ```
//!
//! # Example
//!
//! ```
//! use webhdfs_core_topology::{StaticTopology, TopologySource};
//!
//! let source = StaticTopology::new(vec![
//!     "hdfs://nn1".to_string(),
//!     "hdfs://nn2".to_string(),
//! ]);
//! let mut set = source.resolve("hdfs://prod").unwrap();
//! set.rotate_to(1);
//! assert_eq!(set.head(), "http://nn2:50070");
//! ```

pub mod discovery;
pub mod endpoint;
pub mod error;
pub mod site;

pub use discovery::{HadoopConfTopology, StaticTopology, TopologySource, HADOOP_CONF_DIR};
pub use endpoint::{normalize_endpoint, EndpointSet, DEFAULT_HTTP_PORT};
pub use error::{TopologyError, TopologyResult};
pub use site::SiteProperties;
