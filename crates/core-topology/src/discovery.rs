//! Topology sources that produce the candidate endpoint list
//!
//! A source is consulted once, when a client is built. The result is always
//! non-empty: if nothing better is known, the caller's own base URL is the
//! only candidate.

use crate::endpoint::{nameservice, normalize_endpoint, with_authority, EndpointSet};
use crate::error::{TopologyError, TopologyResult};
use crate::site::SiteProperties;
use std::io;
use std::path::{Path, PathBuf};

/// Environment variable naming the Hadoop configuration directory
pub const HADOOP_CONF_DIR: &str = "HADOOP_CONF_DIR";

/// Site files consulted, in order
pub const SITE_FILES: [&str; 2] = ["hdfs-site.xml", "core-site.xml"];

/// Produces candidate endpoints for a caller-supplied base URL
pub trait TopologySource {
    /// Discover HA endpoints for `base`
    ///
    /// An empty vector means "no HA candidates known"; `resolve` then falls
    /// back to the base URL itself.
    fn endpoints(&self, base: &str) -> TopologyResult<Vec<String>>;

    /// Discover and wrap the result in an [`EndpointSet`]
    fn resolve(&self, base: &str) -> TopologyResult<EndpointSet> {
        let found = self.endpoints(base)?;
        if found.is_empty() {
            return Ok(EndpointSet::single(normalize_endpoint(base)?));
        }
        EndpointSet::new(found)
    }
}

/// Fixed list of endpoints, typically from client configuration
#[derive(Debug, Clone, Default)]
pub struct StaticTopology {
    urls: Vec<String>,
}

impl StaticTopology {
    pub fn new(urls: Vec<String>) -> Self {
        Self { urls }
    }
}

impl TopologySource for StaticTopology {
    fn endpoints(&self, _base: &str) -> TopologyResult<Vec<String>> {
        self.urls.iter().map(|u| normalize_endpoint(u)).collect()
    }
}

/// Hadoop client configuration (`hdfs-site.xml`, `core-site.xml`)
///
/// The nameservice is the host part of the base URL. For each namenode id
/// listed under `dfs.ha.namenodes.<ns>`, the HTTP address is read from
/// `dfs.namenode.http-address.<ns>.<id>`.
#[derive(Debug, Clone, Default)]
pub struct HadoopConfTopology {
    conf_dir: Option<PathBuf>,
}

impl HadoopConfTopology {
    /// Use `$HADOOP_CONF_DIR` if set, else `conf_dir`
    pub fn new(conf_dir: Option<PathBuf>) -> Self {
        let conf_dir = std::env::var_os(HADOOP_CONF_DIR)
            .map(PathBuf::from)
            .or(conf_dir);
        Self { conf_dir }
    }

    /// Use exactly `conf_dir`, ignoring the environment
    pub fn with_dir(conf_dir: impl Into<PathBuf>) -> Self {
        Self {
            conf_dir: Some(conf_dir.into()),
        }
    }

    pub fn conf_dir(&self) -> Option<&Path> {
        self.conf_dir.as_deref()
    }

    fn load(&self, path: &Path) -> TopologyResult<Option<SiteProperties>> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "site file not found");
                return Ok(None);
            }
            Err(source) => {
                return Err(TopologyError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        match SiteProperties::parse(&text) {
            Ok(site) => Ok(Some(site)),
            Err(reason) => {
                tracing::debug!(path = %path.display(), %reason, "failed to parse site file as xml");
                Ok(None)
            }
        }
    }
}

impl TopologySource for HadoopConfTopology {
    fn endpoints(&self, base: &str) -> TopologyResult<Vec<String>> {
        let Some(dir) = self.conf_dir.as_deref() else {
            return Ok(Vec::new());
        };
        let ns = nameservice(base)?;

        for file in SITE_FILES {
            let path = dir.join(file);
            tracing::debug!(path = %path.display(), nameservice = %ns, "parsing site file");

            let Some(site) = self.load(&path)? else {
                continue;
            };
            let Some(ids) = site.get(&format!("dfs.ha.namenodes.{}", ns)) else {
                continue;
            };
            tracing::debug!(namenodes = %ids, "found ha namenodes");

            let mut urls = Vec::new();
            for id in ids.split(',').map(str::trim).filter(|id| !id.is_empty()) {
                let key = format!("dfs.namenode.http-address.{}.{}", ns, id);
                match site.get(&key) {
                    Some(addr) => {
                        let url = with_authority(base, addr)?;
                        tracing::debug!(namenode = %id, address = %addr, "resolved namenode address");
                        urls.push(url);
                    }
                    None => tracing::warn!(namenode = %id, "no http address configured for namenode"),
                }
            }

            if !urls.is_empty() {
                return Ok(urls);
            }
        }

        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_site(dir: &Path, name: &str, body: &str) {
        fs::write(
            dir.join(name),
            format!("<?xml version=\"1.0\"?>\n<configuration>\n{}\n</configuration>\n", body),
        )
        .unwrap();
    }

    fn property(name: &str, value: &str) -> String {
        format!(
            "<property><name>{}</name><value>{}</value></property>",
            name, value
        )
    }

    #[test]
    fn test_static_topology_normalizes() {
        let source = StaticTopology::new(vec![
            "hdfs://nn1".to_string(),
            "http://nn2:9870/".to_string(),
        ]);
        let set = source.resolve("hdfs://prod").unwrap();
        assert_eq!(set.as_slice(), &["http://nn1:50070", "http://nn2:9870"]);
    }

    #[test]
    fn test_empty_static_falls_back_to_base() {
        let set = StaticTopology::default().resolve("hdfs://single").unwrap();
        assert_eq!(set.as_slice(), &["http://single:50070"]);
    }

    #[test]
    fn test_hdfs_site_ha_pair() {
        let dir = TempDir::new().unwrap();
        write_site(
            dir.path(),
            "hdfs-site.xml",
            &[
                property("dfs.ha.namenodes.prod", "nn1,nn2"),
                property("dfs.namenode.http-address.prod.nn1", "a.example.com:50070"),
                property("dfs.namenode.http-address.prod.nn2", "b.example.com:50070"),
            ]
            .concat(),
        );

        let set = HadoopConfTopology::with_dir(dir.path())
            .resolve("hdfs://prod")
            .unwrap();
        assert_eq!(
            set.as_slice(),
            &["http://a.example.com:50070", "http://b.example.com:50070"]
        );
    }

    #[test]
    fn test_core_site_consulted_after_hdfs_site() {
        let dir = TempDir::new().unwrap();
        write_site(dir.path(), "hdfs-site.xml", &property("dfs.replication", "3"));
        write_site(
            dir.path(),
            "core-site.xml",
            &[
                property("dfs.ha.namenodes.prod", "nn1"),
                property("dfs.namenode.http-address.prod.nn1", "c.example.com:50070"),
            ]
            .concat(),
        );

        let set = HadoopConfTopology::with_dir(dir.path())
            .resolve("hdfs://prod")
            .unwrap();
        assert_eq!(set.as_slice(), &["http://c.example.com:50070"]);
    }

    #[test]
    fn test_malformed_site_skipped() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("hdfs-site.xml"), "not xml at all").unwrap();

        let set = HadoopConfTopology::with_dir(dir.path())
            .resolve("http://standalone:50070")
            .unwrap();
        assert_eq!(set.as_slice(), &["http://standalone:50070"]);
    }

    #[test]
    fn test_missing_directory_falls_back() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let set = HadoopConfTopology::with_dir(missing)
            .resolve("hdfs://other")
            .unwrap();
        assert_eq!(set.as_slice(), &["http://other:50070"]);
    }

    #[test]
    fn test_unrelated_nameservice_falls_back() {
        let dir = TempDir::new().unwrap();
        write_site(
            dir.path(),
            "hdfs-site.xml",
            &[
                property("dfs.ha.namenodes.prod", "nn1"),
                property("dfs.namenode.http-address.prod.nn1", "a:50070"),
            ]
            .concat(),
        );
        let set = HadoopConfTopology::with_dir(dir.path())
            .resolve("hdfs://staging")
            .unwrap();
        assert_eq!(set.as_slice(), &["http://staging:50070"]);
    }
}
