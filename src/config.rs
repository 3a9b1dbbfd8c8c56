/*!
 * Configuration types for the WebHDFS client
 */

use crate::error::{HdfsError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use webhdfs_core_topology::{HadoopConfTopology, StaticTopology, TopologySource};

/// Client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Cluster URL; `hdfs://nameservice` enables HA discovery
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Identity sent as `user.name`
    #[serde(default = "default_user")]
    pub user: String,

    /// Hadoop configuration directory (overridden by `HADOOP_CONF_DIR`)
    #[serde(default)]
    pub conf_dir: Option<PathBuf>,

    /// Explicit HA endpoints; takes precedence over `conf_dir`
    #[serde(default)]
    pub endpoints: Vec<String>,

    /// Connect timeout, and the longest wait for any single read, in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Download copy granularity in bytes
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Log level for diagnostic output
    #[serde(default)]
    pub log_level: LogLevel,

    /// Log file path (None = stderr)
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Enable verbose logging (shorthand for log_level = debug)
    #[serde(default)]
    pub verbose: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user: default_user(),
            conf_dir: None,
            endpoints: Vec::new(),
            timeout_ms: default_timeout_ms(),
            chunk_size: default_chunk_size(),
            log_level: LogLevel::Info,
            log_file: None,
            verbose: false,
        }
    }
}

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Only errors
    Error,

    /// Warnings and errors
    Warn,

    /// Info, warnings, and errors
    #[default]
    Info,

    /// Debug and above; includes every HTTP exchange
    Debug,

    /// All messages including traces
    Trace,
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(format!("invalid log level '{}'", other)),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:50070".to_string()
}

fn default_user() -> String {
    ["HADOOP_USER_NAME", "USER", "USERNAME"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|value| !value.is_empty())
        .unwrap_or_else(|| "hdfs".to_string())
}

fn default_timeout_ms() -> u64 {
    500
}

fn default_chunk_size() -> usize {
    16 * 1024
}

impl ClientConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            HdfsError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&contents)
            .map_err(|e| HdfsError::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// Save configuration to a TOML file
    pub fn to_file(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| HdfsError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// `<platform config dir>/webhdfs/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("webhdfs").join("config.toml"))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Topology source selected by this configuration
    pub fn topology(&self) -> Box<dyn TopologySource> {
        if self.endpoints.is_empty() {
            Box::new(HadoopConfTopology::new(self.conf_dir.clone()))
        } else {
            Box::new(StaticTopology::new(self.endpoints.clone()))
        }
    }
}
