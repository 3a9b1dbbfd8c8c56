/*!
 * Logging initialization
 *
 * Command output goes to stdout, so diagnostics go to stderr or, with
 * `log_file`, to a JSON-lines file. `RUST_LOG` overrides the configured
 * level. The per-exchange HTTP log is emitted at debug, which `verbose`
 * turns on.
 */

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ClientConfig;
use crate::error::{HdfsError, Result};

/// Install the global subscriber described by `config`
pub fn init_logging(config: &ClientConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directive(effective_level(config))))
        .map_err(|e| HdfsError::Config(format!("Failed to create log filter: {}", e)))?;
    let registry = tracing_subscriber::registry().with(filter);

    match config.log_file {
        Some(ref path) => registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(Mutex::new(open_log(path)?))
                    .with_ansi(false),
            )
            .init(),
        None => registry
            .with(
                fmt::layer()
                    .compact()
                    .with_writer(std::io::stderr)
                    .without_time(),
            )
            .init(),
    }

    Ok(())
}

fn effective_level(config: &ClientConfig) -> Level {
    if config.verbose {
        Level::DEBUG
    } else {
        config.log_level.to_tracing_level()
    }
}

/// Both crates log: the client and endpoint discovery
fn directive(level: Level) -> String {
    format!("webhdfs={level},webhdfs_core_topology={level}", level = level)
}

fn open_log(path: &Path) -> Result<File> {
    File::create(path).map_err(|e| {
        HdfsError::Config(format!(
            "Failed to create log file {}: {}",
            path.display(),
            e
        ))
    })
}

/// Debug-level subscriber writing through the test harness
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::new(directive(Level::DEBUG)))
        .with(fmt::layer().with_test_writer())
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;

    #[test]
    fn test_verbose_overrides_log_level() {
        let config = ClientConfig {
            log_level: LogLevel::Error,
            verbose: true,
            ..Default::default()
        };
        assert_eq!(effective_level(&config), Level::DEBUG);
    }

    #[test]
    fn test_configured_level() {
        let config = ClientConfig {
            log_level: LogLevel::Warn,
            ..Default::default()
        };
        assert_eq!(effective_level(&config), Level::WARN);
    }

    #[test]
    fn test_directive_covers_both_crates() {
        let directive = directive(Level::INFO);
        assert_eq!(directive, "webhdfs=INFO,webhdfs_core_topology=INFO");
        assert!(EnvFilter::try_new(&directive).is_ok());
    }

    #[test]
    fn test_unwritable_log_file() {
        let err = open_log(Path::new("/nonexistent-dir/webhdfs.log")).unwrap_err();
        assert!(matches!(err, HdfsError::Config(_)));
    }

    #[test]
    fn test_test_logging_is_reentrant() {
        init_test_logging();
        init_test_logging();
        tracing::debug!("test logging initialized");
    }
}
