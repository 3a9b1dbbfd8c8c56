/*!
 * webhdfs CLI - Command Line Interface
 *
 * One-shot commands against a WebHDFS cluster. Every command goes through
 * the fail-over client, so HA clusters work without naming the active
 * namenode.
 */

use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use webhdfs::{
    cli_style::{self, format_bytes, listing_table, summary_table},
    config::{ClientConfig, LogLevel},
    error::{ErrorCategory, HdfsError, Result, EXIT_SUCCESS},
    logging, FileStatus, WebHdfsClient,
};

#[derive(Parser)]
#[command(name = "webhdfs")]
#[command(version, about = "High-availability WebHDFS client", long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Cluster URL; hdfs://<nameservice> enables HA discovery
    #[arg(long, value_name = "URL", global = true)]
    url: Option<String>,

    /// User name sent with every request
    #[arg(long, value_name = "NAME", global = true)]
    user: Option<String>,

    /// Hadoop configuration directory (HADOOP_CONF_DIR takes precedence)
    #[arg(long, value_name = "DIR", global = true)]
    conf_dir: Option<PathBuf>,

    /// Connect and read timeout in milliseconds
    #[arg(long, value_name = "MS", global = true)]
    timeout_ms: Option<u64>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL", global = true)]
    log_level: Option<LogLevel>,

    /// Write logs to a file (JSON)
    #[arg(long, value_name = "FILE", global = true)]
    log: Option<PathBuf>,

    /// Verbose output; logs every HTTP exchange
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the status of a path
    Stat { path: String },

    /// List a directory
    Ls {
        path: Option<String>,

        /// Recurse into subdirectories
        #[arg(short = 'R', long)]
        recursive: bool,
    },

    /// Expand a shell-style pattern
    Glob { pattern: String },

    /// Show usage of a path
    Du {
        path: Option<String>,

        /// Report physical bytes (replication included)
        #[arg(long, conflicts_with_all = ["field", "all"])]
        real: bool,

        /// Report one field: dirs, files, hdfs_usage, disk_usage, hdfs_quota, disk_quota
        #[arg(long, value_name = "NAME", conflicts_with = "all")]
        field: Option<String>,

        /// Report every field
        #[arg(long)]
        all: bool,
    },

    /// Create a directory (and missing parents)
    Mkdir { path: String },

    /// Rename a path
    Mv { source: String, dest: String },

    /// Remove a file
    Rm { path: String },

    /// Remove an empty directory
    Rmdir { path: String },

    /// Set the replication factor of a file
    Repl { path: String, replication: u16 },

    /// Change owner and/or group (OWNER, OWNER:GROUP or :GROUP)
    Chown { spec: String, path: String },

    /// Change permission bits (octal)
    Chmod { mode: String, path: String },

    /// Update the modification time, creating the file if missing
    Touch {
        path: String,

        /// Seconds since the epoch instead of now
        #[arg(long, value_name = "SECS", allow_negative_numbers = true)]
        epoch: Option<i64>,
    },

    /// Download a file
    Get {
        path: String,

        /// Local destination (defaults to the remote file name)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Print a file to stdout
    Cat { path: String },

    /// Upload a local file
    Put { local: PathBuf, remote: String },

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn main() {
    let code = match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            tracing::debug!(category = %e.category(), error = ?e, "command failed");
            cli_style::print_error(&format!("[{}] {}", e.category(), e), hint(&e));
            e.exit_code()
        }
    };
    std::process::exit(code);
}

fn hint(err: &HdfsError) -> Option<&'static str> {
    if err.is_transient() {
        return Some("check --url, --conf-dir or HADOOP_CONF_DIR and that a namenode is up");
    }
    match err.category() {
        ErrorCategory::Security => Some("check --user or HADOOP_USER_NAME"),
        ErrorCategory::Integrity => Some("the transfer can be retried"),
        _ => None,
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Completions { shell } = cli.command {
        use clap::CommandFactory;
        use clap_complete::generate;
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "webhdfs", &mut io::stdout());
        return Ok(());
    }

    let config = load_config(&cli);
    if let Err(e) = logging::init_logging(&config) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    let mut client = WebHdfsClient::new(&config)?;
    let result = execute(&mut client, cli.command);
    tracing::debug!(calls = client.calls(), "session finished");
    result
}

/// Config file (explicit, else the default location), then CLI overrides
fn load_config(cli: &Cli) -> ClientConfig {
    let path = cli.config.clone().or_else(|| {
        ClientConfig::default_path().filter(|path| path.exists())
    });

    let mut config = match path {
        Some(ref path) => ClientConfig::from_file(path).unwrap_or_else(|e| {
            cli_style::print_warning(&format!("Failed to load config file: {}", e));
            ClientConfig::default()
        }),
        None => ClientConfig::default(),
    };

    if let Some(ref url) = cli.url {
        config.base_url = url.clone();
    }
    if let Some(ref user) = cli.user {
        config.user = user.clone();
    }
    if let Some(ref dir) = cli.conf_dir {
        config.conf_dir = Some(dir.clone());
    }
    if let Some(ms) = cli.timeout_ms {
        config.timeout_ms = ms;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if cli.log.is_some() {
        config.log_file = cli.log.clone();
    }
    config.verbose |= cli.verbose;

    config
}

fn execute(client: &mut WebHdfsClient, command: Commands) -> Result<()> {
    match command {
        Commands::Stat { path } => {
            let status = client.stat(&path)?;
            print_status(&status);
        }
        Commands::Ls { path, recursive } => {
            let path = path.unwrap_or_else(|| format!("/user/{}", client.user()));
            let entries = client.ls(&path, recursive).collect::<Result<Vec<_>>>()?;
            println!("{}", listing_table(&entries, recursive));
        }
        Commands::Glob { pattern } => {
            for entry in client.glob(&pattern)? {
                println!("{}", entry);
            }
        }
        Commands::Du {
            path,
            real,
            field,
            all,
        } => {
            let path = path.unwrap_or_else(|| "/".to_string());
            if all {
                println!("{}", summary_table(&client.content_summary(&path)?));
            } else if let Some(name) = field {
                println!("{}", client.du_field(&path, &name)?);
            } else {
                println!("{}", client.du(&path, real)?);
            }
        }
        Commands::Mkdir { path } => report(client.mkdir(&path)?, "mkdir", &path)?,
        Commands::Mv { source, dest } => report(client.rename(&source, &dest)?, "mv", &source)?,
        Commands::Rm { path } => {
            if client.stat(&path)?.is_dir() {
                return Err(HdfsError::IllegalArgument(format!(
                    "{}: cannot remove directory",
                    path
                )));
            }
            report(client.delete(&path)?, "rm", &path)?;
        }
        Commands::Rmdir { path } => {
            let status = client.stat(&path)?;
            if !status.is_dir() {
                return Err(HdfsError::IllegalArgument(format!(
                    "{}: not a directory",
                    path
                )));
            }
            if client.ls(&path, false).next().transpose()?.is_some() {
                return Err(HdfsError::IllegalArgument(format!(
                    "{}: directory not empty",
                    path
                )));
            }
            report(client.delete(&path)?, "rmdir", &path)?;
        }
        Commands::Repl { path, replication } => {
            report(client.set_replication(&path, replication)?, "repl", &path)?
        }
        Commands::Chown { spec, path } => {
            let (owner, group) = parse_owner_spec(&spec);
            client.chown(&path, owner, group)?;
        }
        Commands::Chmod { mode, path } => {
            let mode = u16::from_str_radix(&mode, 8).map_err(|_| {
                HdfsError::IllegalArgument(format!("'{}' is an invalid permission", mode))
            })?;
            client.chmod(&path, mode)?;
        }
        Commands::Touch { path, epoch } => match epoch {
            Some(secs) => client.touch_at_epoch(&path, secs)?,
            None => client.touch(&path, None)?,
        },
        Commands::Get { path, output } => {
            if client.stat(&path)?.is_dir() {
                return Err(HdfsError::IllegalArgument(format!(
                    "{}: cannot download directory",
                    path
                )));
            }
            let target = output.unwrap_or_else(|| local_name(&path));
            if target.exists() {
                return Err(HdfsError::IllegalArgument(format!(
                    "{}: file exists",
                    target.display()
                )));
            }
            let mut sink = BufWriter::new(File::create(&target)?);
            let bytes = client.get(&path, &mut sink)?;
            eprintln!("{} -> {} ({})", path, target.display(), format_bytes(bytes));
        }
        Commands::Cat { path } => {
            if client.stat(&path)?.is_dir() {
                return Err(HdfsError::IllegalArgument(format!(
                    "{}: cannot cat directory",
                    path
                )));
            }
            let stdout = io::stdout();
            let mut sink = stdout.lock();
            client.get(&path, &mut sink)?;
        }
        Commands::Put { local, remote } => {
            if local.is_dir() {
                return Err(HdfsError::IllegalArgument(format!(
                    "{}: cannot upload directory",
                    local.display()
                )));
            }
            let remote = match client.try_stat(&remote)? {
                Some(status) if status.is_dir() => match local.file_name() {
                    Some(name) => format!("{}/{}", status.full(), name.to_string_lossy()),
                    None => remote,
                },
                _ => remote,
            };
            let bytes = client.put(&remote, File::open(&local)?)?;
            eprintln!("{} -> {} ({})", local.display(), remote, format_bytes(bytes));
        }
        Commands::Completions { .. } => {}
    }

    io::stdout().flush()?;
    Ok(())
}

fn print_status(status: &FileStatus) {
    println!("  path:        {}", status.full());
    println!("  type:        {}", if status.is_dir() { "directory" } else { "file" });
    println!("  mode:        {} ({:04o})", status.mode(), status.permission());
    println!("  owner:       {}:{}", status.owner(), status.group());
    println!("  size:        {} ({})", status.length(), format_bytes(status.length()));
    if let Some(children) = status.children() {
        println!("  children:    {}", children);
    } else {
        println!("  replication: {}", status.replication());
    }
    println!("  modified:    {}", status.modified().format("%Y-%m-%d %H:%M:%S UTC"));
}

/// A `false` answer from a boolean operation is reported as a failure
fn report(ok: bool, command: &str, path: &str) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(HdfsError::UnknownRemote(format!(
            "{}: {}: operation was not performed",
            command, path
        )))
    }
}

/// `owner`, `owner:group` or `:group`
fn parse_owner_spec(spec: &str) -> (Option<&str>, Option<&str>) {
    let (owner, group) = match spec.split_once(':') {
        Some((owner, group)) => (owner, Some(group)),
        None => (spec, None),
    };
    let owner = Some(owner).filter(|o| !o.is_empty());
    let group = group.filter(|g| !g.is_empty());
    (owner, group)
}

fn local_name(remote: &str) -> PathBuf {
    let (_, name) = webhdfs::path::split(remote);
    Path::new(".").join(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint_by_category() {
        assert!(hint(&HdfsError::Connection("down".into()))
            .unwrap()
            .contains("HADOOP_CONF_DIR"));
        assert!(hint(&HdfsError::Security("denied".into()))
            .unwrap()
            .contains("--user"));
        assert!(hint(&HdfsError::AccessControl("denied".into())).is_some());
        assert!(hint(&HdfsError::FileNotFound("/x".into())).is_none());
    }

    #[test]
    fn test_parse_owner_spec() {
        assert_eq!(parse_owner_spec("etl"), (Some("etl"), None));
        assert_eq!(parse_owner_spec("etl:hadoop"), (Some("etl"), Some("hadoop")));
        assert_eq!(parse_owner_spec(":hadoop"), (None, Some("hadoop")));
        assert_eq!(parse_owner_spec(":"), (None, None));
    }

    #[test]
    fn test_local_name_uses_last_segment() {
        assert_eq!(local_name("/data/logs/app.log"), Path::new("./app.log"));
    }
}
