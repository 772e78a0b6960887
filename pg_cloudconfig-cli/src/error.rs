//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent
//! formatting and a single exit code (1) for every fatal condition.

use std::fmt;
use std::path::PathBuf;
use std::process;

use pg_cloudconfig::bench::BenchError;
use pg_cloudconfig::conftool::StoreError;
use pg_cloudconfig::tuning::{TuneError, SUPPORTED_VERSIONS};

/// CLI-specific errors. Every variant terminates the run.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Requested server version is not in the allow-list
    UnsupportedVersion(String),
    /// Configuration directory missing or not a directory
    ConfDir {
        dir: PathBuf,
        version: String,
        cluster: String,
    },
    /// Target configuration file cannot be opened for writing
    ConfFile {
        path: PathBuf,
        error: std::io::Error,
    },
    /// pg_conftool missing or non-functional
    Tool(StoreError),
    /// Reading a setting from the store failed
    Store(StoreError),
    /// Storage benchmark failed
    Bench(BenchError),
    /// Sizing engine failed
    Tune(TuneError),
    /// Existing max_connections value could not be parsed
    MaxConnections(String),
}

impl CliError {
    /// Exit the process with an appropriate error message and code 1.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        // Print additional help for specific errors
        match self {
            CliError::UnsupportedVersion(_) => {
                eprintln!("Supported versions: {}", SUPPORTED_VERSIONS.join(", "));
            }
            CliError::ConfDir {
                version, cluster, ..
            } => {
                eprintln!(
                    "Hint: does the cluster {}/{} exist? Try 'pg_createcluster {} {}' if not.",
                    version, cluster, version, cluster
                );
            }
            CliError::Tool(_) => {
                eprintln!("pg_conftool is needed to read and write PostgreSQL settings.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::UnsupportedVersion(version) => {
                write!(f, "Version is not supported: {}", version)
            }
            CliError::ConfDir { dir, .. } => write!(
                f,
                "conf_dir ({}) is not a directory or does not exist",
                dir.display()
            ),
            CliError::ConfFile { path, error } => write!(
                f,
                "Unable to open postgresql.conf for writing: {} ({})",
                path.display(),
                error
            ),
            CliError::Tool(e) => write!(f, "pg_conftool is not working: {}", e),
            CliError::Store(e) => write!(f, "Failed to read setting: {}", e),
            CliError::Bench(e) => write!(f, "Storage benchmark failed: {}", e),
            CliError::Tune(e) => write!(f, "Failed to calculate settings: {}", e),
            CliError::MaxConnections(raw) => {
                write!(f, "Existing max_connections value is not a number: '{}'", raw)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Tool(e) | CliError::Store(e) => Some(e),
            CliError::ConfFile { error, .. } => Some(error),
            CliError::Bench(e) => Some(e),
            CliError::Tune(e) => Some(e),
            _ => None,
        }
    }
}
