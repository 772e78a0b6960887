//! Boundary to the external configuration store.
//!
//! Settings are read and written through [`ConfigStore`], a two-method
//! interface. The production implementation shells out to
//! `pg_conftool`; [`MemoryStore`] substitutes for it in tests and dry
//! runs so nothing in the core depends on process spawning.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use thiserror::Error;
use tracing::{error, info};

use crate::format::format_setting;
use crate::tuning::TuningOutput;

/// Name of the external tool used to read and write settings.
pub const CONFTOOL: &str = "pg_conftool";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to invoke {CONFTOOL}: {0}")]
    Invoke(#[from] std::io::Error),
    #[error("{CONFTOOL} --help exited with {0:?}; is it installed and in PATH?")]
    NotWorking(Option<i32>),
    #[error("{CONFTOOL} exited with {code:?} while reading '{key}'")]
    Show { key: String, code: Option<i32> },
    #[error("{CONFTOOL} exited with {code:?} while setting '{key}'")]
    Set { key: String, code: Option<i32> },
    #[error("{CONFTOOL} produced output that is not valid UTF-8")]
    Encoding,
    #[error("setting '{0}' has no value in the configuration")]
    Missing(String),
}

/// Get/set access to named settings of one cluster's configuration.
pub trait ConfigStore {
    fn get(&self, key: &str) -> Result<String, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Production store backed by the `pg_conftool` executable.
///
/// Assumes the Debian / postgresql-common naming and configuration
/// schema; `conf` is the `postgresql.conf` of the cluster identified by
/// `version` and `cluster`.
#[derive(Debug, Clone)]
pub struct PgConftool {
    version: String,
    cluster: String,
    conf: PathBuf,
}

impl PgConftool {
    pub fn new(version: &str, cluster: &str, conf: &Path) -> Self {
        Self {
            version: version.to_string(),
            cluster: cluster.to_string(),
            conf: conf.to_path_buf(),
        }
    }
}

impl ConfigStore for PgConftool {
    fn get(&self, key: &str) -> Result<String, StoreError> {
        let output = Command::new(CONFTOOL)
            .arg("--short")
            .arg(&self.version)
            .arg(&self.cluster)
            .arg(&self.conf)
            .arg("show")
            .arg(key)
            .output()?;
        if !output.status.success() {
            return Err(StoreError::Show {
                key: key.to_string(),
                code: output.status.code(),
            });
        }
        let text = String::from_utf8(output.stdout).map_err(|_| StoreError::Encoding)?;
        Ok(chomp(&text).to_string())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let status = Command::new(CONFTOOL)
            .arg(&self.version)
            .arg(&self.cluster)
            .arg(&self.conf)
            .arg("set")
            .arg(key)
            .arg(value)
            .status()?;
        if !status.success() {
            return Err(StoreError::Set {
                key: key.to_string(),
                code: status.code(),
            });
        }
        Ok(())
    }
}

/// Check that `pg_conftool` is installed and responds to `--help`.
pub fn check_available() -> Result<(), StoreError> {
    let status = Command::new(CONFTOOL)
        .arg("--help")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()?;
    if !status.success() {
        return Err(StoreError::NotWorking(status.code()));
    }
    Ok(())
}

/// Read the cluster's `data_directory` setting.
pub fn data_directory(store: &dyn ConfigStore) -> Result<String, StoreError> {
    store.get("data_directory")
}

/// Persist every non-blacklisted setting, in lexicographic key order.
///
/// A blacklisted key is logged as skipped. A failed `set` is logged as
/// an error and the remaining keys are still applied; a partial failure
/// does not fail the run.
pub fn apply_settings(
    store: &dyn ConfigStore,
    output: &TuningOutput,
    blacklist: &BTreeSet<String>,
) {
    for (key, value) in output {
        if blacklist.contains(key) {
            info!(key = %key, "blacklisted and will not be changed");
            continue;
        }
        let rendered = format_setting(value);
        info!(key = %key, value = %rendered, "set");
        if let Err(err) = store.set(key, &rendered) {
            error!(key = %key, value = %rendered, %err, "error while setting");
        }
    }
}

fn chomp(s: &str) -> &str {
    s.strip_suffix("\r\n")
        .or_else(|| s.strip_suffix('\n'))
        .unwrap_or(s)
}

/// In-memory store recording every `set` call in order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RefCell<BTreeMap<String, String>>,
    sets: RefCell<Vec<(String, String)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a value as if it were already present in the configuration.
    pub fn preset(&self, key: &str, value: &str) {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    /// All `set` calls in the order they were made.
    pub fn set_calls(&self) -> Vec<(String, String)> {
        self.sets.borrow().clone()
    }
}

impl ConfigStore for MemoryStore {
    fn get(&self, key: &str) -> Result<String, StoreError> {
        self.values
            .borrow()
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::Missing(key.to_string()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.sets
            .borrow_mut()
            .push((key.to_string(), value.to_string()));
        Ok(())
    }
}
