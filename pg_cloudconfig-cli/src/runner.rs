//! Run orchestration: probe, benchmark, tune, persist.
//!
//! Execution is single-threaded and sequential; the only suspension
//! points are the benchmark's batch pause and the blocking I/O itself.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use pg_cloudconfig::conftool::{self, ConfigStore, PgConftool};
use pg_cloudconfig::logging::init_logging;
use pg_cloudconfig::system::SystemInfo;
use pg_cloudconfig::tuning::{self, TuningInput, SUPPORTED_VERSIONS};
use pg_cloudconfig::{bench, VERSION};

use crate::error::CliError;
use crate::Args;

/// Scratch file name used for the write benchmark, created inside the
/// cluster's data directory so the measurement hits the same volume.
const SCRATCH_FILE: &str = "~write_test.dat";

pub fn run(args: Args) -> Result<(), CliError> {
    init_logging(args.debug, args.quiet).map_err(|e| CliError::LoggingInit(e.to_string()))?;
    debug!("pg_cloudconfig {}", VERSION);

    // Reject unsupported versions before any benchmark or write happens.
    if !SUPPORTED_VERSIONS.contains(&args.pg_version.as_str()) {
        return Err(CliError::UnsupportedVersion(args.pg_version));
    }

    let conf_dir = args.pg_conf_dir.clone().unwrap_or_else(|| {
        PathBuf::from("/etc/postgresql")
            .join(&args.pg_version)
            .join(&args.pg_clustername)
    });
    let conf = conf_dir.join("postgresql.conf");

    info!(
        "Cluster to tune: {}/{}",
        args.pg_version, args.pg_clustername
    );
    info!("conf_dir: {}", conf_dir.display());

    if !conf_dir.is_dir() {
        return Err(CliError::ConfDir {
            dir: conf_dir,
            version: args.pg_version,
            cluster: args.pg_clustername,
        });
    }

    check_conf_writable(&conf)?;

    conftool::check_available().map_err(CliError::Tool)?;

    let store = PgConftool::new(&args.pg_version, &args.pg_clustername, &conf);
    let data_directory = conftool::data_directory(&store).map_err(CliError::Store)?;
    info!("data_directory: {}", data_directory);

    info!("Start write_bench...");
    let scratch = Path::new(&data_directory).join(SCRATCH_FILE);
    let disk_speed = bench::write_bench(&scratch).map_err(CliError::Bench)?;
    info!("Disk was benched as: {} (slow|medium|fast)", disk_speed);

    let system = SystemInfo::detect();
    debug!(
        cpu_count = system.cpu_count,
        total_memory_mb = system.total_memory.to_mb(),
        "detected system"
    );

    let max_connections = resolve_max_connections(&args, &store)?;
    debug!(max_connections, "resolved max_connections");

    let input = TuningInput {
        server_version: args.pg_version.clone(),
        max_connections,
        disk_speed,
        blacklist: args.blacklist.iter().cloned().collect(),
    };

    info!("Calculate settings...");
    let output = tuning::tune(&input, &system, !args.dynamic_only).map_err(CliError::Tune)?;
    debug!(?output, "calculated settings");

    info!("Persist settings using pg_conftool...");
    conftool::apply_settings(&store, &output, &input.blacklist);

    Ok(())
}

/// Use the explicit override when given, otherwise read the value
/// already present in the configuration. The engine never computes it.
fn resolve_max_connections(args: &Args, store: &dyn ConfigStore) -> Result<u32, CliError> {
    if let Some(n) = args.max_connections {
        return Ok(n);
    }
    let raw = store.get("max_connections").map_err(CliError::Store)?;
    raw.trim()
        .parse()
        .map_err(|_| CliError::MaxConnections(raw))
}

/// The persist loop tolerates per-key failures, so an unopenable
/// configuration file must be caught up front as a fatal condition.
fn check_conf_writable(conf: &Path) -> Result<(), CliError> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .open(conf)
        .map_err(|error| CliError::ConfFile {
            path: conf.to_path_buf(),
            error,
        })?;
    Ok(())
}
