//! pg_cloudconfig - optimized PostgreSQL defaults for virtual environments.
//!
//! Derives resource-aware default configuration values for a PostgreSQL
//! cluster from three observed inputs (total host memory, CPU core
//! count, measured storage write throughput) and applies them through
//! `pg_conftool`. This does not tune for any specific workload; it only
//! sets sensible defaults from a few input variables and simple rules.
//!
//! # High-Level Flow
//!
//! ```ignore
//! use pg_cloudconfig::{bench, conftool, system, tuning};
//!
//! let system = system::SystemInfo::detect();
//! let disk_speed = bench::write_bench(scratch_path)?;
//! let output = tuning::tune(&input, &system, true)?;
//! conftool::apply_settings(&store, &output, &input.blacklist);
//! ```

pub mod bench;
pub mod conftool;
pub mod format;
pub mod logging;
pub mod system;
pub mod tuning;
pub mod units;

/// Version of the pg_cloudconfig library and CLI.
///
/// This is synchronized across all components in the workspace.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
