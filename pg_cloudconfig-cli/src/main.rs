//! pg_cloudconfig CLI - optimized PostgreSQL defaults for virtual environments.
//!
//! This binary gathers system facts, benchmarks the data volume, and
//! applies the computed settings via `pg_conftool`.

mod error;
mod runner;

use std::path::PathBuf;

use clap::Parser;

/// Tool to set optimized defaults for PostgreSQL in virtual environments
/// (changes settings without asking for confirmation).
#[derive(Debug, Parser)]
#[command(name = "pg_cloudconfig")]
#[command(version = pg_cloudconfig::VERSION)]
#[command(after_help = "Should be run as the same user as PostgreSQL. \
pg_version and pg_clustername are used to choose a cluster; the Debian / \
postgresql-common naming and configuration schema is assumed. If that is \
not the case, --pg_conf_dir needs to be set. pg_conftool is used to \
get/set settings and is required. This does not tune PostgreSQL for any \
specific workload but only tries to set some optimized defaults based on \
a few input variables and simple rules.")]
pub struct Args {
    /// Version of the PostgreSQL cluster to tune
    pub pg_version: String,

    /// Name of the PostgreSQL cluster to tune
    pub pg_clustername: String,

    /// Set the max_connections explicitly if needed
    #[arg(long = "max_connections")]
    pub max_connections: Option<u32>,

    /// Path to dir holding the postgresql.conf (to override default)
    #[arg(long = "pg_conf_dir")]
    pub pg_conf_dir: Option<PathBuf>,

    /// Do not set static optimized defaults
    #[arg(long = "dynamic_only")]
    pub dynamic_only: bool,

    /// Settings not to touch
    #[arg(long, num_args = 1.., value_name = "SETTING")]
    pub blacklist: Vec<String>,

    /// Show debug messages
    #[arg(long)]
    pub debug: bool,

    /// Disable output
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = runner::run(args) {
        e.exit();
    }
}
