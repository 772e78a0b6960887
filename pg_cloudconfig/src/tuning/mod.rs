//! Sizing engine: maps system facts to configuration values.
//!
//! [`tune`] is the single entry point. It validates the server version
//! against the allow-list, then derives every setting through the pure
//! rule functions in [`rules`]. All inputs are explicit; nothing reads
//! ambient system state.

mod rules;

pub use rules::{
    autovacuum_max_workers, effective_cache_size, floor_pow2_mb, maintenance_work_mem,
    shared_buffers, superuser_reserved_connections, vacuum_cost_limit, work_mem,
};

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use crate::bench::SpeedTier;
use crate::system::SystemInfo;
use crate::units::Quantity;

/// PostgreSQL versions this tool knows how to tune.
pub const SUPPORTED_VERSIONS: &[&str] = &["9.6", "10"];

/// Engine failure. All variants are fatal for the run.
#[derive(Debug, Error)]
pub enum TuneError {
    #[error("server version '{0}' is not supported")]
    UnsupportedVersion(String),
    #[error("max_connections must be at least 1")]
    InvalidMaxConnections,
    #[error("cannot round a negative quantity ({megabytes} MB) down to a power of two")]
    NegativePow2Input { megabytes: f64 },
    #[error("effective_cache_size would be negative ({megabytes} MB); the inputs leave no memory for the OS cache")]
    NegativeCacheSize { megabytes: f64 },
}

/// A single computed configuration value.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingValue {
    /// A memory quantity, rendered as whole megabytes.
    Size(Quantity),
    Integer(i64),
    Float(f64),
    Text(String),
}

/// Inputs the engine needs beyond the system snapshot.
///
/// `max_connections` is resolved by the caller before tuning, either
/// from an explicit override or from the existing configuration; the
/// engine never computes it.
#[derive(Debug, Clone)]
pub struct TuningInput {
    pub server_version: String,
    pub max_connections: u32,
    pub disk_speed: SpeedTier,
    pub blacklist: BTreeSet<String>,
}

/// Computed settings keyed by name. `BTreeMap` gives the deterministic
/// lexicographic order the persistence step applies them in.
pub type TuningOutput = BTreeMap<String, SettingValue>;

/// Derive configuration values for the given input and system snapshot.
///
/// `include_static` additionally emits the fixed WAL/checkpoint group.
pub fn tune(
    input: &TuningInput,
    system: &SystemInfo,
    include_static: bool,
) -> Result<TuningOutput, TuneError> {
    if !SUPPORTED_VERSIONS.contains(&input.server_version.as_str()) {
        return Err(TuneError::UnsupportedVersion(input.server_version.clone()));
    }
    if input.max_connections == 0 {
        return Err(TuneError::InvalidMaxConnections);
    }

    let mut out = TuningOutput::new();

    if include_static {
        out.insert("wal_level".into(), SettingValue::Text("replica".into()));
        out.insert("checkpoint_timeout".into(), SettingValue::Text("15min".into()));
        out.insert("checkpoint_completion_target".into(), SettingValue::Float(0.8));
        out.insert("min_wal_size".into(), SettingValue::Text("128MB".into()));
        out.insert("max_wal_size".into(), SettingValue::Text("4GB".into()));
    }

    let total = system.total_memory;
    let sb = rules::shared_buffers(total)?;
    let mwm = rules::maintenance_work_mem(total)?;
    let wm = rules::work_mem(total, input.max_connections)?;
    let ecs = rules::effective_cache_size(
        total,
        sb,
        mwm,
        wm,
        input.max_connections,
        input.disk_speed,
    )?;

    out.insert("shared_buffers".into(), SettingValue::Size(sb));
    out.insert("maintenance_work_mem".into(), SettingValue::Size(mwm));
    out.insert("work_mem".into(), SettingValue::Size(wm));
    out.insert("effective_cache_size".into(), SettingValue::Size(ecs));
    out.insert(
        "superuser_reserved_connections".into(),
        SettingValue::Integer(rules::superuser_reserved_connections(input.max_connections) as i64),
    );
    out.insert(
        "autovacuum_max_workers".into(),
        SettingValue::Integer(rules::autovacuum_max_workers(system.cpu_count) as i64),
    );
    out.insert(
        "vacuum_cost_limit".into(),
        SettingValue::Integer(rules::vacuum_cost_limit(input.disk_speed) as i64),
    );

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(version: &str, max_connections: u32, disk_speed: SpeedTier) -> TuningInput {
        TuningInput {
            server_version: version.to_string(),
            max_connections,
            disk_speed,
            blacklist: BTreeSet::new(),
        }
    }

    fn system(total_mb: f64, cpu_count: usize) -> SystemInfo {
        SystemInfo {
            total_memory: Quantity::from_mb(total_mb),
            cpu_count,
        }
    }

    #[test]
    fn test_unsupported_version_is_rejected_before_computation() {
        let err = tune(&input("8.4", 100, SpeedTier::Fast), &system(4096.0, 8), true);
        assert!(matches!(err, Err(TuneError::UnsupportedVersion(v)) if v == "8.4"));
    }

    #[test]
    fn test_zero_max_connections_is_rejected() {
        let err = tune(&input("10", 0, SpeedTier::Medium), &system(4096.0, 8), true);
        assert!(matches!(err, Err(TuneError::InvalidMaxConnections)));
    }

    #[test]
    fn test_dynamic_settings_for_4gb_host() {
        let out = tune(&input("10", 100, SpeedTier::Medium), &system(4096.0, 8), false).unwrap();

        assert_eq!(
            out["shared_buffers"],
            SettingValue::Size(Quantity::from_mb(512.0))
        );
        assert_eq!(
            out["maintenance_work_mem"],
            SettingValue::Size(Quantity::from_mb(256.0))
        );
        assert_eq!(out["work_mem"], SettingValue::Size(Quantity::from_mb(8.0)));
        // 4096 - 512 - 256 - 8*100 = 2528
        assert_eq!(
            out["effective_cache_size"],
            SettingValue::Size(Quantity::from_mb(2528.0))
        );
        assert_eq!(out["superuser_reserved_connections"], SettingValue::Integer(5));
        assert_eq!(out["autovacuum_max_workers"], SettingValue::Integer(3));
        assert_eq!(out["vacuum_cost_limit"], SettingValue::Integer(600));
    }

    #[test]
    fn test_static_group_toggles() {
        let sys = system(4096.0, 8);
        let with_static = tune(&input("9.6", 100, SpeedTier::Slow), &sys, true).unwrap();
        let dynamic_only = tune(&input("9.6", 100, SpeedTier::Slow), &sys, false).unwrap();

        for key in [
            "wal_level",
            "checkpoint_timeout",
            "checkpoint_completion_target",
            "min_wal_size",
            "max_wal_size",
        ] {
            assert!(with_static.contains_key(key), "missing {key}");
            assert!(!dynamic_only.contains_key(key), "unexpected {key}");
        }

        assert_eq!(with_static["wal_level"], SettingValue::Text("replica".into()));
        assert_eq!(with_static["checkpoint_timeout"], SettingValue::Text("15min".into()));
        assert_eq!(
            with_static["checkpoint_completion_target"],
            SettingValue::Float(0.8)
        );
        assert_eq!(with_static["min_wal_size"], SettingValue::Text("128MB".into()));
        assert_eq!(with_static["max_wal_size"], SettingValue::Text("4GB".into()));
    }

    #[test]
    fn test_output_iterates_in_lexicographic_order() {
        let out = tune(&input("10", 100, SpeedTier::Fast), &system(8192.0, 16), true).unwrap();

        let keys: Vec<&String> = out.keys().collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        assert_eq!(out.len(), 12);
    }
}
