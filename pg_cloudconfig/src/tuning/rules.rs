//! Pure sizing rules, one function per setting.
//!
//! All memory-valued results are expressed in megabytes. Where a
//! setting benefits from power-of-two alignment the candidate is
//! rounded down with [`floor_pow2_mb`].

use crate::bench::SpeedTier;
use crate::units::Quantity;

use super::TuneError;

/// Round a quantity down to the nearest power-of-two megabyte value.
///
/// Candidates below one megabyte (including a fractional or zero
/// candidate from a division) clamp to 1 MB. A negative input is a
/// defect in the calling formula and is reported as an error.
pub fn floor_pow2_mb(quantity: Quantity) -> Result<Quantity, TuneError> {
    let mb = quantity.to_mb();
    if mb < 0.0 {
        return Err(TuneError::NegativePow2Input { megabytes: mb });
    }
    let mb = mb.max(1.0);
    let floored = 2f64.powi(mb.log2().floor() as i32);
    Ok(Quantity::from_mb(floored))
}

/// Memory reserved for the server's internal buffer cache.
///
/// One eighth of total memory, capped at 16 GB and floored to a power
/// of two; hosts below 1 GB get fixed small-memory tiers instead.
pub fn shared_buffers(total: Quantity) -> Result<Quantity, TuneError> {
    if total < Quantity::from_mb(256.0) {
        return Ok(Quantity::from_mb(16.0));
    }
    if total < Quantity::from_mb(512.0) {
        return Ok(Quantity::from_mb(64.0));
    }
    if total < Quantity::from_mb(1024.0) {
        return Ok(Quantity::from_mb(128.0));
    }

    let mut candidate = total / 8.0;
    let cap = Quantity::from_gb(16.0);
    if candidate > cap {
        candidate = cap;
    }
    floor_pow2_mb(candidate)
}

/// Memory budget for maintenance operations (vacuuming, index builds).
///
/// One sixteenth of total memory, capped at 8 GB, floored to a power of
/// two.
pub fn maintenance_work_mem(total: Quantity) -> Result<Quantity, TuneError> {
    let mut candidate = total / 16.0;
    let cap = Quantity::from_gb(8.0);
    if candidate > cap {
        candidate = cap;
    }
    floor_pow2_mb(candidate)
}

/// Per-operation memory budget for query execution.
pub fn work_mem(total: Quantity, max_connections: u32) -> Result<Quantity, TuneError> {
    if max_connections == 0 {
        return Err(TuneError::InvalidMaxConnections);
    }
    floor_pow2_mb((total / 5.0) / max_connections as f64)
}

/// Planner hint for memory available to the OS disk cache.
///
/// What remains of total memory after the buffer cache, maintenance
/// budget, and the per-connection work memory, scaled up by 1.5 on fast
/// storage and rounded to the nearest whole megabyte. A negative
/// remainder means the other settings already exceed physical memory,
/// which is reported rather than carried forward.
pub fn effective_cache_size(
    total: Quantity,
    shared_buffers: Quantity,
    maintenance_work_mem: Quantity,
    work_mem: Quantity,
    max_connections: u32,
    disk_speed: SpeedTier,
) -> Result<Quantity, TuneError> {
    let mut cache =
        total - shared_buffers - maintenance_work_mem - work_mem * max_connections as f64;
    if cache.to_mb() < 0.0 {
        return Err(TuneError::NegativeCacheSize {
            megabytes: cache.to_mb(),
        });
    }
    if disk_speed == SpeedTier::Fast {
        cache = cache * 1.5;
    }
    Ok(Quantity::from_mb(cache.to_mb().round()))
}

/// Connection slots reserved for administrative use.
pub fn superuser_reserved_connections(max_connections: u32) -> u32 {
    if max_connections <= 210 {
        5
    } else if max_connections >= 700 {
        10
    } else {
        7
    }
}

/// Concurrent background maintenance worker count.
pub fn autovacuum_max_workers(cpu_count: usize) -> u32 {
    if cpu_count >= 32 {
        5
    } else if cpu_count >= 16 {
        4
    } else {
        3
    }
}

/// Throttling budget for maintenance I/O.
pub fn vacuum_cost_limit(disk_speed: SpeedTier) -> u32 {
    match disk_speed {
        SpeedTier::Fast => 800,
        SpeedTier::Medium => 600,
        SpeedTier::Slow => 200,
    }
}
