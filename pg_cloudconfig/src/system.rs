//! Host memory and CPU detection.
//!
//! # Platform Support
//!
//! - **Linux**: parses `/proc/meminfo`
//! - **Other platforms**: falls back to 8 GiB

use crate::units::Quantity;

/// Snapshot of the facts the sizing engine needs, taken once per run.
#[derive(Debug, Clone, Copy)]
pub struct SystemInfo {
    /// Total host memory
    pub total_memory: Quantity,
    /// Number of logical CPU cores
    pub cpu_count: usize,
}

impl SystemInfo {
    pub fn detect() -> Self {
        Self {
            total_memory: detect_total_memory(),
            cpu_count: detect_cpu_count(),
        }
    }
}

/// Detect the number of logical CPU cores.
///
/// Falls back to 4 if detection fails.
pub fn detect_cpu_count() -> usize {
    std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(4)
}

/// Detect total host memory.
#[cfg(target_os = "linux")]
pub fn detect_total_memory() -> Quantity {
    use std::fs;

    // Format: "MemTotal:       16384000 kB"
    if let Ok(content) = fs::read_to_string("/proc/meminfo") {
        for line in content.lines() {
            if line.starts_with("MemTotal:") {
                let parts: Vec<&str> = line.split_whitespace().collect();
                if parts.len() >= 2 {
                    if let Ok(kb) = parts[1].parse::<u64>() {
                        return Quantity::from_kb(kb as f64);
                    }
                }
            }
        }
    }

    fallback_memory()
}

#[cfg(not(target_os = "linux"))]
pub fn detect_total_memory() -> Quantity {
    fallback_memory()
}

/// Fallback memory value when detection fails.
fn fallback_memory() -> Quantity {
    Quantity::from_gb(8.0)
}
