//! Storage write benchmark.
//!
//! Measures sustained write throughput against a scratch file on the
//! cluster's data volume and classifies it into a coarse speed tier.
//! Two sleep-separated batches of timed writes reduce the weight of a
//! single transient I/O spike. This is a heuristic, not a rigorous
//! benchmark; the thresholds deliberately err toward the slower tier.

use std::fmt;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::debug;

/// Trials per batch; the full benchmark runs two batches.
pub const TRIALS_PER_BATCH: usize = 5;

/// Bytes written per trial (16 MiB).
pub const PAYLOAD_SIZE: usize = 16 * 1024 * 1024;

/// Pause between the two batches.
const BATCH_PAUSE: Duration = Duration::from_secs(1);

/// Below this median or mean throughput (MB/s) storage is Slow.
const SLOW_BELOW_MBS: f64 = 128.0;

/// Below this median or mean throughput (MB/s) storage is Medium.
const MEDIUM_BELOW_MBS: f64 = 256.0;

/// Repeated to fill the write payload. Mixed-case text with digits and
/// punctuation so the payload does not compress to nothing on
/// filesystems with transparent compression.
const PAYLOAD_PATTERN: &str =
    "kX3vQ9rLb7TzJ1mDq5wF8hSnY2cG6pA4uE0iR!xW#oZ$tM%jB&fC?dN/yH=gV+sK";

/// Classification of storage write performance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedTier {
    Slow,
    Medium,
    Fast,
}

impl SpeedTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpeedTier::Slow => "slow",
            SpeedTier::Medium => "medium",
            SpeedTier::Fast => "fast",
        }
    }
}

impl fmt::Display for SpeedTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Benchmark failure. Any inability to write the scratch file is fatal
/// for the whole run; there is no fallback tier.
#[derive(Debug, Error)]
pub enum BenchError {
    #[error("unable to write benchmark scratch file '{path}': {source}")]
    ScratchWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Removes the scratch file when dropped, so no exit path of a
/// measurement can leave it behind.
struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

/// Run `trial_count` timed writes of `payload_size` bytes against `path`
/// and return the throughput of each trial in MB/s.
///
/// The path must live on the same volume as the server's data directory
/// for the result to be representative.
pub fn measure(
    path: &Path,
    trial_count: usize,
    payload_size: usize,
) -> Result<Vec<f64>, BenchError> {
    let payload = payload(payload_size);
    let payload_mb = payload_size as f64 / (1024.0 * 1024.0);
    let _scratch = ScratchFile::new(path);

    let mut samples = Vec::with_capacity(trial_count);
    for trial in 0..trial_count {
        let start = Instant::now();
        write_once(path, &payload).map_err(|source| BenchError::ScratchWrite {
            path: path.to_path_buf(),
            source,
        })?;
        let elapsed = start.elapsed().as_secs_f64();
        let throughput = payload_mb / elapsed;
        debug!(trial, throughput_mbs = throughput, "write trial finished");
        samples.push(throughput);
    }
    Ok(samples)
}

/// Estimate the write performance of the volume holding `path`.
///
/// Runs two batches of [`TRIALS_PER_BATCH`] trials separated by a short
/// pause and classifies the concatenated samples.
pub fn write_bench(path: &Path) -> Result<SpeedTier, BenchError> {
    let mut samples = measure(path, TRIALS_PER_BATCH, PAYLOAD_SIZE)?;
    thread::sleep(BATCH_PAUSE);
    samples.extend(measure(path, TRIALS_PER_BATCH, PAYLOAD_SIZE)?);
    Ok(classify(&samples))
}

/// Classify throughput samples into a [`SpeedTier`].
///
/// Either the median or the mean falling below a threshold is enough to
/// downgrade the tier.
pub fn classify(samples: &[f64]) -> SpeedTier {
    if samples.is_empty() {
        return SpeedTier::Slow;
    }

    let med = median(samples);
    let mean = samples.iter().sum::<f64>() / samples.len() as f64;
    debug!(median_mbs = med, mean_mbs = mean, "benchmark statistics");

    if med < SLOW_BELOW_MBS || mean < SLOW_BELOW_MBS {
        SpeedTier::Slow
    } else if med < MEDIUM_BELOW_MBS || mean < MEDIUM_BELOW_MBS {
        SpeedTier::Medium
    } else {
        SpeedTier::Fast
    }
}

fn write_once(path: &Path, payload: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(payload)?;
    file.flush()?;
    file.sync_all()?;
    Ok(())
}

/// Deterministic text payload of exactly `len` bytes.
fn payload(len: usize) -> Vec<u8> {
    PAYLOAD_PATTERN.bytes().cycle().take(len).collect()
}

fn median(samples: &[f64]) -> f64 {
    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_payload_exact_length() {
        assert_eq!(payload(0).len(), 0);
        assert_eq!(payload(1000).len(), 1000);
        assert_eq!(payload(PAYLOAD_SIZE).len(), PAYLOAD_SIZE);
    }

    #[test]
    fn test_payload_is_deterministic() {
        assert_eq!(payload(4096), payload(4096));
    }

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
    }

    #[test]
    fn test_classify_slow() {
        // median ~66.5, mean ~66.5, both below 128
        let samples = [60.0, 70.0, 65.0, 68.0, 72.0, 64.0];
        assert_eq!(classify(&samples), SpeedTier::Slow);
    }

    #[test]
    fn test_classify_medium() {
        let samples = [200.0, 210.0, 190.0, 205.0];
        assert_eq!(classify(&samples), SpeedTier::Medium);
    }

    #[test]
    fn test_classify_fast() {
        let samples = [400.0, 380.0, 420.0, 390.0];
        assert_eq!(classify(&samples), SpeedTier::Fast);
    }

    #[test]
    fn test_classify_low_mean_downgrades() {
        // Median is comfortably fast but one stalled trial drags the
        // mean below the slow threshold.
        let samples = [300.0, 300.0, 300.0, 300.0, 1.0, 1.0, 1.0];
        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        assert!(mean < 128.0);
        assert_eq!(classify(&samples), SpeedTier::Slow);
    }

    #[test]
    fn test_classify_low_median_downgrades() {
        // Mean is inflated by one outlier; median stays below 256.
        let samples = [200.0, 200.0, 200.0, 10_000.0];
        assert_eq!(classify(&samples), SpeedTier::Medium);
    }

    #[test]
    fn test_classify_threshold_boundaries() {
        // Exactly at a threshold is not below it.
        assert_eq!(classify(&[128.0, 128.0]), SpeedTier::Medium);
        assert_eq!(classify(&[256.0, 256.0]), SpeedTier::Fast);
    }

    #[test]
    fn test_measure_returns_samples_and_cleans_up() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("~write_test.dat");

        let samples = measure(&path, 3, 64 * 1024).unwrap();

        assert_eq!(samples.len(), 3);
        assert!(samples.iter().all(|s| *s > 0.0));
        assert!(!path.exists(), "scratch file must not persist");
    }

    #[test]
    fn test_measure_failure_is_reported_and_leaves_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("~write_test.dat");

        let result = measure(&path, 3, 1024);

        assert!(result.is_err());
        assert!(!path.exists());
    }
}
