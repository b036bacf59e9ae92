//! Amdahl's-law timing model
//!
//! Splits a workload of `work_seconds` into a serial part that a single
//! worker must perform and a parallel part shared evenly by `N` workers:
//!
//! ```text
//! serial   = w * (1 - p)
//! parallel = w * p / N
//! speedup  = 1 / ((1 - p) + p / N)
//! ```
//!
//! Everything here is pure and deterministic; validation happens once at
//! [`RunConfig`] construction, after which computing a [`Timing`] cannot
//! fail.

use thiserror::Error;

/// Errors for run configuration validation
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("work seconds must be a positive integer, got {0}")]
    NonPositiveWork(u64),

    #[error("parallel proportion must be within (0, 1], got {0}")]
    ProportionOutOfRange(f64),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Validated input for a single simulated run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunConfig {
    work_seconds: u64,
    parallel_proportion: f64,
}

impl RunConfig {
    /// Validate and construct a run configuration.
    ///
    /// `work_seconds` must be positive and `parallel_proportion` must lie
    /// in `(0, 1]`.
    pub fn new(work_seconds: u64, parallel_proportion: f64) -> Result<Self> {
        if work_seconds == 0 {
            return Err(ConfigError::NonPositiveWork(work_seconds));
        }
        if !(parallel_proportion > 0.0 && parallel_proportion <= 1.0) {
            return Err(ConfigError::ProportionOutOfRange(parallel_proportion));
        }
        Ok(Self {
            work_seconds,
            parallel_proportion,
        })
    }

    pub fn work_seconds(&self) -> u64 {
        self.work_seconds
    }

    pub fn parallel_proportion(&self) -> f64 {
        self.parallel_proportion
    }
}

/// Per-run timing split derived from a [`RunConfig`] and a worker count
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timing {
    /// Seconds of work only one worker performs
    pub serial_seconds: f64,
    /// Seconds of work each of the N workers performs concurrently
    pub parallel_seconds: f64,
    /// Amdahl's-law predicted speedup over a single worker
    pub theoretical_speedup: f64,
}

impl Timing {
    /// Compute the timing split for `workers` cooperating workers.
    ///
    /// `workers >= 1` is guaranteed by the participant group.
    pub fn compute(config: &RunConfig, workers: usize) -> Self {
        debug_assert!(workers >= 1, "worker count must be at least 1");
        let work = config.work_seconds() as f64;
        let p = config.parallel_proportion();
        let n = workers as f64;
        Self {
            serial_seconds: work * (1.0 - p),
            parallel_seconds: work * p / n,
            theoretical_speedup: 1.0 / ((1.0 - p) + p / n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero_work_seconds() {
        assert_eq!(
            RunConfig::new(0, 0.8),
            Err(ConfigError::NonPositiveWork(0))
        );
    }

    #[test]
    fn test_rejects_proportion_above_one() {
        assert_eq!(
            RunConfig::new(30, 1.5),
            Err(ConfigError::ProportionOutOfRange(1.5))
        );
    }

    #[test]
    fn test_rejects_zero_and_negative_proportion() {
        assert!(RunConfig::new(30, 0.0).is_err());
        assert!(RunConfig::new(30, -0.2).is_err());
    }

    #[test]
    fn test_rejects_nan_proportion() {
        assert!(RunConfig::new(30, f64::NAN).is_err());
    }

    #[test]
    fn test_accepts_fully_parallel_proportion() {
        assert!(RunConfig::new(30, 1.0).is_ok());
    }

    #[test]
    fn test_reference_scenario_four_workers() {
        // w=30, p=0.8, N=4: serial 6.0, parallel 6.0, speedup 1/(0.2+0.2)
        let config = RunConfig::new(30, 0.8).unwrap();
        let timing = Timing::compute(&config, 4);
        assert!((timing.serial_seconds - 6.0).abs() < 1e-9);
        assert!((timing.parallel_seconds - 6.0).abs() < 1e-9);
        assert!((timing.theoretical_speedup - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_single_worker_has_unit_speedup() {
        let config = RunConfig::new(30, 0.8).unwrap();
        let timing = Timing::compute(&config, 1);
        assert!((timing.parallel_seconds - 24.0).abs() < 1e-9);
        assert!((timing.theoretical_speedup - 1.0).abs() < 1e-9);
        assert!((timing.serial_seconds + timing.parallel_seconds - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_total_work_is_conserved() {
        // serial + N * parallel must equal the configured work for any N
        let config = RunConfig::new(30, 0.8).unwrap();
        for workers in [1, 2, 3, 4, 7, 16, 1000] {
            let timing = Timing::compute(&config, workers);
            let total = timing.serial_seconds + workers as f64 * timing.parallel_seconds;
            assert!((total - 30.0).abs() < 1e-6, "not conserved for N={workers}");
        }
    }

    #[test]
    fn test_speedup_monotonic_in_workers() {
        let config = RunConfig::new(30, 0.8).unwrap();
        let mut previous = 0.0;
        for workers in 1..=64 {
            let speedup = Timing::compute(&config, workers).theoretical_speedup;
            assert!(speedup >= previous - 1e-12);
            previous = speedup;
        }
        // converges towards 1/(1-p) = 5.0 from below
        assert!(previous < 5.0);
        assert!(Timing::compute(&config, 1_000_000).theoretical_speedup > 4.99);
    }

    #[test]
    fn test_fully_parallel_speedup_equals_worker_count() {
        let config = RunConfig::new(10, 1.0).unwrap();
        for workers in [1, 2, 8, 33] {
            let speedup = Timing::compute(&config, workers).theoretical_speedup;
            assert!((speedup - workers as f64).abs() < 1e-9);
        }
    }

    #[test]
    fn test_compute_is_deterministic() {
        let config = RunConfig::new(17, 0.63).unwrap();
        assert_eq!(Timing::compute(&config, 5), Timing::compute(&config, 5));
    }
}
