//! Whole-group run orchestration
//!
//! Spawns one scoped thread per group member, hands rank 0 the
//! coordinator role and the validated configuration, and joins everyone.
//! Any member error (or panic) fails the entire run: a partially
//! completed group has no meaningful speedup measurement.
//!
//! Configuration is validated before this module is reached, so an
//! invalid config aborts the process before any participant exists —
//! nobody can be left blocking on a broadcast that will never happen.

use crate::group::{ParticipantGroup, ThreadGroup, DEFAULT_TIMEOUT};
use crate::model::{RunConfig, Timing};
use crate::simulator::{self, Clock, Reporter, Role, SimError, StdoutReporter, SystemClock};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

/// Errors for a whole-group run
#[derive(Error, Debug)]
pub enum DriverError {
    #[error(transparent)]
    Sim(#[from] SimError),

    #[error("a worker thread panicked")]
    WorkerPanicked,
}

pub type Result<T> = std::result::Result<T, DriverError>;

/// Outcome of a completed run.
#[derive(Debug, Clone, Copy)]
pub struct RunReport {
    /// Wall-clock duration of the run itself (group setup to last join).
    pub elapsed: Duration,
    /// Timing split the coordinator computed for this run.
    pub timing: Timing,
}

/// Run the simulated workload across `workers` cooperating workers.
pub fn run_simulation(config: RunConfig, workers: usize) -> Result<RunReport> {
    run_simulation_with(config, workers, &SystemClock, &StdoutReporter)
}

/// Non-coordinators enter the broadcast while the coordinator is still
/// in its serial phase, which can legitimately run the full configured
/// work time. The collective wait must outlast that phase, so only a
/// genuinely absent member can trip it.
fn collective_timeout(config: &RunConfig) -> Duration {
    DEFAULT_TIMEOUT + Duration::from_secs(config.work_seconds())
}

/// [`run_simulation`] with injected wall-clock and report collaborators.
pub fn run_simulation_with<C, R>(
    config: RunConfig,
    workers: usize,
    clock: &C,
    reporter: &R,
) -> Result<RunReport>
where
    C: Clock + Sync,
    R: Reporter + Sync,
{
    let start = Instant::now();
    debug!(workers, "starting simulation");
    let members = ThreadGroup::create_with_timeout(workers, collective_timeout(&config));

    let results = crossbeam::thread::scope(|scope| {
        let handles: Vec<_> = members
            .into_iter()
            .map(|member| {
                let role = if member.rank() == 0 {
                    Role::Coordinator(config)
                } else {
                    Role::Participant
                };
                scope
                    .spawn(move |_| simulator::run(role, &member, clock, reporter))
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join())
            .collect::<Vec<_>>()
    })
    .map_err(|_| DriverError::WorkerPanicked)?;

    let mut timing = None;
    for result in results {
        match result {
            Ok(Ok(Some(coordinator_timing))) => timing = Some(coordinator_timing),
            Ok(Ok(None)) => {}
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => return Err(DriverError::WorkerPanicked),
        }
    }
    // Rank 0 always runs as coordinator, so a fully joined run has timing.
    let timing = timing.expect("coordinator produced no timing");

    let report = RunReport {
        elapsed: start.elapsed(),
        timing,
    };
    debug!(elapsed = ?report.elapsed, "simulation complete");
    Ok(report)
}
