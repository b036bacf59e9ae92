//! Simulated workload execution for one participant
//!
//! One run walks each participant through its timed phases. The
//! coordinator (rank 0) computes the [`Timing`] split, announces the run,
//! performs the serial wait, then feeds `parallel_seconds` into the group
//! broadcast; every participant — coordinator included — receives the
//! value from the broadcast and performs its parallel wait. The
//! coordinator's serial wait strictly precedes its broadcast entry, so no
//! participant can start its parallel phase before the serial phase has
//! elapsed.
//!
//! The asymmetry between rank 0 and everyone else is carried by [`Role`]
//! rather than scattered rank comparisons; handing the wrong role to a
//! rank is reported as an error instead of producing an undefined run.

use crate::group::{GroupError, ParticipantGroup};
use crate::model::{RunConfig, Timing};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

/// Errors for a single participant's run
#[derive(Error, Debug)]
pub enum SimError {
    #[error("rank {rank} cannot act as coordinator; only rank 0 may")]
    NotCoordinator { rank: usize },

    #[error("rank 0 must run as coordinator, but was given the participant role")]
    CoordinatorRequired,

    #[error(transparent)]
    Group(#[from] GroupError),
}

pub type Result<T> = std::result::Result<T, SimError>;

/// Which side of the run asymmetry a participant executes.
///
/// Only the coordinator holds a [`RunConfig`]; non-coordinator
/// participants have no access to configuration and learn their parallel
/// duration from the broadcast alone.
#[derive(Debug, Clone, Copy)]
pub enum Role {
    Coordinator(RunConfig),
    Participant,
}

/// Wall-clock collaborator: "now" plus a blocking wait.
pub trait Clock {
    fn now(&self) -> Instant;
    fn wait(&self, duration: Duration);
}

/// Real time via `std::thread::sleep`.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn wait(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Line-oriented report sink. Format is free text, not a stability
/// contract.
pub trait Reporter {
    fn line(&self, text: &str);
}

/// Reports to stdout.
pub struct StdoutReporter;

impl Reporter for StdoutReporter {
    fn line(&self, text: &str) {
        println!("{text}");
    }
}

/// Execute one participant's run.
///
/// Returns the computed [`Timing`] on the coordinator and `None` on
/// every other participant.
pub fn run<G: ParticipantGroup>(
    role: Role,
    group: &G,
    clock: &dyn Clock,
    reporter: &dyn Reporter,
) -> Result<Option<Timing>> {
    let rank = group.rank();
    let size = group.size();
    let name = group.name();

    let timing = match role {
        Role::Coordinator(config) => {
            if rank != 0 {
                return Err(SimError::NotCoordinator { rank });
            }
            let timing = Timing::compute(&config, size);
            debug!(?timing, size, "coordinator computed timing");
            let work = config.work_seconds() as f64;
            let suffix = if size == 1 { "" } else { "s" };
            reporter.line(&format!(
                "Doing {work:.6} seconds of 'work' on {size} processor{suffix},"
            ));
            reporter.line(&format!(
                " which should take {:.6} seconds with {:.6} parallel proportion of the workload.",
                work / timing.theoretical_speedup,
                config.parallel_proportion()
            ));
            reporter.line("");
            reporter.line(&format!(
                "  Hello, World! I am process {rank} of {size} on {name}. \
                 I will do all the serial 'work' for {:.6} seconds.",
                timing.serial_seconds
            ));
            clock.wait(Duration::from_secs_f64(timing.serial_seconds));
            debug!(rank, "serial phase complete");
            Some(timing)
        }
        Role::Participant => {
            if rank == 0 {
                return Err(SimError::CoordinatorRequired);
            }
            None
        }
    };

    // Doubles as the barrier between the serial and parallel phases.
    let parallel_seconds = group.broadcast(timing.map(|t| t.parallel_seconds), 0)?;

    reporter.line(&format!(
        "  Hello, World! I am process {rank} of {size} on {name}. \
         I will do parallel 'work' for {parallel_seconds:.6} seconds."
    ));
    clock.wait(Duration::from_secs_f64(parallel_seconds));
    debug!(rank, "parallel phase complete");

    Ok(timing)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::{Clock, Reporter};
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    /// Records requested waits instead of sleeping.
    #[derive(Clone, Default)]
    pub struct RecordingClock {
        waits: Arc<Mutex<Vec<f64>>>,
    }

    impl RecordingClock {
        pub fn waits(&self) -> Vec<f64> {
            self.waits.lock().unwrap().clone()
        }
    }

    impl Clock for RecordingClock {
        fn now(&self) -> Instant {
            Instant::now()
        }

        fn wait(&self, duration: Duration) {
            self.waits.lock().unwrap().push(duration.as_secs_f64());
        }
    }

    /// Captures report lines in memory.
    #[derive(Clone, Default)]
    pub struct MemoryReporter {
        lines: Arc<Mutex<Vec<String>>>,
    }

    impl MemoryReporter {
        pub fn lines(&self) -> Vec<String> {
            self.lines.lock().unwrap().clone()
        }
    }

    impl Reporter for MemoryReporter {
        fn line(&self, text: &str) {
            self.lines.lock().unwrap().push(text.to_string());
        }
    }
}
