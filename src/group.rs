//! Participant group with a broadcast-as-barrier collective
//!
//! A group is a fixed set of workers, each identified by a rank in
//! `[0, size)`. The only collective primitive is [`ParticipantGroup::broadcast`]:
//! one root supplies a value, every member (root included) receives the
//! identical value, and nobody's call returns before every member has
//! entered it.
//!
//! # Design
//!
//! The in-process implementation wires members with crossbeam channels
//! as a gather-then-scatter rendezvous:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ member r (r != root)                                         │
//! │   arrival_tx.send(Arrival { rank: r, root })                 │
//! │   value = delivery_rx.recv_timeout(..)   // blocks           │
//! └──────────────────────────────────────────────────────────────┘
//!                          │ fan-in (shared arrival channel)
//!                          ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │ root                                                         │
//! │   for _ in 1..size { arrival_rx.recv_timeout(..) }           │
//! │   for r != root    { delivery_tx[r].send(value) }            │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The root releases nobody until all `size - 1` arrivals are in, which
//! is what makes the broadcast double as a barrier. Unlike the MPI
//! collective it stands in for, every blocking step is bounded by a
//! timeout, so a member that never shows up fails the run with
//! [`GroupError::Timeout`] instead of hanging the group forever.

use crossbeam::channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;
use thiserror::Error;
use tracing::trace;

/// Default bound on how long any member waits inside a collective.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Protocol errors for collective operations
#[derive(Error, Debug)]
pub enum GroupError {
    /// A member never entered the collective within the timeout.
    #[error("broadcast timed out on rank {rank} after {waited:?}: not all participants entered the collective")]
    Timeout { rank: usize, waited: Duration },

    /// Members disagree on who the broadcast root is.
    #[error("broadcast rank mismatch: rank {caller} named rank {caller_root} as root, but rank {expected_root} is collecting")]
    RankMismatch {
        caller: usize,
        caller_root: usize,
        expected_root: usize,
    },

    /// The root was called without a value to distribute.
    #[error("broadcast root (rank {rank}) supplied no value")]
    MissingValue { rank: usize },

    /// A non-root member supplied a value it has no business sending.
    #[error("rank {rank} is not the broadcast root but supplied a value")]
    UnexpectedValue { rank: usize },

    /// The named root is outside the group.
    #[error("broadcast root {root} is out of range for group of size {size}")]
    InvalidRoot { root: usize, size: usize },

    /// A peer's channel endpoint was dropped mid-collective.
    #[error("rank {rank} lost contact with the group (peer endpoint dropped)")]
    Disconnected { rank: usize },
}

pub type Result<T> = std::result::Result<T, GroupError>;

/// A fixed set of cooperating workers exposing one collective primitive.
pub trait ParticipantGroup {
    /// Number of members in the group, at least 1.
    fn size(&self) -> usize;

    /// This member's rank in `[0, size)`. Rank 0 is the coordinator.
    fn rank(&self) -> usize;

    /// Host label for reporting; no effect on the protocol.
    fn name(&self) -> &str;

    /// Distribute one value from `from_rank` to every member.
    ///
    /// Every member must call this exactly once per run with the same
    /// `from_rank`; only `from_rank` supplies `Some(value)`. All callers
    /// receive the root's value, and no call returns before every member
    /// has entered the collective.
    fn broadcast(&self, value: Option<f64>, from_rank: usize) -> Result<f64>;
}

struct Arrival {
    rank: usize,
    root: usize,
}

/// One member's handle into an in-process [`ThreadGroup`].
pub struct ThreadGroupMember {
    rank: usize,
    size: usize,
    name: String,
    timeout: Duration,
    arrival_tx: Sender<Arrival>,
    arrival_rx: Receiver<Arrival>,
    delivery_rx: Receiver<f64>,
    delivery_txs: Vec<Sender<f64>>,
}

/// Constructor for channel-wired in-process groups.
///
/// Handles are created up front and moved into worker threads; there is
/// no ambient global communicator.
pub struct ThreadGroup;

impl ThreadGroup {
    /// Create the member handles for a group of `size` workers.
    ///
    /// # Panics
    ///
    /// Panics if `size` is 0.
    pub fn create(size: usize) -> Vec<ThreadGroupMember> {
        Self::create_with_timeout(size, DEFAULT_TIMEOUT)
    }

    /// Same as [`ThreadGroup::create`] with an explicit collective timeout.
    pub fn create_with_timeout(size: usize, timeout: Duration) -> Vec<ThreadGroupMember> {
        assert!(size >= 1, "participant group must have at least one member");
        let name = local_hostname();
        let (arrival_tx, arrival_rx) = unbounded();
        let (delivery_txs, delivery_rxs): (Vec<_>, Vec<_>) = (0..size).map(|_| bounded(1)).unzip();
        delivery_rxs
            .into_iter()
            .enumerate()
            .map(|(rank, delivery_rx)| ThreadGroupMember {
                rank,
                size,
                name: name.clone(),
                timeout,
                arrival_tx: arrival_tx.clone(),
                arrival_rx: arrival_rx.clone(),
                delivery_rx,
                delivery_txs: delivery_txs.clone(),
            })
            .collect()
    }
}

impl ParticipantGroup for ThreadGroupMember {
    fn size(&self) -> usize {
        self.size
    }

    fn rank(&self) -> usize {
        self.rank
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn broadcast(&self, value: Option<f64>, from_rank: usize) -> Result<f64> {
        if from_rank >= self.size {
            return Err(GroupError::InvalidRoot {
                root: from_rank,
                size: self.size,
            });
        }
        trace!(rank = self.rank, from_rank, "entering broadcast");
        if self.rank == from_rank {
            let value = value.ok_or(GroupError::MissingValue { rank: self.rank })?;
            // Gather: wait for every other member to arrive.
            for _ in 1..self.size {
                let arrival = self
                    .arrival_rx
                    .recv_timeout(self.timeout)
                    .map_err(|e| self.recv_error(e))?;
                if arrival.root != from_rank {
                    return Err(GroupError::RankMismatch {
                        caller: arrival.rank,
                        caller_root: arrival.root,
                        expected_root: from_rank,
                    });
                }
                trace!(rank = self.rank, arrived = arrival.rank, "arrival collected");
            }
            // Scatter: everyone is in, release them with the value.
            for (rank, delivery_tx) in self.delivery_txs.iter().enumerate() {
                if rank != self.rank {
                    delivery_tx
                        .send(value)
                        .map_err(|_| GroupError::Disconnected { rank: self.rank })?;
                }
            }
            trace!(rank = self.rank, value, "broadcast complete");
            Ok(value)
        } else {
            if value.is_some() {
                return Err(GroupError::UnexpectedValue { rank: self.rank });
            }
            self.arrival_tx
                .send(Arrival {
                    rank: self.rank,
                    root: from_rank,
                })
                .map_err(|_| GroupError::Disconnected { rank: self.rank })?;
            let value = self
                .delivery_rx
                .recv_timeout(self.timeout)
                .map_err(|e| self.recv_error(e))?;
            trace!(rank = self.rank, value, "broadcast received");
            Ok(value)
        }
    }
}

impl ThreadGroupMember {
    fn recv_error(&self, e: RecvTimeoutError) -> GroupError {
        match e {
            RecvTimeoutError::Timeout => GroupError::Timeout {
                rank: self.rank,
                waited: self.timeout,
            },
            RecvTimeoutError::Disconnected => GroupError::Disconnected { rank: self.rank },
        }
    }
}

fn local_hostname() -> String {
    nix::unistd::gethostname()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "localhost".to_string())
}
