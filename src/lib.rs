//! Amdahl - an Amdahl's-law illustrator with simulated work
//!
//! Amdahl's law posits that some unit of work comprises a proportion *p*
//! that benefits from parallel resources and a proportion *s* = 1 - *p*
//! constrained to execute in serial. The theoretical maximum speedup for
//! such a workload on *N* workers is
//!
//! ```text
//!            1
//!     S = -------
//!         s + p/N
//! ```
//!
//! A plot of *S* vs. *N* looks like this for *p* = 0.8, with the dotted
//! line showing ideal scaling (*p* = 1, *S* = *N*):
//!
//! ```text
//!   5┬─────────────────────────────────────·──────────────────┐
//!    │                                   ·                    │
//!    │                                 ·                      │
//!    │                               ·                        │
//!   4┤                             ·                          │
//!    │                           ·                            │
//! S  │                         ·                              *
//! p  │                       ·                   *      *     │
//! e  │                     ·               *                  │
//! e 3┤                   ·           *                        │
//! d  │                 ·      *                               │
//! u  │               ·  *                                     │
//! p  │             ·                                          │
//!    │           ·*                                           │
//!   2┤         ·                                              │
//!    │     * ·                                                │
//!    │     ·                                                  │
//!    │   ·                                                    │
//!    │ ·                                                      │
//!   1*─────┬──────┬─────┬─────┬──────┬─────┬─────┬──────┬─────┤
//!    1     2      3     4     5      6     7     8      9     10
//!                              Workers
//! ```
//!
//! There is a speed limit for every workload and diminishing returns on
//! throwing more parallel workers at a problem. This crate demonstrates
//! it empirically: the workload is faked with timed waits, split into a
//! serial phase only the coordinator performs and a parallel phase whose
//! duration shrinks as the worker count grows, coordinated through a
//! broadcast that doubles as a barrier.

pub mod cli;
pub mod driver;
pub mod group;
pub mod model;
pub mod simulator;
