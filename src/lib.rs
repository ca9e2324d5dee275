//! Assigns a roster to a fixed number of groups over several rounds.
//!
//! Simulated annealing swaps members between groups of the same round,
//! trading off section/project conflicts, seniority spread, carry-over
//! between rounds and repeated pairings. See [`anneal::assign`].

pub mod action;
pub mod anneal;
pub mod cache;
pub mod error;
pub mod init;
pub mod model;
pub mod penalty;
pub mod relation;
pub mod result;

pub use anneal::{assign, assign_with_cancel, AnnealConfig, Progress, ProgressObserver, ShuffleOutcome, Silent};
pub use error::ShuffleError;
pub use model::entity::Person;
pub use model::group::{GroupResult, GroupSlot, RoundResult};
