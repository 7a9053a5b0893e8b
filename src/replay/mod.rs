//! Replay of election logs against a contract snapshot
//!
//! Every holder of an arrangement re-evaluates it on its own. A
//! [`ReplayRunner`] applies a recorded sequence of elections to a tree and,
//! with [`ReplayRunner::run_holders`], does so for several independent holders
//! in parallel and checks they all arrive at the same content hash.

mod loader;
mod runner;

pub use loader::{load_election_log, load_election_log_from_reader};
pub use runner::{ElectionStep, NetPosition, ReplayConfig, ReplayError, ReplayOutcome, ReplayRunner};
