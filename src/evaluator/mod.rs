//! Evaluator: enabled actions and elections
//!
//! [`available_actions`] lists what may be elected at a date. [`elect`]
//! performs one election: it checks the guard and the actor, evaluates every
//! effect against the environment and computes the successor arrangement.
//! Either every effect resolves or the election fails and nothing is produced.

mod engine;

pub use engine::{available_actions, elect, net_positions, resolve_continuation, Election, ElectionError};
