//! Arrangement Engine - Deterministic evaluation of multi-party financial contracts
//!
//! This library provides:
//! - An expression engine over constants, variables and market observables
//! - Temporal guards and guarded, multi-party actions forming an immutable contract tree
//! - Rollout expansion of periodic schedules with state threaded through `next`
//! - Elections: enabled-action queries and all-or-nothing obligation resolution
//! - Canonical encoding and content hashing for independent holders
//! - Election log replay and ready-made templates (swaption, TARF, swap, FX forward)

pub mod currency;
pub mod temporal;
pub mod expression;
pub mod contract;
pub mod rollout;
pub mod evaluator;
pub mod canonical;
pub mod market;
pub mod replay;
pub mod templates;

// Re-export commonly used types
pub use currency::Currency;
pub use temporal::{after, anytime, before, holds, parse_date, DateRef, TemporalPredicate};
pub use expression::{evaluate, Amount, Bindings, Environment, EvalError, ObservableResolver};
pub use contract::{action, actions, arrange, zero, Action, Arrangement, ConstructionError, Obligation, Party, PartySet};
pub use rollout::{expand, roll_out, Frequency, RolloutSchedule};
pub use evaluator::{available_actions, elect, Election, ElectionError};
pub use canonical::{content_hash, from_canonical_bytes, to_canonical_bytes, ContentHash, ContractSnapshot};
pub use market::FixingTable;
pub use replay::{ReplayConfig, ReplayRunner};
