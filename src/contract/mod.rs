//! Arrangement tree: parties, obligations, actions and the authoring surface
//!
//! An [`Arrangement`] is an immutable value. It is built once through the
//! builder functions in this module, then evaluated any number of times by
//! the [`crate::evaluator`]; evaluation produces new trees and never mutates
//! an existing one.

mod arrangement;
mod builder;
mod error;
mod obligation;
mod party;
mod validate;

pub use arrangement::{Action, ActionSet, Arrangement, NextDirective, Rebind};
pub use builder::{arrange, actions, action, zero, ActionBuilder};
pub use error::ConstructionError;
pub use obligation::{Obligation, ResolvedObligation};
pub use party::{Party, PartySet};
pub use validate::validate;
pub(crate) use validate::{validate_amount, validate_in_scope, validate_rebinds, Scope};
