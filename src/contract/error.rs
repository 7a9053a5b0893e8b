//! Errors raised while building an arrangement

use thiserror::Error;

/// A tree that fails construction is never usable, not even in part
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructionError {
    #[error("duplicate action label '{label}'")]
    DuplicateLabel { label: String },

    #[error("action label must not be empty")]
    EmptyLabel,

    #[error("action '{label}' has no actors")]
    EmptyPartySet { label: String },

    #[error("state variable 'vars.{name}' is not declared by the enclosing rollout")]
    UnboundVariable { name: String },

    #[error("next() rebinds undeclared variable '{name}'")]
    UndeclaredRebind { name: String },

    #[error("next() rebinds '{name}' more than once")]
    DuplicateRebind { name: String },

    #[error("malformed schedule: {detail}")]
    MalformedSchedule { detail: String },

    #[error("next() used outside a rollout body")]
    DirectiveOutsideRollout,

    #[error("period start/end used outside a rollout body ({context})")]
    PeriodDateOutsideRollout { context: String },
}
