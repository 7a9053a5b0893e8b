//! Election engine

use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::contract::{Action, Arrangement, Party, ResolvedObligation};
use crate::currency::Currency;
use crate::expression::{Environment, EvalError};
use crate::temporal::{format_date, holds};

/// Why an election was refused
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ElectionError {
    #[error("no enabled action labeled '{label}' at {date}")]
    NotEnabled { label: String, date: String },

    #[error("'{actor}' is not authorized to elect '{label}'")]
    NotAuthorized { actor: Party, label: String },

    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// Result of a successful election
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Election {
    pub label: String,
    pub actor: Party,
    pub at: NaiveDate,
    /// Resolved obligations in authoring order
    pub effects: Vec<ResolvedObligation>,
    pub successor: Arrangement,
}

/// Actions of `tree` whose guard holds at `at`, in authoring order
///
/// `Zero` and bare continuation directives have no actions.
pub fn available_actions(tree: &Arrangement, at: NaiveDate) -> Vec<&Action> {
    match tree.action_set() {
        Some(set) => set.iter().filter(|action| holds(&action.guard, at)).collect(),
        None => Vec::new(),
    }
}

/// Elect action `label` on behalf of `actor`
pub fn elect(
    tree: &Arrangement,
    actor: &Party,
    label: &str,
    at: NaiveDate,
    env: &Environment<'_>,
) -> Result<Election, ElectionError> {
    let action = available_actions(tree, at)
        .into_iter()
        .find(|action| action.label == label)
        .ok_or_else(|| ElectionError::NotEnabled {
            label: label.to_string(),
            date: format_date(at),
        })?;

    if !action.actors.contains(actor) {
        return Err(ElectionError::NotAuthorized {
            actor: actor.clone(),
            label: label.to_string(),
        });
    }

    let effects = action
        .effects
        .iter()
        .map(|obligation| obligation.resolve(env))
        .collect::<Result<Vec<_>, _>>()?;

    let successor = resolve_continuation(&action.continuation, env)?;

    debug!(
        "{} elected '{}' on {}: {} effect(s)",
        actor,
        label,
        format_date(at),
        effects.len()
    );

    Ok(Election {
        label: label.to_string(),
        actor: actor.clone(),
        at,
        effects,
        successor,
    })
}

/// Successor of an elected action
///
/// Bound `next` directives are advanced until an action set or `Zero` is
/// reached. An unbound directive cannot be advanced.
pub fn resolve_continuation(continuation: &Arrangement, env: &Environment<'_>) -> Result<Arrangement, EvalError> {
    let mut current = continuation.clone();
    loop {
        match current {
            Arrangement::Resume(resume) => current = resume.resolve(env)?,
            Arrangement::Next(directive) => {
                return Err(EvalError::UnboundDirective { detail: directive.to_string() });
            }
            other => return Ok(other),
        }
    }
}

/// Net amount received per party and currency across a set of payments
///
/// Positive means the party received more than it paid. A total that does
/// not fit in a `Decimal` is an overflow error.
pub fn net_positions<'a>(
    effects: impl IntoIterator<Item = &'a ResolvedObligation>,
) -> Result<BTreeMap<(Party, Currency), Decimal>, EvalError> {
    let mut positions: BTreeMap<(Party, Currency), Decimal> = BTreeMap::new();
    for payment in effects {
        let received = positions
            .entry((payment.payee.clone(), payment.currency))
            .or_insert(Decimal::ZERO);
        *received = received.checked_add(payment.amount).ok_or_else(|| EvalError::Overflow {
            detail: format!("net position of {} in {}", payment.payee, payment.currency),
        })?;

        let paid = positions
            .entry((payment.payer.clone(), payment.currency))
            .or_insert(Decimal::ZERO);
        *paid = paid.checked_sub(payment.amount).ok_or_else(|| EvalError::Overflow {
            detail: format!("net position of {} in {}", payment.payer, payment.currency),
        })?;
    }
    Ok(positions)
}
