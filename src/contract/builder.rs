//! Authoring surface: builder functions returning immutable arrangements
//!
//! ```rust,ignore
//! let contract = arrange(actions([
//!     action("proceed", bank.or(&corp))
//!         .given_that(after(parse_date("01/07/2015")?))
//!         .gives(&bank, &corp, libor(var("notional"), q1_start, q1_end), Currency::USD)
//!         .then(zero()),
//!     action("cancel", &corp)
//!         .anytime()
//!         .gives(&corp, &bank, 10_000, Currency::USD),
//! ])?)?;
//! ```

use crate::currency::Currency;
use crate::expression::Amount;
use crate::temporal::TemporalPredicate;
use super::arrangement::{Action, ActionSet, Arrangement, NextDirective, Rebind};
use super::error::ConstructionError;
use super::obligation::Obligation;
use super::party::{Party, PartySet};
use super::validate::validate;

/// Finish authoring a top-level contract
///
/// Rejects rollout-only constructs (state variables, period dates, `next`)
/// that are not inside a rollout body.
pub fn arrange(arrangement: Arrangement) -> Result<Arrangement, ConstructionError> {
    validate(&arrangement)?;
    Ok(arrangement)
}

/// The terminal arrangement
pub fn zero() -> Arrangement {
    Arrangement::Zero
}

/// A set of mutually exclusive actions
pub fn actions(items: impl IntoIterator<Item = ActionBuilder>) -> Result<Arrangement, ConstructionError> {
    let actions = items.into_iter().map(ActionBuilder::build).collect();
    Ok(Arrangement::Actions(ActionSet::new(actions)?))
}

/// Start an action that any party in `actors` may elect
pub fn action(label: &str, actors: impl Into<PartySet>) -> ActionBuilder {
    ActionBuilder {
        label: label.to_string(),
        actors: actors.into(),
        guard: TemporalPredicate::Anytime,
        effects: Vec::new(),
        continuation: Arrangement::Zero,
    }
}

/// Consuming builder for a single [`Action`]
#[derive(Debug, Clone)]
pub struct ActionBuilder {
    label: String,
    actors: PartySet,
    guard: TemporalPredicate,
    effects: Vec<Obligation>,
    continuation: Arrangement,
}

impl ActionBuilder {
    pub fn given_that(mut self, guard: TemporalPredicate) -> Self {
        self.guard = guard;
        self
    }

    pub fn anytime(mut self) -> Self {
        self.guard = TemporalPredicate::Anytime;
        self
    }

    /// Add an obligation of `payer` to `payee`
    pub fn gives(mut self, payer: &Party, payee: &Party, amount: impl Into<Amount>, currency: Currency) -> Self {
        self.effects.push(payer.gives(payee, amount, currency));
        self
    }

    pub fn effect(mut self, obligation: Obligation) -> Self {
        self.effects.push(obligation);
        self
    }

    /// Arrangement that takes over once this action is elected
    pub fn then(mut self, continuation: Arrangement) -> Self {
        self.continuation = continuation;
        self
    }

    /// Continue with the next rollout period, variables unchanged
    pub fn next(mut self) -> Self {
        self.continuation = Arrangement::Next(NextDirective::default());
        self
    }

    /// Continue with the next rollout period, rebinding the listed variables
    pub fn next_with<'a>(mut self, rebinds: impl IntoIterator<Item = (&'a str, Amount)>) -> Self {
        let rebinds = rebinds
            .into_iter()
            .map(|(name, value)| Rebind { name: name.to_string(), value })
            .collect();
        self.continuation = Arrangement::Next(NextDirective { rebinds });
        self
    }

    pub fn build(self) -> Action {
        Action {
            label: self.label,
            actors: self.actors,
            guard: self.guard,
            effects: self.effects,
            continuation: self.continuation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::temporal::{after, parse_date};

    #[test]
    fn test_actions_rejects_duplicate_labels() {
        let corp = Party::new("acmeCorp");
        let result = actions([action("proceed", &corp), action("proceed", &corp)]);
        assert_eq!(
            result,
            Err(ConstructionError::DuplicateLabel { label: "proceed".to_string() })
        );
        assert_eq!(actions([action("", &corp)]), Err(ConstructionError::EmptyLabel));
    }

    #[test]
    fn test_builder_keeps_authoring_order() {
        let corp = Party::new("acmeCorp");
        let bank = Party::new("highStreetBank");
        let date = parse_date("01/07/2015").unwrap();

        let tree = arrange(
            actions([
                action("proceed", bank.or(&corp))
                    .given_that(after(date))
                    .gives(&bank, &corp, 100, Currency::USD)
                    .gives(&corp, &bank, 40, Currency::USD),
                action("cancel", &corp).anytime().gives(&corp, &bank, 10_000, Currency::USD),
            ])
            .unwrap(),
        )
        .unwrap();

        let set = tree.action_set().unwrap();
        let labels: Vec<&str> = set.iter().map(|a| a.label.as_str()).collect();
        assert_eq!(labels, vec!["proceed", "cancel"]);

        let proceed = set.get("proceed").unwrap();
        assert_eq!(proceed.effects.len(), 2);
        assert_eq!(proceed.effects[0].payer, bank);
        assert!(proceed.continuation.is_zero());
    }
}
