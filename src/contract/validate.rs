//! Structural checks run when a tree is built or decoded

use std::collections::BTreeSet;

use crate::expression::Amount;
use super::arrangement::{Action, Arrangement, Rebind};
use super::error::ConstructionError;

/// Where a subtree sits relative to rollouts
#[derive(Debug, Clone, Copy)]
pub(crate) enum Scope<'a> {
    /// Outside any rollout body: no state variables, no period dates, no `next`
    TopLevel,
    /// Inside a rollout body declaring these state variables
    Rollout(&'a BTreeSet<String>),
}

/// Validate a complete tree
pub fn validate(arrangement: &Arrangement) -> Result<(), ConstructionError> {
    validate_in_scope(arrangement, Scope::TopLevel)
}

pub(crate) fn validate_in_scope(arrangement: &Arrangement, scope: Scope<'_>) -> Result<(), ConstructionError> {
    match arrangement {
        Arrangement::Zero => Ok(()),
        Arrangement::Actions(set) => {
            set.check_labels()?;
            for action in set.iter() {
                validate_action(action, scope)?;
            }
            Ok(())
        }
        Arrangement::Next(directive) => match scope {
            Scope::TopLevel => Err(ConstructionError::DirectiveOutsideRollout),
            Scope::Rollout(declared) => validate_rebinds(&directive.rebinds, declared, scope),
        },
        // A bound directive carries its own rollout and is checked in that rollout's scope,
        // whatever scope it was found in.
        Arrangement::Resume(resume) => resume.validate(),
    }
}

fn validate_action(action: &Action, scope: Scope<'_>) -> Result<(), ConstructionError> {
    if action.actors.is_empty() {
        return Err(ConstructionError::EmptyPartySet { label: action.label.clone() });
    }
    if action.guard.has_period_ref() && matches!(scope, Scope::TopLevel) {
        return Err(ConstructionError::PeriodDateOutsideRollout {
            context: format!("guard of '{}'", action.label),
        });
    }
    for effect in &action.effects {
        validate_amount(&effect.amount, scope, &action.label)?;
    }
    validate_in_scope(&action.continuation, scope)
}

/// Rebinds must name declared variables, each at most once
pub(crate) fn validate_rebinds(
    rebinds: &[Rebind],
    declared: &BTreeSet<String>,
    scope: Scope<'_>,
) -> Result<(), ConstructionError> {
    let mut seen = BTreeSet::new();
    for rebind in rebinds {
        if !declared.contains(&rebind.name) {
            return Err(ConstructionError::UndeclaredRebind { name: rebind.name.clone() });
        }
        if !seen.insert(rebind.name.as_str()) {
            return Err(ConstructionError::DuplicateRebind { name: rebind.name.clone() });
        }
        validate_amount(&rebind.value, scope, "next()")?;
    }
    Ok(())
}

pub(crate) fn validate_amount(amount: &Amount, scope: Scope<'_>, context: &str) -> Result<(), ConstructionError> {
    let mut refs = BTreeSet::new();
    amount.collect_state_refs(&mut refs);

    match scope {
        Scope::TopLevel => {
            if let Some(name) = refs.into_iter().next() {
                return Err(ConstructionError::UnboundVariable { name });
            }
            if amount.has_period_ref() {
                return Err(ConstructionError::PeriodDateOutsideRollout { context: context.to_string() });
            }
        }
        Scope::Rollout(declared) => {
            if let Some(name) = refs.into_iter().find(|name| !declared.contains(name)) {
                return Err(ConstructionError::UnboundVariable { name });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{action, actions, zero, Party};
    use crate::currency::Currency;
    use crate::expression::{state, var};
    use crate::temporal::{after, DateRef};

    #[test]
    fn test_top_level_rejects_rollout_constructs() {
        let corp = Party::new("acmeCorp");
        let bank = Party::new("highStreetBank");

        let with_state = actions([action("pay", &corp).gives(&corp, &bank, state("cap"), Currency::USD).then(zero())]).unwrap();
        assert_eq!(
            validate(&with_state),
            Err(ConstructionError::UnboundVariable { name: "cap".to_string() })
        );

        let with_next = actions([action("roll", &corp).next()]).unwrap();
        assert_eq!(validate(&with_next), Err(ConstructionError::DirectiveOutsideRollout));

        let with_period = actions([action("wait", &corp).given_that(after(DateRef::PeriodEnd)).then(zero())]).unwrap();
        assert!(matches!(
            validate(&with_period),
            Err(ConstructionError::PeriodDateOutsideRollout { .. })
        ));

        let plain = actions([action("pay", &corp).gives(&corp, &bank, var("fee"), Currency::USD).then(zero())]).unwrap();
        assert_eq!(validate(&plain), Ok(()));
    }

    #[test]
    fn test_rollout_scope_checks_declarations() {
        let corp = Party::new("acmeCorp");
        let declared: BTreeSet<String> = ["uses".to_string()].into_iter().collect();

        let ok = actions([action("go", &corp).next_with([("uses", state("uses") - 1)])]).unwrap();
        assert_eq!(validate_in_scope(&ok, Scope::Rollout(&declared)), Ok(()));

        let undeclared = actions([action("go", &corp).next_with([("cap", state("uses") - 1)])]).unwrap();
        assert_eq!(
            validate_in_scope(&undeclared, Scope::Rollout(&declared)),
            Err(ConstructionError::UndeclaredRebind { name: "cap".to_string() })
        );

        let twice = actions([action("go", &corp).next_with([("uses", state("uses")), ("uses", state("uses"))])]).unwrap();
        assert_eq!(
            validate_in_scope(&twice, Scope::Rollout(&declared)),
            Err(ConstructionError::DuplicateRebind { name: "uses".to_string() })
        );

        let unbound = actions([action("go", &corp).next_with([("uses", state("cap"))])]).unwrap();
        assert_eq!(
            validate_in_scope(&unbound, Scope::Rollout(&declared)),
            Err(ConstructionError::UnboundVariable { name: "cap".to_string() })
        );
    }
}
