//! Period instantiation and `next` resolution

use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::contract::{
    validate_amount, validate_in_scope, validate_rebinds, Action, Arrangement, ConstructionError,
    Obligation, Rebind, Scope,
};
use crate::expression::{evaluate, Amount, Environment, EvalError};
use super::schedule::{Frequency, Period, RolloutSchedule};

/// A rollout positioned at one period with that period's variable snapshot
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rollout {
    pub schedule: RolloutSchedule,
    pub body: Arrangement,
    pub period: usize,
    pub vars: BTreeMap<String, Amount>,
}

/// A `next(...)` directive bound to the period it was instantiated in
///
/// `rebinds` have already had that period's bindings substituted, so they only
/// depend on the environment supplied at election time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resume {
    pub rollout: Rollout,
    pub rebinds: Vec<Rebind>,
}

/// Expand a schedule over a body template
///
/// Returns the first period's instantiation. State variables referenced in the
/// body must be declared in `schedule.variables`.
pub fn expand(schedule: RolloutSchedule, body: Arrangement) -> Result<Arrangement, ConstructionError> {
    schedule.validate()?;
    let declared: BTreeSet<String> = schedule.variables.keys().cloned().collect();
    validate_in_scope(&body, Scope::Rollout(&declared))?;

    let rollout = Rollout {
        vars: schedule.variables.clone(),
        schedule,
        body,
        period: 0,
    };
    debug!(
        "expanding rollout {:?} over {} periods",
        rollout.schedule.frequency,
        rollout.schedule.period_count()
    );
    Ok(rollout.instantiate())
}

impl Rollout {
    /// The body with this period's bindings substituted; `Zero` past the last period
    pub fn instantiate(&self) -> Arrangement {
        match self.schedule.period(self.period) {
            Some(period) => {
                let ctx = PeriodContext { rollout: self, period };
                ctx.bind(&self.body)
            }
            None => Arrangement::Zero,
        }
    }

    pub fn is_final(&self) -> bool {
        self.period
            .checked_add(1)
            .and_then(|next| self.schedule.period(next))
            .is_none()
    }

    pub(crate) fn validate(&self) -> Result<(), ConstructionError> {
        self.schedule.validate()?;
        let declared: BTreeSet<String> = self.schedule.variables.keys().cloned().collect();
        let snapshot: BTreeSet<String> = self.vars.keys().cloned().collect();
        if snapshot != declared {
            return Err(ConstructionError::MalformedSchedule {
                detail: "variable snapshot does not match declared variables".to_string(),
            });
        }
        if self.schedule.period(self.period).is_none() {
            return Err(ConstructionError::MalformedSchedule {
                detail: format!("period {} is past the end of the schedule", self.period),
            });
        }
        for (name, value) in &self.vars {
            validate_amount(value, Scope::TopLevel, name)?;
        }
        validate_in_scope(&self.body, Scope::Rollout(&declared))
    }
}

impl Resume {
    /// Advance to the next period, or `Zero` if this was the final one
    ///
    /// On the final period the rebinds are not evaluated at all.
    pub fn resolve(&self, env: &Environment<'_>) -> Result<Arrangement, EvalError> {
        let next_index = self.rollout.period + 1;
        let Some(next_period) = self.rollout.schedule.period(next_index) else {
            debug!("rollout finished after period {}", self.rollout.period);
            return Ok(Arrangement::Zero);
        };

        let mut vars = self.rollout.vars.clone();
        for rebind in &self.rebinds {
            let value = evaluate(&rebind.value, env)?;
            debug!("vars.{} = {} for period {}", rebind.name, value, next_period);
            vars.insert(rebind.name.clone(), Amount::Const(value));
        }

        let next = Rollout {
            schedule: self.rollout.schedule.clone(),
            body: self.rollout.body.clone(),
            period: next_index,
            vars,
        };
        Ok(next.instantiate())
    }

    pub(crate) fn validate(&self) -> Result<(), ConstructionError> {
        self.rollout.validate()?;
        let declared: BTreeSet<String> = self.rollout.schedule.variables.keys().cloned().collect();
        validate_rebinds(&self.rebinds, &declared, Scope::TopLevel)
    }
}

impl fmt::Display for Resume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rebinds: Vec<String> = self.rebinds.iter().map(|r| r.to_string()).collect();
        write!(f, "next({}) -> period {}", rebinds.join(", "), self.rollout.period + 1)
    }
}

/// Bindings of one period while substituting into the body
struct PeriodContext<'a> {
    rollout: &'a Rollout,
    period: Period,
}

impl PeriodContext<'_> {
    fn amount(&self, amount: &Amount) -> Amount {
        amount.instantiate(self.period.start, self.period.end, &self.rollout.vars)
    }

    fn bind(&self, arrangement: &Arrangement) -> Arrangement {
        match arrangement {
            Arrangement::Zero => Arrangement::Zero,
            Arrangement::Actions(set) => Arrangement::Actions(set.map(|action| self.bind_action(action))),
            Arrangement::Next(directive) => Arrangement::Resume(Box::new(Resume {
                rollout: self.rollout.clone(),
                rebinds: directive
                    .rebinds
                    .iter()
                    .map(|r| Rebind { name: r.name.clone(), value: self.amount(&r.value) })
                    .collect(),
            })),
            // Already bound to its own rollout
            Arrangement::Resume(resume) => Arrangement::Resume(resume.clone()),
        }
    }

    fn bind_action(&self, action: &Action) -> Action {
        Action {
            label: action.label.clone(),
            actors: action.actors.clone(),
            guard: action.guard.bind(self.period.start, self.period.end),
            effects: action
                .effects
                .iter()
                .map(|o| Obligation {
                    payer: o.payer.clone(),
                    payee: o.payee.clone(),
                    amount: self.amount(&o.amount),
                    currency: o.currency,
                })
                .collect(),
            continuation: self.bind(&action.continuation),
        }
    }
}

/// Authoring entry point for `rollOut(start, end, frequency, vars) { body }`
pub fn roll_out(start: NaiveDate, end: NaiveDate, frequency: Frequency) -> RolloutBuilder {
    RolloutBuilder {
        schedule: RolloutSchedule::new(start, end, frequency),
    }
}

#[derive(Debug, Clone)]
pub struct RolloutBuilder {
    schedule: RolloutSchedule,
}

impl RolloutBuilder {
    /// Declare a state variable with its initial value
    pub fn var(mut self, name: &str, initial: impl Into<Amount>) -> Self {
        self.schedule.variables.insert(name.to_string(), initial.into());
        self
    }

    /// Expand over `body`
    pub fn body(self, body: Arrangement) -> Result<Arrangement, ConstructionError> {
        expand(self.schedule, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{action, actions, Party};
    use crate::currency::Currency;
    use crate::expression::{state, Bindings};
    use crate::temporal::{after, holds, DateRef};
    use rust_decimal_macros::dec;

    fn d(day: u32, month: u32, year: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn proceed_action(tree: &Arrangement) -> &Action {
        tree.action_set().unwrap().get("proceed").unwrap()
    }

    #[test]
    fn test_first_period_is_bound() {
        let bank = Party::new("highStreetBank");
        let corp = Party::new("acmeCorp");

        let tree = roll_out(d(1, 1, 2015), d(1, 1, 2016), Frequency::Quarterly)
            .var("cap", 1000)
            .body(
                actions([action("proceed", bank.or(&corp))
                    .given_that(after(DateRef::PeriodEnd))
                    .gives(&bank, &corp, state("cap") / 10, Currency::EUR)
                    .next_with([("cap", state("cap") - 100)])])
                .unwrap(),
            )
            .unwrap();

        let proceed = proceed_action(&tree);
        assert!(holds(&proceed.guard, d(2, 4, 2015)));
        assert!(!holds(&proceed.guard, d(1, 4, 2015)));
        assert_eq!(proceed.effects[0].amount.to_string(), "(1000 / 10)");

        match &proceed.continuation {
            Arrangement::Resume(resume) => {
                assert_eq!(resume.rollout.period, 0);
                assert_eq!(resume.rebinds[0].value.to_string(), "(1000 - 100)");
            }
            other => panic!("expected bound next, got {:?}", other),
        }
    }

    #[test]
    fn test_resolution_threads_variables() {
        let corp = Party::new("acmeCorp");
        let tree = roll_out(d(1, 1, 2015), d(1, 4, 2015), Frequency::Monthly)
            .var("cap", 1000)
            .body(actions([action("proceed", &corp).next_with([("cap", state("cap") - 100)])]).unwrap())
            .unwrap();

        let bindings = Bindings::new();
        let env = Environment::without_market_data(&bindings);

        let mut current = tree;
        let mut caps = Vec::new();
        for _ in 0..3 {
            let resume = match &proceed_action(&current).continuation {
                Arrangement::Resume(resume) => resume.clone(),
                other => panic!("expected bound next, got {:?}", other),
            };
            caps.push(resume.rollout.vars["cap"].clone());
            current = resume.resolve(&env).unwrap();
        }

        assert!(current.is_zero());
        assert_eq!(caps, vec![Amount::from(1000), Amount::Const(dec!(900)), Amount::Const(dec!(800))]);
    }

    #[test]
    fn test_final_period_ignores_rebinds() {
        let corp = Party::new("acmeCorp");
        let tree = roll_out(d(1, 1, 2015), d(1, 2, 2015), Frequency::Monthly)
            .var("cap", 1000)
            .body(actions([action("proceed", &corp).next_with([("cap", state("cap") / 0)])]).unwrap())
            .unwrap();

        let bindings = Bindings::new();
        let env = Environment::without_market_data(&bindings);
        let Arrangement::Resume(resume) = &proceed_action(&tree).continuation else {
            panic!("expected bound next");
        };

        assert!(resume.rollout.is_final());
        assert_eq!(resume.resolve(&env).unwrap(), Arrangement::Zero);
    }

    #[test]
    fn test_expand_rejects_undeclared_state() {
        let corp = Party::new("acmeCorp");
        let result = roll_out(d(1, 1, 2015), d(1, 4, 2015), Frequency::Monthly)
            .body(actions([action("proceed", &corp).gives(&corp, &corp, state("uses"), Currency::USD).next()]).unwrap());

        assert_eq!(result, Err(ConstructionError::UnboundVariable { name: "uses".to_string() }));
    }

    #[test]
    fn test_nested_rollout_keeps_own_scope() {
        let corp = Party::new("acmeCorp");
        let inner = roll_out(d(1, 1, 2015), d(1, 3, 2015), Frequency::Monthly)
            .var("n", 2)
            .body(actions([action("inner", &corp).next_with([("n", state("n") - 1)])]).unwrap())
            .unwrap();

        let outer = roll_out(d(1, 1, 2015), d(1, 1, 2017), Frequency::Annually)
            .var("m", 5)
            .body(actions([action("outer", &corp).then(inner.clone()), action("skip", &corp).next()]).unwrap())
            .unwrap();

        let set = outer.action_set().unwrap();
        assert_eq!(set.get("outer").unwrap().continuation, inner);
    }
}
