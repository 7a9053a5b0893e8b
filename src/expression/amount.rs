//! Amount expression trees and their authoring helpers

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use crate::currency::Currency;
use crate::temporal::DateRef;
use super::daycount::DayCount;
use super::observable::Observable;

/// Binary operators over amounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Min,
    Max,
}

/// Comparison operators used by [`Amount::Select`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl CompareOp {
    pub fn apply(&self, lhs: Decimal, rhs: Decimal) -> bool {
        match self {
            CompareOp::Lt => lhs < rhs,
            CompareOp::Le => lhs <= rhs,
            CompareOp::Gt => lhs > rhs,
            CompareOp::Ge => lhs >= rhs,
            CompareOp::Eq => lhs == rhs,
            CompareOp::Ne => lhs != rhs,
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
        }
    }
}

/// Comparison between two amounts
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Comparison {
    pub op: CompareOp,
    pub lhs: Amount,
    pub rhs: Amount,
}

/// A monetary or numeric expression
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Amount {
    /// Literal decimal
    Const(Decimal),
    /// Variable bound by the evaluation environment
    Var(String),
    /// Rollout state variable (`vars.<name>`), bound per period
    State(String),
    /// Externally supplied market value
    Observe(Observable),
    Binary(BinaryOp, Box<Amount>, Box<Amount>),
    Neg(Box<Amount>),
    /// Non-negative clamp, `max(x, 0)`
    Plus(Box<Amount>),
    /// `principal * rate * accrual_days(start, end) / basis`, divided last
    Interest {
        principal: Box<Amount>,
        rate: Box<Amount>,
        day_count: DayCount,
        start: DateRef,
        end: DateRef,
    },
    /// `then` if the comparison holds, else `otherwise`
    Select {
        test: Box<Comparison>,
        then: Box<Amount>,
        otherwise: Box<Amount>,
    },
}

impl Amount {
    fn binary(op: BinaryOp, lhs: Amount, rhs: Amount) -> Amount {
        Amount::Binary(op, Box::new(lhs), Box::new(rhs))
    }

    /// `max(self, 0)`
    pub fn plus(self) -> Amount {
        Amount::Plus(Box::new(self))
    }

    pub fn min(self, other: impl Into<Amount>) -> Amount {
        Amount::binary(BinaryOp::Min, self, other.into())
    }

    pub fn max(self, other: impl Into<Amount>) -> Amount {
        Amount::binary(BinaryOp::Max, self, other.into())
    }

    /// Build a comparison against another amount
    pub fn compare(self, op: CompareOp, rhs: impl Into<Amount>) -> Comparison {
        Comparison { op, lhs: self, rhs: rhs.into() }
    }

    /// Substitute rollout period bindings: period dates become fixed dates and
    /// state variables become the period's snapshot expression.
    pub fn instantiate(&self, start: NaiveDate, end: NaiveDate, vars: &BTreeMap<String, Amount>) -> Amount {
        let sub = |a: &Amount| Box::new(a.instantiate(start, end, vars));
        match self {
            Amount::Const(_) | Amount::Var(_) => self.clone(),
            Amount::State(name) => vars.get(name).cloned().unwrap_or_else(|| self.clone()),
            Amount::Observe(obs) => Amount::Observe(obs.bind(start, end)),
            Amount::Binary(op, l, r) => Amount::Binary(*op, sub(l), sub(r)),
            Amount::Neg(x) => Amount::Neg(sub(x)),
            Amount::Plus(x) => Amount::Plus(sub(x)),
            Amount::Interest { principal, rate, day_count, start: s, end: e } => Amount::Interest {
                principal: sub(principal),
                rate: sub(rate),
                day_count: *day_count,
                start: s.bind(start, end),
                end: e.bind(start, end),
            },
            Amount::Select { test, then, otherwise } => Amount::Select {
                test: Box::new(Comparison {
                    op: test.op,
                    lhs: test.lhs.instantiate(start, end, vars),
                    rhs: test.rhs.instantiate(start, end, vars),
                }),
                then: sub(then),
                otherwise: sub(otherwise),
            },
        }
    }

    /// Collect the names of rollout state variables referenced by this amount
    pub fn collect_state_refs(&self, out: &mut BTreeSet<String>) {
        match self {
            Amount::Const(_) | Amount::Var(_) | Amount::Observe(_) => {}
            Amount::State(name) => {
                out.insert(name.clone());
            }
            Amount::Binary(_, l, r) => {
                l.collect_state_refs(out);
                r.collect_state_refs(out);
            }
            Amount::Neg(x) | Amount::Plus(x) => x.collect_state_refs(out),
            Amount::Interest { principal, rate, .. } => {
                principal.collect_state_refs(out);
                rate.collect_state_refs(out);
            }
            Amount::Select { test, then, otherwise } => {
                test.lhs.collect_state_refs(out);
                test.rhs.collect_state_refs(out);
                then.collect_state_refs(out);
                otherwise.collect_state_refs(out);
            }
        }
    }

    /// Whether any date inside this amount refers to a rollout period bound
    pub fn has_period_ref(&self) -> bool {
        match self {
            Amount::Const(_) | Amount::Var(_) | Amount::State(_) => false,
            Amount::Observe(obs) => obs.has_period_ref(),
            Amount::Binary(_, l, r) => l.has_period_ref() || r.has_period_ref(),
            Amount::Neg(x) | Amount::Plus(x) => x.has_period_ref(),
            Amount::Interest { principal, rate, start, end, .. } => {
                start.is_period_ref()
                    || end.is_period_ref()
                    || principal.has_period_ref()
                    || rate.has_period_ref()
            }
            Amount::Select { test, then, otherwise } => {
                test.lhs.has_period_ref()
                    || test.rhs.has_period_ref()
                    || then.has_period_ref()
                    || otherwise.has_period_ref()
            }
        }
    }
}

/// Literal amount
pub fn constant(value: impl Into<Decimal>) -> Amount {
    Amount::Const(value.into())
}

/// Environment variable reference
pub fn var(name: &str) -> Amount {
    Amount::Var(name.to_string())
}

/// Rollout state variable reference (`vars.<name>`)
pub fn state(name: &str) -> Amount {
    Amount::State(name.to_string())
}

/// Rate fixing of `index` over `[start, end)`
pub fn fixing(index: &str, start: impl Into<DateRef>, end: impl Into<DateRef>) -> Amount {
    Amount::Observe(Observable::Fixing {
        index: index.to_string(),
        start: start.into(),
        end: end.into(),
    })
}

/// FX spot: units of `quote` per unit of `base` on `on`
pub fn fx(base: Currency, quote: Currency, on: impl Into<DateRef>) -> Amount {
    Amount::Observe(Observable::FxSpot { base, quote, on: on.into() })
}

/// Named market quote on a date
pub fn quote(name: &str, on: impl Into<DateRef>) -> Amount {
    Amount::Observe(Observable::Quote { name: name.to_string(), on: on.into() })
}

/// Simple interest accrued on `principal` at `rate` over `[start, end)`
pub fn interest(
    principal: impl Into<Amount>,
    day_count: DayCount,
    rate: impl Into<Amount>,
    start: impl Into<DateRef>,
    end: impl Into<DateRef>,
) -> Amount {
    Amount::Interest {
        principal: Box::new(principal.into()),
        rate: Box::new(rate.into()),
        day_count,
        start: start.into(),
        end: end.into(),
    }
}

/// Floating leg accrual: `notional` at the LIBOR fixing for `[start, end)`, act/360
pub fn libor(notional: impl Into<Amount>, start: impl Into<DateRef>, end: impl Into<DateRef>) -> Amount {
    let start = start.into();
    let end = end.into();
    interest(notional, DayCount::Act360, fixing("LIBOR", start, end), start, end)
}

/// Conditional amount
pub fn select(test: Comparison, then: impl Into<Amount>, otherwise: impl Into<Amount>) -> Amount {
    Amount::Select {
        test: Box::new(test),
        then: Box::new(then.into()),
        otherwise: Box::new(otherwise.into()),
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::Const(value)
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Amount::Const(Decimal::from(value))
    }
}

impl From<i32> for Amount {
    fn from(value: i32) -> Self {
        Amount::Const(Decimal::from(value))
    }
}

impl From<&Amount> for Amount {
    fn from(value: &Amount) -> Self {
        value.clone()
    }
}

impl<T: Into<Amount>> Add<T> for Amount {
    type Output = Amount;
    fn add(self, rhs: T) -> Amount {
        Amount::binary(BinaryOp::Add, self, rhs.into())
    }
}

impl<T: Into<Amount>> Sub<T> for Amount {
    type Output = Amount;
    fn sub(self, rhs: T) -> Amount {
        Amount::binary(BinaryOp::Sub, self, rhs.into())
    }
}

impl<T: Into<Amount>> Mul<T> for Amount {
    type Output = Amount;
    fn mul(self, rhs: T) -> Amount {
        Amount::binary(BinaryOp::Mul, self, rhs.into())
    }
}

impl<T: Into<Amount>> Div<T> for Amount {
    type Output = Amount;
    fn div(self, rhs: T) -> Amount {
        Amount::binary(BinaryOp::Div, self, rhs.into())
    }
}

impl Neg for Amount {
    type Output = Amount;
    fn neg(self) -> Amount {
        Amount::Neg(Box::new(self))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Amount::Const(v) => write!(f, "{}", v),
            Amount::Var(name) => write!(f, "{}", name),
            Amount::State(name) => write!(f, "vars.{}", name),
            Amount::Observe(obs) => write!(f, "{}", obs),
            Amount::Binary(op, l, r) => match op {
                BinaryOp::Add => write!(f, "({} + {})", l, r),
                BinaryOp::Sub => write!(f, "({} - {})", l, r),
                BinaryOp::Mul => write!(f, "({} * {})", l, r),
                BinaryOp::Div => write!(f, "({} / {})", l, r),
                BinaryOp::Min => write!(f, "min({}, {})", l, r),
                BinaryOp::Max => write!(f, "max({}, {})", l, r),
            },
            Amount::Neg(x) => write!(f, "-{}", x),
            Amount::Plus(x) => write!(f, "plus({})", x),
            Amount::Interest { principal, rate, day_count, start, end } => {
                write!(f, "interest({}, {}, {}, {}, {})", principal, day_count, rate, start, end)
            }
            Amount::Select { test, then, otherwise } => write!(
                f,
                "if {} {} {} then {} else {}",
                test.lhs,
                test.op.symbol(),
                test.rhs,
                then,
                otherwise
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn d(day: u32, month: u32, year: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_operator_sugar_builds_tree() {
        let payout = (fx(Currency::EUR, Currency::USD, DateRef::PeriodEnd) - dec!(1.10)).plus() * var("notional");
        assert_eq!(payout.to_string(), "(plus((EUR/USD@end - 1.10)) * notional)");
        assert!(payout.has_period_ref());
    }

    #[test]
    fn test_instantiate_binds_state_and_dates() {
        let template = state("uses") - 1 + fixing("LIBOR", DateRef::PeriodStart, DateRef::PeriodEnd);
        let mut vars = BTreeMap::new();
        vars.insert("uses".to_string(), constant(dec!(4)));

        let bound = template.instantiate(d(1, 1, 2015), d(1, 4, 2015), &vars);
        assert!(!bound.has_period_ref());

        let mut refs = BTreeSet::new();
        bound.collect_state_refs(&mut refs);
        assert!(refs.is_empty());
        assert_eq!(bound.to_string(), "((4 - 1) + LIBOR[01/01/2015..01/04/2015])");
    }

    #[test]
    fn test_collect_state_refs_through_select() {
        let amount = select(state("cap").compare(CompareOp::Gt, 0), state("cap").min(var("payout")), 0);
        let mut refs = BTreeSet::new();
        amount.collect_state_refs(&mut refs);
        assert_eq!(refs.into_iter().collect::<Vec<_>>(), vec!["cap".to_string()]);
    }
}
