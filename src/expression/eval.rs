//! Amount evaluation against an environment

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::temporal::DateRef;
use super::amount::{Amount, BinaryOp, Comparison};
use super::observable::{NoMarketData, ObservableKey, ObservableResolver};

static NO_MARKET_DATA: NoMarketData = NoMarketData;

/// Error raised while evaluating an amount
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    #[error("division by zero: {detail}")]
    DivisionByZero { detail: String },

    #[error("arithmetic overflow: {detail}")]
    Overflow { detail: String },

    #[error("observable unavailable: {key}")]
    ObservableUnavailable { key: ObservableKey },

    #[error("unbound variable '{name}'")]
    UnboundVariable { name: String },

    #[error("state variable 'vars.{name}' used outside a rollout period")]
    UnboundState { name: String },

    #[error("period date '{date}' used outside a rollout period")]
    UnboundPeriodDate { date: DateRef },

    #[error("continuation directive is not bound to a rollout: {detail}")]
    UnboundDirective { detail: String },
}

/// Discriminant of [`EvalError`], for callers that branch on the failure class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvalErrorKind {
    DivisionByZero,
    Overflow,
    ObservableUnavailable,
    UnboundVariable,
    UnboundState,
    UnboundPeriodDate,
    UnboundDirective,
}

impl EvalError {
    pub fn kind(&self) -> EvalErrorKind {
        match self {
            EvalError::DivisionByZero { .. } => EvalErrorKind::DivisionByZero,
            EvalError::Overflow { .. } => EvalErrorKind::Overflow,
            EvalError::ObservableUnavailable { .. } => EvalErrorKind::ObservableUnavailable,
            EvalError::UnboundVariable { .. } => EvalErrorKind::UnboundVariable,
            EvalError::UnboundState { .. } => EvalErrorKind::UnboundState,
            EvalError::UnboundPeriodDate { .. } => EvalErrorKind::UnboundPeriodDate,
            EvalError::UnboundDirective { .. } => EvalErrorKind::UnboundDirective,
        }
    }
}

/// Named variable values supplied to evaluation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bindings(BTreeMap<String, Decimal>);

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, value: Decimal) -> Option<Decimal> {
        self.0.insert(name.to_string(), value)
    }

    /// Builder-style insert
    pub fn with(mut self, name: &str, value: Decimal) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<Decimal> {
        self.0.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Decimal)> {
        self.0.iter()
    }
}

/// Everything an amount may depend on: variable bindings plus market data
#[derive(Clone, Copy)]
pub struct Environment<'a> {
    bindings: &'a Bindings,
    resolver: &'a dyn ObservableResolver,
}

impl<'a> Environment<'a> {
    pub fn new(bindings: &'a Bindings, resolver: &'a dyn ObservableResolver) -> Self {
        Self { bindings, resolver }
    }

    /// Environment with bindings but no market data
    pub fn without_market_data(bindings: &'a Bindings) -> Self {
        Self { bindings, resolver: &NO_MARKET_DATA }
    }

    pub fn bindings(&self) -> &'a Bindings {
        self.bindings
    }

    pub fn variable(&self, name: &str) -> Result<Decimal, EvalError> {
        self.bindings
            .get(name)
            .ok_or_else(|| EvalError::UnboundVariable { name: name.to_string() })
    }

    pub fn observe(&self, key: ObservableKey) -> Result<Decimal, EvalError> {
        self.resolver
            .resolve(&key)
            .ok_or(EvalError::ObservableUnavailable { key })
    }
}

impl fmt::Debug for Environment<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("bindings", self.bindings)
            .finish_non_exhaustive()
    }
}

/// Evaluate an amount to a decimal
pub fn evaluate(amount: &Amount, env: &Environment<'_>) -> Result<Decimal, EvalError> {
    match amount {
        Amount::Const(value) => Ok(*value),
        Amount::Var(name) => env.variable(name),
        Amount::State(name) => Err(EvalError::UnboundState { name: name.clone() }),
        Amount::Observe(obs) => env.observe(obs.key()?),
        Amount::Binary(op, lhs, rhs) => {
            let a = evaluate(lhs, env)?;
            let b = evaluate(rhs, env)?;
            apply(*op, a, b)
        }
        Amount::Neg(x) => Ok(-evaluate(x, env)?),
        Amount::Plus(x) => Ok(evaluate(x, env)?.max(Decimal::ZERO)),
        Amount::Interest { principal, rate, day_count, start, end } => {
            let principal = evaluate(principal, env)?;
            let rate = evaluate(rate, env)?;
            let start = start.fixed().ok_or(EvalError::UnboundPeriodDate { date: *start })?;
            let end = end.fixed().ok_or(EvalError::UnboundPeriodDate { date: *end })?;
            // Divide last so that whole-period accruals stay exact
            let accrual = apply(BinaryOp::Mul, principal, rate)?;
            let accrual = apply(BinaryOp::Mul, accrual, Decimal::from(day_count.accrual_days(start, end)))?;
            apply(BinaryOp::Div, accrual, Decimal::from(day_count.basis()))
        }
        Amount::Select { test: cond, then, otherwise } => {
            if evaluate_comparison(cond, env)? {
                evaluate(then, env)
            } else {
                evaluate(otherwise, env)
            }
        }
    }
}

/// Evaluate a comparison
pub fn evaluate_comparison(comparison: &Comparison, env: &Environment<'_>) -> Result<bool, EvalError> {
    let lhs = evaluate(&comparison.lhs, env)?;
    let rhs = evaluate(&comparison.rhs, env)?;
    Ok(comparison.op.apply(lhs, rhs))
}

fn apply(op: BinaryOp, a: Decimal, b: Decimal) -> Result<Decimal, EvalError> {
    let overflow = |sym: &str| EvalError::Overflow { detail: format!("{} {} {}", a, sym, b) };
    match op {
        BinaryOp::Add => a.checked_add(b).ok_or_else(|| overflow("+")),
        BinaryOp::Sub => a.checked_sub(b).ok_or_else(|| overflow("-")),
        BinaryOp::Mul => a.checked_mul(b).ok_or_else(|| overflow("*")),
        BinaryOp::Div => {
            if b.is_zero() {
                return Err(EvalError::DivisionByZero { detail: format!("{} / {}", a, b) });
            }
            a.checked_div(b).ok_or_else(|| overflow("/"))
        }
        BinaryOp::Min => Ok(a.min(b)),
        BinaryOp::Max => Ok(a.max(b)),
    }
}
