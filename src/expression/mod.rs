//! Expression engine: amounts over constants, variables and market observables
//!
//! An [`Amount`] is a pure expression tree. [`evaluate`] reduces it to a
//! `Decimal` against an [`Environment`] holding variable bindings and an
//! [`ObservableResolver`]. Evaluation never defaults a missing input to zero:
//! unbound variables, unavailable observables, division by zero and overflow
//! all surface as [`EvalError`].

mod amount;
mod daycount;
mod eval;
mod observable;

pub use amount::{
    Amount, BinaryOp, CompareOp, Comparison,
    constant, var, state, fixing, fx, quote, interest, libor, select,
};
pub use daycount::DayCount;
pub use eval::{evaluate, evaluate_comparison, Bindings, Environment, EvalError, EvalErrorKind};
pub use observable::{Observable, ObservableKey, ObservableResolver, NoMarketData};
