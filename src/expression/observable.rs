//! Market observables and the resolver capability that supplies them

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::currency::Currency;
use crate::temporal::{format_date, DateRef};
use super::eval::EvalError;

/// An externally supplied market value as referenced from a contract
///
/// Date arguments may point at the current rollout period; they must be bound
/// before the observable can be looked up.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Observable {
    /// Rate fixing of `index` for the accrual period `[start, end)`, as a fraction (0.005 = 0.5%)
    Fixing { index: String, start: DateRef, end: DateRef },
    /// Units of `quote` per unit of `base` on a date
    FxSpot { base: Currency, quote: Currency, on: DateRef },
    /// Any other named market value on a date
    Quote { name: String, on: DateRef },
}

/// Fully bound lookup key handed to an [`ObservableResolver`]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ObservableKey {
    Fixing { index: String, start: NaiveDate, end: NaiveDate },
    FxSpot { base: Currency, quote: Currency, on: NaiveDate },
    Quote { name: String, on: NaiveDate },
}

impl Observable {
    /// Bind period references to the given period bounds
    pub fn bind(&self, start: NaiveDate, end: NaiveDate) -> Observable {
        match self {
            Observable::Fixing { index, start: s, end: e } => Observable::Fixing {
                index: index.clone(),
                start: s.bind(start, end),
                end: e.bind(start, end),
            },
            Observable::FxSpot { base, quote, on } => Observable::FxSpot {
                base: *base,
                quote: *quote,
                on: on.bind(start, end),
            },
            Observable::Quote { name, on } => Observable::Quote {
                name: name.clone(),
                on: on.bind(start, end),
            },
        }
    }

    pub fn has_period_ref(&self) -> bool {
        match self {
            Observable::Fixing { start, end, .. } => start.is_period_ref() || end.is_period_ref(),
            Observable::FxSpot { on, .. } | Observable::Quote { on, .. } => on.is_period_ref(),
        }
    }

    /// Lookup key, failing if any date is still a period reference
    pub fn key(&self) -> Result<ObservableKey, EvalError> {
        let fixed = |date: &DateRef| {
            date.fixed()
                .ok_or(EvalError::UnboundPeriodDate { date: *date })
        };

        Ok(match self {
            Observable::Fixing { index, start, end } => ObservableKey::Fixing {
                index: index.clone(),
                start: fixed(start)?,
                end: fixed(end)?,
            },
            Observable::FxSpot { base, quote, on } => ObservableKey::FxSpot {
                base: *base,
                quote: *quote,
                on: fixed(on)?,
            },
            Observable::Quote { name, on } => ObservableKey::Quote {
                name: name.clone(),
                on: fixed(on)?,
            },
        })
    }
}

impl fmt::Display for Observable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Observable::Fixing { index, start, end } => write!(f, "{}[{}..{}]", index, start, end),
            Observable::FxSpot { base, quote, on } => write!(f, "{}/{}@{}", base, quote, on),
            Observable::Quote { name, on } => write!(f, "{}@{}", name, on),
        }
    }
}

impl fmt::Display for ObservableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObservableKey::Fixing { index, start, end } => {
                write!(f, "{}[{}..{}]", index, format_date(*start), format_date(*end))
            }
            ObservableKey::FxSpot { base, quote, on } => {
                write!(f, "{}/{}@{}", base, quote, format_date(*on))
            }
            ObservableKey::Quote { name, on } => write!(f, "{}@{}", name, format_date(*on)),
        }
    }
}

/// Synchronous capability resolving observables to values
///
/// Returning `None` means "unavailable"; the engine turns that into an
/// evaluation error rather than a default.
pub trait ObservableResolver: Sync {
    fn resolve(&self, key: &ObservableKey) -> Option<Decimal>;
}

impl<F> ObservableResolver for F
where
    F: Fn(&ObservableKey) -> Option<Decimal> + Sync,
{
    fn resolve(&self, key: &ObservableKey) -> Option<Decimal> {
        self(key)
    }
}

/// Resolver with no market data at all
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMarketData;

impl ObservableResolver for NoMarketData {
    fn resolve(&self, _key: &ObservableKey) -> Option<Decimal> {
        None
    }
}
