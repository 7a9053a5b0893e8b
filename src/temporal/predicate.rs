//! Temporal guards attached to actions

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::dates::DateRef;

/// Guard deciding whether an action is available at a reference date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemporalPredicate {
    /// Always available
    Anytime,
    /// Available strictly before the date
    Before(DateRef),
    /// Available strictly after the date
    After(DateRef),
}

impl Default for TemporalPredicate {
    fn default() -> Self {
        TemporalPredicate::Anytime
    }
}

impl TemporalPredicate {
    /// Bind period references to the given period bounds
    pub fn bind(&self, start: NaiveDate, end: NaiveDate) -> TemporalPredicate {
        match self {
            TemporalPredicate::Anytime => TemporalPredicate::Anytime,
            TemporalPredicate::Before(date) => TemporalPredicate::Before(date.bind(start, end)),
            TemporalPredicate::After(date) => TemporalPredicate::After(date.bind(start, end)),
        }
    }

    /// Whether the guard mentions a rollout period bound
    pub fn has_period_ref(&self) -> bool {
        match self {
            TemporalPredicate::Anytime => false,
            TemporalPredicate::Before(date) | TemporalPredicate::After(date) => date.is_period_ref(),
        }
    }
}

/// Evaluate a guard at a reference date
///
/// An unbound period reference never holds.
pub fn holds(predicate: &TemporalPredicate, at: NaiveDate) -> bool {
    match predicate {
        TemporalPredicate::Anytime => true,
        TemporalPredicate::Before(date) => date.fixed().is_some_and(|t| at < t),
        TemporalPredicate::After(date) => date.fixed().is_some_and(|t| at > t),
    }
}

/// Always-true guard
pub fn anytime() -> TemporalPredicate {
    TemporalPredicate::Anytime
}

/// Guard holding strictly before `date`
pub fn before(date: impl Into<DateRef>) -> TemporalPredicate {
    TemporalPredicate::Before(date.into())
}

/// Guard holding strictly after `date`
pub fn after(date: impl Into<DateRef>) -> TemporalPredicate {
    TemporalPredicate::After(date.into())
}

impl fmt::Display for TemporalPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemporalPredicate::Anytime => write!(f, "anytime"),
            TemporalPredicate::Before(date) => write!(f, "before {}", date),
            TemporalPredicate::After(date) => write!(f, "after {}", date),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32, month: u32, year: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_after_is_strict() {
        let guard = after(d(1, 7, 2015));
        assert!(!holds(&guard, d(30, 6, 2015)));
        assert!(!holds(&guard, d(1, 7, 2015)));
        assert!(holds(&guard, d(2, 7, 2015)));
    }

    #[test]
    fn test_before_is_strict() {
        let guard = before(d(1, 7, 2015));
        assert!(holds(&guard, d(30, 6, 2015)));
        assert!(!holds(&guard, d(1, 7, 2015)));
    }

    #[test]
    fn test_guard_monotonicity() {
        let after_guard = after(d(15, 3, 2016));
        let before_guard = before(d(15, 3, 2016));
        let start = d(1, 1, 2016);

        for offset in 0..180 {
            let r = start + chrono::Days::new(offset);
            if holds(&after_guard, r) {
                for later in 0..30 {
                    assert!(holds(&after_guard, r + chrono::Days::new(later)));
                }
            }
            if holds(&before_guard, r) {
                for earlier in 0..30 {
                    assert!(holds(&before_guard, r - chrono::Days::new(earlier)));
                }
            }
        }
    }

    #[test]
    fn test_anytime_and_unbound() {
        assert!(holds(&anytime(), d(1, 1, 1970)));
        assert!(!holds(&after(DateRef::PeriodEnd), d(1, 1, 2100)));
        assert!(after(DateRef::PeriodEnd).has_period_ref());

        let bound = after(DateRef::PeriodEnd).bind(d(1, 1, 2015), d(1, 4, 2015));
        assert_eq!(bound, after(d(1, 4, 2015)));
    }
}
