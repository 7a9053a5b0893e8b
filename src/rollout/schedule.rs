//! Schedule periods

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::contract::ConstructionError;
use crate::expression::Amount;
use crate::temporal::format_date;

/// Period length of a rollout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Annually,
}

impl Frequency {
    /// The `n`-th boundary after `start`, always counted from `start` so that
    /// month-end clamping does not accumulate
    pub fn boundary(&self, start: NaiveDate, n: u32) -> Option<NaiveDate> {
        match self {
            Frequency::Daily => start.checked_add_days(Days::new(n as u64)),
            Frequency::Weekly => start.checked_add_days(Days::new(7 * n as u64)),
            Frequency::Monthly => start.checked_add_months(Months::new(n)),
            Frequency::Quarterly => start.checked_add_months(Months::new(n.checked_mul(3)?)),
            Frequency::Annually => start.checked_add_months(Months::new(n.checked_mul(12)?)),
        }
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "quarterly" => Ok(Frequency::Quarterly),
            "annually" | "annual" | "yearly" => Ok(Frequency::Annually),
            other => Err(format!("Unknown frequency: {}", other)),
        }
    }
}

/// One period of a schedule, `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Period {
    pub index: usize,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} [{}, {})", self.index, format_date(self.start), format_date(self.end))
    }
}

/// Date range, frequency and initial state of a rollout
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RolloutSchedule {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub frequency: Frequency,
    /// Initial value of each state variable
    pub variables: BTreeMap<String, Amount>,
}

impl RolloutSchedule {
    pub fn new(start: NaiveDate, end: NaiveDate, frequency: Frequency) -> Self {
        Self {
            start,
            end,
            frequency,
            variables: BTreeMap::new(),
        }
    }

    /// Reject empty or unrepresentable schedules and non-literal initial values
    ///
    /// Initial values may not reference other state variables: there is no
    /// earlier period for them to come from.
    pub fn validate(&self) -> Result<(), ConstructionError> {
        if self.end <= self.start {
            return Err(ConstructionError::MalformedSchedule {
                detail: format!(
                    "end {} is not after start {}",
                    format_date(self.end),
                    format_date(self.start)
                ),
            });
        }
        if self.frequency.boundary(self.start, 1).is_none() {
            return Err(ConstructionError::MalformedSchedule {
                detail: "first period end is out of range".to_string(),
            });
        }
        for (name, initial) in &self.variables {
            let mut refs = std::collections::BTreeSet::new();
            initial.collect_state_refs(&mut refs);
            if !refs.is_empty() || initial.has_period_ref() {
                return Err(ConstructionError::MalformedSchedule {
                    detail: format!("initial value of '{}' must not depend on rollout bindings", name),
                });
            }
        }
        Ok(())
    }

    /// All periods in order; the last is truncated at `end`
    pub fn periods(&self) -> Vec<Period> {
        (0..).map_while(|index| self.period(index)).collect()
    }

    /// The period at `index`, computed from its boundaries without walking
    /// the earlier ones
    pub fn period(&self, index: usize) -> Option<Period> {
        let n = u32::try_from(index).ok()?;
        let start = self.frequency.boundary(self.start, n)?;
        if start >= self.end {
            return None;
        }
        let end = n
            .checked_add(1)
            .and_then(|next| self.frequency.boundary(self.start, next))
            .map_or(self.end, |next| next.min(self.end));
        Some(Period { index, start, end })
    }

    pub fn period_count(&self) -> usize {
        (0..).take_while(|&index| self.period(index).is_some()).count()
    }
}
