//! Contract dates and the textual date format used at the authoring boundary

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Textual date format accepted by authoring helpers, CSV loaders and the CLI (dd/MM/yyyy)
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Error raised when a date string does not match [`DATE_FORMAT`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid date '{input}': expected dd/MM/yyyy")]
pub struct DateParseError {
    pub input: String,
}

/// Parse a date in dd/MM/yyyy form
pub fn parse_date(input: &str) -> Result<NaiveDate, DateParseError> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT).map_err(|_| DateParseError {
        input: input.to_string(),
    })
}

/// Format a date in dd/MM/yyyy form
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// A date as written in a contract
///
/// Inside a rollout body, `PeriodStart`/`PeriodEnd` refer to the bounds of the
/// period being instantiated. Instantiation replaces them with `Fixed` dates, so
/// a tree that is ready for evaluation only contains fixed dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DateRef {
    Fixed(NaiveDate),
    PeriodStart,
    PeriodEnd,
}

impl DateRef {
    /// The concrete date, if this reference has been bound
    pub fn fixed(&self) -> Option<NaiveDate> {
        match self {
            DateRef::Fixed(date) => Some(*date),
            DateRef::PeriodStart | DateRef::PeriodEnd => None,
        }
    }

    /// Whether this refers to a rollout period bound
    pub fn is_period_ref(&self) -> bool {
        !matches!(self, DateRef::Fixed(_))
    }

    /// Bind period references to the given period bounds
    pub fn bind(&self, start: NaiveDate, end: NaiveDate) -> DateRef {
        match self {
            DateRef::Fixed(date) => DateRef::Fixed(*date),
            DateRef::PeriodStart => DateRef::Fixed(start),
            DateRef::PeriodEnd => DateRef::Fixed(end),
        }
    }
}

impl From<NaiveDate> for DateRef {
    fn from(date: NaiveDate) -> Self {
        DateRef::Fixed(date)
    }
}

impl fmt::Display for DateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateRef::Fixed(date) => write!(f, "{}", format_date(*date)),
            DateRef::PeriodStart => write!(f, "start"),
            DateRef::PeriodEnd => write!(f, "end"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_day_first() {
        let date = parse_date("01/07/2015").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2015, 7, 1).unwrap());
        assert_eq!(format_date(date), "01/07/2015");
    }

    #[test]
    fn test_parse_date_rejects_iso() {
        let err = parse_date("2015-07-01").unwrap_err();
        assert_eq!(err.input, "2015-07-01");
        assert!(parse_date("31/02/2015").is_err());
    }

    #[test]
    fn test_bind_period_refs() {
        let start = NaiveDate::from_ymd_opt(2015, 4, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2015, 7, 1).unwrap();

        assert_eq!(DateRef::PeriodStart.bind(start, end), DateRef::Fixed(start));
        assert_eq!(DateRef::PeriodEnd.bind(start, end), DateRef::Fixed(end));
        assert!(DateRef::PeriodEnd.fixed().is_none());
        assert!(!DateRef::Fixed(start).is_period_ref());
    }
}
