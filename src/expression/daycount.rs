//! Day-count conventions for interest accrual

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Day-count convention: accrual days over a fixed basis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayCount {
    /// Actual days / 365
    Act365,
    /// Actual days / 360 (money-market convention, used for LIBOR)
    Act360,
    /// US 30/360 bond basis
    Thirty360,
}

impl DayCount {
    /// Days counted between two dates under this convention (negative if `end` precedes `start`)
    pub fn accrual_days(&self, start: NaiveDate, end: NaiveDate) -> i64 {
        match self {
            DayCount::Act365 | DayCount::Act360 => (end - start).num_days(),
            DayCount::Thirty360 => {
                let d1 = start.day().min(30) as i64;
                let d2 = if d1 == 30 { end.day().min(30) } else { end.day() } as i64;
                360 * (end.year() as i64 - start.year() as i64)
                    + 30 * (end.month() as i64 - start.month() as i64)
                    + (d2 - d1)
            }
        }
    }

    /// Days in the year fraction's denominator
    pub fn basis(&self) -> i64 {
        match self {
            DayCount::Act365 => 365,
            DayCount::Act360 | DayCount::Thirty360 => 360,
        }
    }
}

impl fmt::Display for DayCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayCount::Act365 => write!(f, "act/365"),
            DayCount::Act360 => write!(f, "act/360"),
            DayCount::Thirty360 => write!(f, "30/360"),
        }
    }
}

impl FromStr for DayCount {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "act/365" | "actual/365" => Ok(DayCount::Act365),
            "act/360" | "actual/360" => Ok(DayCount::Act360),
            "30/360" => Ok(DayCount::Thirty360),
            other => Err(format!("Unknown day count: {}", other)),
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
    fn test_act_conventions() {
        // 01/04/2015 -> 01/07/2015 is 91 days
        assert_eq!(DayCount::Act360.accrual_days(d(1, 4, 2015), d(1, 7, 2015)), 91);
        assert_eq!(DayCount::Act360.basis(), 360);
        assert_eq!(DayCount::Act365.accrual_days(d(1, 1, 2015), d(1, 1, 2016)), 365);
        assert_eq!(DayCount::Act365.basis(), 365);
        assert_eq!(DayCount::Act365.accrual_days(d(1, 7, 2015), d(1, 4, 2015)), -91);
    }

    #[test]
    fn test_thirty_360() {
        assert_eq!(DayCount::Thirty360.accrual_days(d(31, 1, 2015), d(30, 4, 2015)), 90);
        assert_eq!(DayCount::Thirty360.accrual_days(d(15, 3, 2015), d(15, 9, 2015)), 180);
        assert_eq!(DayCount::Thirty360.basis(), 360);
    }

    #[test]
    fn test_parse() {
        assert_eq!("act/365".parse::<DayCount>().unwrap(), DayCount::Act365);
        assert_eq!("ACT/360".parse::<DayCount>().unwrap(), DayCount::Act360);
        assert!("bus/252".parse::<DayCount>().is_err());
    }
}
