//! Date handling and temporal guards
//!
//! Guards are evaluated against a caller-supplied reference date, never the
//! wall clock, so every holder of an arrangement reaches the same answer.

mod dates;
mod predicate;

pub use dates::{parse_date, format_date, DateRef, DateParseError, DATE_FORMAT};
pub use predicate::{holds, TemporalPredicate, anytime, before, after};
