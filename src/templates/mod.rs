//! Ready-made contract templates
//!
//! Each template is a terms struct with `Default` market-standard settings and
//! a `build` method producing a validated [`crate::contract::Arrangement`].

mod fx_forward;
mod swap;
mod swaption;
mod tarf;

pub use fx_forward::FxForwardTerms;
pub use swap::SwapTerms;
pub use swaption::SwaptionTerms;
pub use tarf::TarfTerms;

use chrono::NaiveDate;

/// Calendar date from literal parts of a template default
///
/// Panics on an impossible date. Callers pass compile-time literals only, so a
/// panic here is a typo in a default.
pub(crate) fn calendar(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("template default is a valid calendar date")
}
