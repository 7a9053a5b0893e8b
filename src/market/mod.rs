//! Market data supplied to evaluation
//!
//! A [`FixingTable`] is a plain in-memory [`crate::expression::ObservableResolver`]
//! loaded from CSV or filled programmatically.

mod fixings;
mod loader;

pub use fixings::FixingTable;
pub use loader::{load_fixings, load_fixings_from_reader};
