//! Rollout expansion: periodic schedules threading state through `next`
//!
//! A rollout body is a template. [`expand`] instantiates its first period,
//! binding `start`/`end` and the `vars.<name>` snapshot; each `next(...)` in
//! the body becomes a [`Resume`] that, once its action is elected, produces
//! the following period's instantiation (or `Zero` after the last period).

mod expander;
mod schedule;

pub use expander::{expand, roll_out, Resume, Rollout, RolloutBuilder};
pub use schedule::{Frequency, Period, RolloutSchedule};
