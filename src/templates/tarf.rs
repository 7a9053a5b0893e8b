//! Target redemption forward
//!
//! Each period the client may exercise; the forward then settles at period
//! end, paying the positive difference between spot and strike on the
//! notional. Payouts are capped by the remaining target, and the number of
//! exercises is bounded by `uses`. Both counters thread through the rollout.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::contract::{action, actions, Arrangement, ConstructionError, Party};
use crate::currency::Currency;
use crate::expression::{fx, select, state, Amount, CompareOp};
use crate::rollout::{roll_out, Frequency};
use crate::temporal::{after, DateRef};
use super::calendar;

#[derive(Debug, Clone)]
pub struct TarfTerms {
    /// Pays the payout
    pub bank: Party,
    /// Holds the exercise right
    pub corp: Party,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub frequency: Frequency,
    /// Currency pair observed at each period end
    pub base: Currency,
    pub quote: Currency,
    pub strike: Decimal,
    /// Amount of `base` per settlement
    pub notional: Decimal,
    /// Total payout target, in `quote`
    pub target: Decimal,
    /// Maximum number of exercises
    pub uses: u32,
}

impl Default for TarfTerms {
    fn default() -> Self {
        Self {
            bank: Party::new("highStreetBank"),
            corp: Party::new("acmeCorp"),
            start: calendar(2015, 1, 1),
            end: calendar(2016, 1, 1),
            frequency: Frequency::Quarterly,
            base: Currency::EUR,
            quote: Currency::USD,
            strike: dec!(1.10),
            notional: dec!(1000000),
            target: dec!(150000),
            uses: 4,
        }
    }
}

impl TarfTerms {
    /// Settlement amount for the current period
    fn payout(&self) -> Amount {
        let spot = fx(self.base, self.quote, DateRef::PeriodEnd);
        let capped = ((spot - self.strike) * self.notional).plus().min(state("cap"));
        select(state("uses").compare(CompareOp::Gt, 0), capped, 0)
    }

    pub fn build(&self) -> Result<Arrangement, ConstructionError> {
        let payout = self.payout();

        let settle = actions([action("proceed", self.bank.or(&self.corp))
            .given_that(after(DateRef::PeriodEnd))
            .gives(&self.bank, &self.corp, payout.clone(), self.quote)
            .next_with([
                ("uses", state("uses") - 1),
                ("cap", state("cap") - payout),
            ])])?;

        let body = actions([
            action("exercise", &self.corp).anytime().then(settle),
            action("proceedWithoutExercise", self.bank.or(&self.corp))
                .given_that(after(DateRef::PeriodEnd))
                .next(),
        ])?;

        roll_out(self.start, self.end, self.frequency)
            .var("uses", Decimal::from(self.uses))
            .var("cap", self.target)
            .body(body)
    }
}
