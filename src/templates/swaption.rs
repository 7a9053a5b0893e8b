//! Cancellable swap on LIBOR against a fixed coupon
//!
//! Notional and coupon are environment variables (`notional`, `coupon`), so
//! one tree serves any trade size. Each `proceed` settles in arrears: once an
//! accrual period has ended it exchanges a floating leg for a fixed leg over
//! that period and unlocks the next; `cancel` ends the trade for a flat fee.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::contract::{action, actions, arrange, zero, ActionBuilder, Arrangement, ConstructionError, Party};
use crate::currency::Currency;
use crate::expression::{interest, libor, var, DayCount};
use crate::temporal::after;
use super::calendar;

#[derive(Debug, Clone)]
pub struct SwaptionTerms {
    /// Pays the floating leg
    pub bank: Party,
    /// Pays the fixed leg and holds the cancellation right
    pub corp: Party,
    /// Accrual boundaries; consecutive pairs form one exchange each
    pub accrual_dates: Vec<NaiveDate>,
    pub fixed_day_count: DayCount,
    pub cancellation_fee: Decimal,
    pub currency: Currency,
}

impl Default for SwaptionTerms {
    fn default() -> Self {
        Self {
            bank: Party::new("highStreetBank"),
            corp: Party::new("acmeCorp"),
            accrual_dates: vec![calendar(2015, 4, 1), calendar(2015, 7, 1), calendar(2015, 10, 1)],
            fixed_day_count: DayCount::Act365,
            cancellation_fee: dec!(10000),
            currency: Currency::USD,
        }
    }
}

impl SwaptionTerms {
    pub fn build(&self) -> Result<Arrangement, ConstructionError> {
        let periods: Vec<(NaiveDate, NaiveDate)> =
            self.accrual_dates.windows(2).map(|w| (w[0], w[1])).collect();
        if periods.iter().any(|(start, end)| end <= start) {
            return Err(ConstructionError::MalformedSchedule {
                detail: "accrual dates must be increasing".to_string(),
            });
        }
        let Some((&(first_start, first_end), rest)) = periods.split_first() else {
            return Err(ConstructionError::MalformedSchedule {
                detail: "swaption needs at least two accrual dates".to_string(),
            });
        };

        // Later exchanges nest from the back so each proceed holds its successor
        let mut tail = zero();
        for &(start, end) in rest.iter().rev() {
            tail = actions([self.exchange(start, end).then(tail)])?;
        }

        arrange(actions([
            self.exchange(first_start, first_end).then(tail),
            action("cancel", &self.corp)
                .anytime()
                .gives(&self.corp, &self.bank, self.cancellation_fee, self.currency)
                .then(zero()),
        ])?)
    }

    /// Floating against fixed over `[start, end)`, available once `end` has passed
    fn exchange(&self, start: NaiveDate, end: NaiveDate) -> ActionBuilder {
        action("proceed", self.bank.or(&self.corp))
            .given_that(after(end))
            .gives(&self.bank, &self.corp, libor(var("notional"), start, end), self.currency)
            .gives(
                &self.corp,
                &self.bank,
                interest(var("notional"), self.fixed_day_count, var("coupon"), start, end),
                self.currency,
            )
    }
}
