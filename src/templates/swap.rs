//! Vanilla fixed-for-floating interest rate swap as a rollout

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::contract::{action, actions, Arrangement, ConstructionError, Party};
use crate::currency::Currency;
use crate::expression::{fixing, interest, DayCount};
use crate::rollout::{roll_out, Frequency};
use crate::temporal::{after, DateRef};
use super::calendar;

#[derive(Debug, Clone)]
pub struct SwapTerms {
    pub floating_payer: Party,
    pub fixed_payer: Party,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub frequency: Frequency,
    pub notional: Decimal,
    pub fixed_rate: Decimal,
    pub fixed_day_count: DayCount,
    pub floating_index: String,
    pub floating_day_count: DayCount,
    pub currency: Currency,
}

impl Default for SwapTerms {
    fn default() -> Self {
        Self {
            floating_payer: Party::new("highStreetBank"),
            fixed_payer: Party::new("acmeCorp"),
            start: calendar(2015, 1, 1),
            end: calendar(2016, 1, 1),
            frequency: Frequency::Quarterly,
            notional: dec!(10000000),
            fixed_rate: dec!(0.015),
            fixed_day_count: DayCount::Thirty360,
            floating_index: "LIBOR".to_string(),
            floating_day_count: DayCount::Act360,
            currency: Currency::USD,
        }
    }
}

impl SwapTerms {
    pub fn build(&self) -> Result<Arrangement, ConstructionError> {
        let (start, end) = (DateRef::PeriodStart, DateRef::PeriodEnd);
        let floating = interest(
            self.notional,
            self.floating_day_count,
            fixing(&self.floating_index, start, end),
            start,
            end,
        );
        let fixed = interest(self.notional, self.fixed_day_count, self.fixed_rate, start, end);

        let body = actions([action("proceed", self.floating_payer.or(&self.fixed_payer))
            .given_that(after(end))
            .gives(&self.floating_payer, &self.fixed_payer, floating, self.currency)
            .gives(&self.fixed_payer, &self.floating_payer, fixed, self.currency)
            .next()])?;

        roll_out(self.start, self.end, self.frequency).body(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::{elect, ElectionError};
    use crate::expression::{Bindings, Environment, EvalErrorKind};
    use crate::market::FixingTable;
    use crate::temporal::parse_date;

    fn d(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    const BOUNDARIES: [&str; 5] = ["01/01/2015", "01/04/2015", "01/07/2015", "01/10/2015", "01/01/2016"];

    fn market() -> FixingTable {
        BOUNDARIES.windows(2).fold(FixingTable::new(), |table, w| {
            table.with_fixing("LIBOR", d(w[0]), d(w[1]), dec!(0.0036))
        })
    }

    #[test]
    fn test_swap_runs_every_period() {
        let terms = SwapTerms::default();
        let market = market();
        let bindings = Bindings::new();
        let env = Environment::new(&bindings, &market);

        let mut current = terms.build().unwrap();
        let mut count = 0;
        while !current.is_zero() {
            let at = d(BOUNDARIES[count + 1]) + chrono::Days::new(1);
            let election = elect(&current, &terms.fixed_payer, "proceed", at, &env).unwrap();
            if count == 0 {
                // 90 days act/360 floating, 90 days 30/360 fixed
                assert_eq!(election.effects[0].amount, dec!(9000));
                assert_eq!(election.effects[1].amount, dec!(37500));
            }
            current = election.successor;
            count += 1;
        }
        assert_eq!(count, 4);
    }

    #[test]
    fn test_missing_fixing_fails_election() {
        let terms = SwapTerms::default();
        let bindings = Bindings::new();
        let env = Environment::without_market_data(&bindings);
        let tree = terms.build().unwrap();

        match elect(&tree, &terms.floating_payer, "proceed", d("02/04/2015"), &env) {
            Err(ElectionError::Eval(err)) => assert_eq!(err.kind(), EvalErrorKind::ObservableUnavailable),
            other => panic!("expected missing fixing, got {:?}", other),
        }
    }
}
