//! Deliverable FX forward with a cash-settlement alternative

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::contract::{action, actions, arrange, zero, Arrangement, ConstructionError, Party};
use crate::currency::Currency;
use crate::expression::{constant, fx};
use crate::temporal::after;
use super::calendar;

#[derive(Debug, Clone)]
pub struct FxForwardTerms {
    /// Receives `base`, pays `quote`
    pub buyer: Party,
    pub seller: Party,
    pub base: Currency,
    pub quote: Currency,
    pub notional: Decimal,
    pub forward_rate: Decimal,
    pub maturity: NaiveDate,
}

impl Default for FxForwardTerms {
    fn default() -> Self {
        Self {
            buyer: Party::new("acmeCorp"),
            seller: Party::new("highStreetBank"),
            base: Currency::EUR,
            quote: Currency::USD,
            notional: dec!(1000000),
            forward_rate: dec!(1.12),
            maturity: calendar(2015, 6, 30),
        }
    }
}

impl FxForwardTerms {
    pub fn build(&self) -> Result<Arrangement, ConstructionError> {
        let parties = self.buyer.or(&self.seller);
        let spot = fx(self.base, self.quote, self.maturity);
        let difference = (spot - self.forward_rate) * self.notional;

        arrange(actions([
            action("deliver", parties.clone())
                .given_that(after(self.maturity))
                .gives(&self.seller, &self.buyer, self.notional, self.base)
                .gives(&self.buyer, &self.seller, constant(self.notional) * self.forward_rate, self.quote)
                .then(zero()),
            // Only one of the two legs is non-zero
            action("cashSettle", parties)
                .given_that(after(self.maturity))
                .gives(&self.seller, &self.buyer, difference.clone().plus(), self.quote)
                .gives(&self.buyer, &self.seller, (-difference).plus(), self.quote)
                .then(zero()),
        ])?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::elect;
    use crate::expression::{Bindings, Environment};
    use crate::market::FixingTable;
    use crate::temporal::parse_date;

    fn d(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn test_deliver_exchanges_notionals() {
        let terms = FxForwardTerms::default();
        let bindings = Bindings::new();
        let env = Environment::without_market_data(&bindings);

        let election = elect(&terms.build().unwrap(), &terms.buyer, "deliver", d("01/07/2015"), &env).unwrap();
        assert_eq!(election.effects[0].amount, dec!(1000000));
        assert_eq!(election.effects[0].currency, Currency::EUR);
        assert_eq!(election.effects[1].amount, dec!(1120000));
        assert_eq!(election.effects[1].currency, Currency::USD);
    }

    #[test]
    fn test_cash_settle_pays_difference_one_way() {
        let terms = FxForwardTerms::default();
        let market = FixingTable::new().with_fx(Currency::EUR, Currency::USD, d("30/06/2015"), dec!(1.09));
        let bindings = Bindings::new();
        let env = Environment::new(&bindings, &market);

        let election = elect(&terms.build().unwrap(), &terms.seller, "cashSettle", d("01/07/2015"), &env).unwrap();
        assert_eq!(election.effects[0].amount, dec!(0));
        assert_eq!(election.effects[1].payer, terms.buyer);
        assert_eq!(election.effects[1].amount, dec!(30000));
    }
}
