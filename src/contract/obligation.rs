//! Monetary transfers between parties

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::currency::Currency;
use crate::expression::{evaluate, Amount, Environment, EvalError};
use super::party::Party;

/// Transfer of an amount expression from `payer` to `payee`
///
/// The amount is only checked when the obligation is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Obligation {
    pub payer: Party,
    pub payee: Party,
    pub amount: Amount,
    pub currency: Currency,
}

/// Obligation whose amount has been evaluated
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedObligation {
    pub payer: Party,
    pub payee: Party,
    pub amount: Decimal,
    pub currency: Currency,
}

impl Obligation {
    pub fn new(payer: Party, payee: Party, amount: impl Into<Amount>, currency: Currency) -> Self {
        Self {
            payer,
            payee,
            amount: amount.into(),
            currency,
        }
    }

    /// Evaluate the amount against `env`
    pub fn resolve(&self, env: &Environment<'_>) -> Result<ResolvedObligation, EvalError> {
        Ok(ResolvedObligation {
            payer: self.payer.clone(),
            payee: self.payee.clone(),
            amount: evaluate(&self.amount, env)?,
            currency: self.currency,
        })
    }
}

impl fmt::Display for Obligation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} gives {} {} {}", self.payer, self.payee, self.amount, self.currency)
    }
}

impl fmt::Display for ResolvedObligation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}: {} {}", self.payer, self.payee, self.amount, self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::{var, Bindings, EvalErrorKind};
    use rust_decimal_macros::dec;

    #[test]
    fn test_resolve_obligation() {
        let bank = Party::new("highStreetBank");
        let corp = Party::new("acmeCorp");
        let obligation = corp.gives(&bank, var("fee") * 2, Currency::USD);

        let bindings = Bindings::new().with("fee", dec!(5000));
        let resolved = obligation.resolve(&Environment::without_market_data(&bindings)).unwrap();
        assert_eq!(resolved.amount, dec!(10000));
        assert_eq!(resolved.payer, corp);
        assert_eq!(resolved.to_string(), "acmeCorp -> highStreetBank: 10000 USD");

        let empty = Bindings::new();
        let err = obligation.resolve(&Environment::without_market_data(&empty)).unwrap_err();
        assert_eq!(err.kind(), EvalErrorKind::UnboundVariable);
    }
}
