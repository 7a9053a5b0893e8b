//! In-memory observable values

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::currency::Currency;
use crate::expression::{ObservableKey, ObservableResolver};

/// Observable values keyed by their fully bound key
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixingTable {
    values: BTreeMap<ObservableKey, Decimal>,
}

impl FixingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, returning the one it replaced
    pub fn insert(&mut self, key: ObservableKey, value: Decimal) -> Option<Decimal> {
        self.values.insert(key, value)
    }

    pub fn with_fixing(mut self, index: &str, start: NaiveDate, end: NaiveDate, rate: Decimal) -> Self {
        self.insert(ObservableKey::Fixing { index: index.to_string(), start, end }, rate);
        self
    }

    pub fn with_fx(mut self, base: Currency, quote: Currency, on: NaiveDate, rate: Decimal) -> Self {
        self.insert(ObservableKey::FxSpot { base, quote, on }, rate);
        self
    }

    pub fn with_quote(mut self, name: &str, on: NaiveDate, value: Decimal) -> Self {
        self.insert(ObservableKey::Quote { name: name.to_string(), on }, value);
        self
    }

    pub fn get(&self, key: &ObservableKey) -> Option<Decimal> {
        self.values.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Merge `other` into this table; `other` wins on conflicts
    pub fn extend(&mut self, other: FixingTable) {
        self.values.extend(other.values);
    }
}

impl ObservableResolver for FixingTable {
    fn resolve(&self, key: &ObservableKey) -> Option<Decimal> {
        self.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::{evaluate, fx, libor, Bindings, Environment};
    use rust_decimal_macros::dec;

    fn d(day: u32, month: u32, year: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_table_resolves_observables() {
        let table = FixingTable::new()
            .with_fixing("LIBOR", d(1, 7, 2015), d(1, 10, 2015), dec!(0.004))
            .with_fx(Currency::EUR, Currency::USD, d(1, 4, 2015), dec!(1.08));
        let bindings = Bindings::new();
        let env = Environment::new(&bindings, &table);

        assert_eq!(evaluate(&fx(Currency::EUR, Currency::USD, d(1, 4, 2015)), &env).unwrap(), dec!(1.08));

        // 92 days act/360 on 9m at 0.4%
        let leg = libor(9_000_000, d(1, 7, 2015), d(1, 10, 2015));
        assert_eq!(evaluate(&leg, &env).unwrap(), dec!(9200));

        assert!(evaluate(&fx(Currency::USD, Currency::EUR, d(1, 4, 2015)), &env).is_err());
    }

    #[test]
    fn test_extend_overrides() {
        let mut base = FixingTable::new().with_quote("VIX", d(1, 1, 2015), dec!(19.2));
        base.extend(FixingTable::new().with_quote("VIX", d(1, 1, 2015), dec!(20.1)));

        assert_eq!(base.len(), 1);
        let key = ObservableKey::Quote { name: "VIX".to_string(), on: d(1, 1, 2015) };
        assert_eq!(base.get(&key), Some(dec!(20.1)));
    }
}
