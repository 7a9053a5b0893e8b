//! Contract parties and party-choice sets

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::ops::BitOr;

use crate::currency::Currency;
use crate::expression::Amount;
use super::obligation::Obligation;

/// Opaque contract participant, compared by name
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Party(String);

impl Party {
    pub fn new(name: &str) -> Self {
        Party(name.to_string())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// Party set in which either party may act
    pub fn or(&self, other: impl Into<PartySet>) -> PartySet {
        PartySet::from(self).or(other)
    }

    /// Obligation of this party to pay `payee`
    pub fn gives(&self, payee: &Party, amount: impl Into<Amount>, currency: Currency) -> Obligation {
        Obligation::new(self.clone(), payee.clone(), amount, currency)
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parties any one of whom may elect an action
///
/// `or` is set union, so it is associative and commutative and a party listed
/// twice counts once.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartySet(BTreeSet<Party>);

impl PartySet {
    pub fn or(mut self, other: impl Into<PartySet>) -> PartySet {
        self.0.extend(other.into().0);
        self
    }

    pub fn contains(&self, party: &Party) -> bool {
        self.0.contains(party)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Party> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Party> for PartySet {
    fn from(party: Party) -> Self {
        PartySet(BTreeSet::from([party]))
    }
}

impl From<&Party> for PartySet {
    fn from(party: &Party) -> Self {
        PartySet::from(party.clone())
    }
}

impl<T: Into<PartySet>> BitOr<T> for PartySet {
    type Output = PartySet;
    fn bitor(self, rhs: T) -> PartySet {
        self.or(rhs)
    }
}

impl<T: Into<PartySet>> BitOr<T> for &Party {
    type Output = PartySet;
    fn bitor(self, rhs: T) -> PartySet {
        self.or(rhs)
    }
}

impl fmt::Display for PartySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(|p| p.name()).collect();
        write!(f, "{}", names.join(" or "))
    }
}
