//! Canonical byte form and content hashing
//!
//! Holders that exchange arrangements by content hash must agree on the bytes.
//! The canonical form is compact JSON produced by `serde_json` from the tree's
//! type definitions: struct fields in declaration order, maps as `BTreeMap`
//! (sorted keys), decimals as strings, dates as ISO strings. Decoding
//! re-validates the tree, so a decoded value is election-equivalent to the one
//! that was encoded.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use crate::contract::{validate, Arrangement, ConstructionError};
use crate::expression::Bindings;

#[derive(Debug, thiserror::Error)]
pub enum CanonicalError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("decoded arrangement is invalid: {0}")]
    Construction(#[from] ConstructionError),

    #[error("invalid content hash '{0}'")]
    InvalidHash(String),
}

/// SHA-256 of a canonical encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    pub fn of_bytes(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        ContentHash(hasher.finalize().into())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for ContentHash {
    type Err = CanonicalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|_| CanonicalError::InvalidHash(s.to_string()))?;
        let array: [u8; 32] = bytes
            .try_into()
            .map_err(|_| CanonicalError::InvalidHash(s.to_string()))?;
        Ok(ContentHash(array))
    }
}

impl Serialize for ContentHash {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ContentHash {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Canonical bytes of an arrangement
pub fn to_canonical_bytes(arrangement: &Arrangement) -> Result<Vec<u8>, CanonicalError> {
    Ok(serde_json::to_vec(arrangement)?)
}

/// Decode and validate an arrangement
pub fn from_canonical_bytes(bytes: &[u8]) -> Result<Arrangement, CanonicalError> {
    let arrangement: Arrangement = serde_json::from_slice(bytes)?;
    validate(&arrangement)?;
    Ok(arrangement)
}

/// Content hash of an arrangement
pub fn content_hash(arrangement: &Arrangement) -> Result<ContentHash, CanonicalError> {
    Ok(ContentHash::of_bytes(&to_canonical_bytes(arrangement)?))
}

/// An arrangement together with the environment bindings it is evaluated under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractSnapshot {
    pub arrangement: Arrangement,
    #[serde(default)]
    pub bindings: Bindings,
}

impl ContractSnapshot {
    pub fn new(arrangement: Arrangement, bindings: Bindings) -> Self {
        Self { arrangement, bindings }
    }

    pub fn to_canonical_bytes(&self) -> Result<Vec<u8>, CanonicalError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_canonical_bytes(bytes: &[u8]) -> Result<Self, CanonicalError> {
        let snapshot: ContractSnapshot = serde_json::from_slice(bytes)?;
        validate(&snapshot.arrangement)?;
        Ok(snapshot)
    }

    pub fn content_hash(&self) -> Result<ContentHash, CanonicalError> {
        Ok(ContentHash::of_bytes(&self.to_canonical_bytes()?))
    }

    /// Pretty JSON for files meant to be read by people; not canonical
    pub fn to_json_pretty(&self) -> Result<String, CanonicalError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{action, actions, arrange, zero, Party};
    use crate::currency::Currency;
    use crate::evaluator::elect;
    use crate::expression::{var, Environment};
    use crate::market::FixingTable;
    use crate::rollout::Resume;
    use crate::templates::TarfTerms;
    use crate::temporal::{after, parse_date};
    use rust_decimal_macros::dec;

    fn sample() -> Arrangement {
        let bank = Party::new("highStreetBank");
        let corp = Party::new("acmeCorp");
        arrange(
            actions([
                action("proceed", bank.or(&corp))
                    .given_that(after(parse_date("01/07/2015").unwrap()))
                    .gives(&bank, &corp, var("notional") * dec!(0.01), Currency::USD)
                    .then(zero()),
                action("cancel", &corp).gives(&corp, &bank, 10_000, Currency::USD),
            ])
            .unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_round_trip_preserves_tree_and_hash() {
        let tree = sample();
        let bytes = to_canonical_bytes(&tree).unwrap();
        let decoded = from_canonical_bytes(&bytes).unwrap();

        assert_eq!(decoded, tree);
        assert_eq!(content_hash(&decoded).unwrap(), content_hash(&tree).unwrap());
        assert_eq!(to_canonical_bytes(&decoded).unwrap(), bytes);
    }

    #[test]
    fn test_hash_distinguishes_trees() {
        let tree = sample();
        assert_ne!(content_hash(&tree).unwrap(), content_hash(&Arrangement::Zero).unwrap());
    }

    #[test]
    fn test_hash_hex_round_trip() {
        let hash = content_hash(&sample()).unwrap();
        let hex = hash.to_string();
        assert_eq!(hex.len(), 64);
        assert_eq!(hex.parse::<ContentHash>().unwrap(), hash);
        assert!("abc".parse::<ContentHash>().is_err());
    }

    #[test]
    fn test_decode_rejects_invalid_tree() {
        let bad = br#"{"Next":{"rebinds":[]}}"#;
        assert!(matches!(
            from_canonical_bytes(bad),
            Err(CanonicalError::Construction(ConstructionError::DirectiveOutsideRollout))
        ));
    }

    fn tarf_market() -> FixingTable {
        [
            ("01/04/2015", dec!(1.15)),
            ("01/07/2015", dec!(1.20)),
            ("01/10/2015", dec!(1.18)),
            ("01/01/2016", dec!(1.05)),
        ]
        .iter()
        .fold(FixingTable::new(), |table, (on, spot)| {
            table.with_fx(Currency::EUR, Currency::USD, parse_date(on).unwrap(), *spot)
        })
    }

    /// A TARF after its first exercise has settled, positioned in period two
    fn tarf_after_first_period(terms: &TarfTerms, env: &Environment<'_>) -> Arrangement {
        let tree = terms.build().unwrap();
        let exercised = elect(&tree, &terms.corp, "exercise", parse_date("15/02/2015").unwrap(), env).unwrap();
        elect(&exercised.successor, &terms.bank, "proceed", parse_date("02/04/2015").unwrap(), env)
            .unwrap()
            .successor
    }

    fn resume_of(tree: &Arrangement) -> Resume {
        match &tree.action_set().unwrap().get("proceedWithoutExercise").unwrap().continuation {
            Arrangement::Resume(resume) => (**resume).clone(),
            other => panic!("expected bound next, got {:?}", other),
        }
    }

    #[test]
    fn test_mid_rollout_round_trip_elects_identically() {
        let terms = TarfTerms::default();
        let market = tarf_market();
        let bindings = Bindings::new();
        let env = Environment::new(&bindings, &market);

        let original = tarf_after_first_period(&terms, &env);
        let bytes = to_canonical_bytes(&original).unwrap();
        let decoded = from_canonical_bytes(&bytes).unwrap();
        assert_eq!(decoded, original);
        assert_eq!(content_hash(&decoded).unwrap(), content_hash(&original).unwrap());

        let exercise_on = parse_date("15/05/2015").unwrap();
        let settle_on = parse_date("02/07/2015").unwrap();
        let run = |tree: &Arrangement| {
            let exercised = elect(tree, &terms.corp, "exercise", exercise_on, &env).unwrap();
            let settled = elect(&exercised.successor, &terms.bank, "proceed", settle_on, &env).unwrap();
            (exercised, settled)
        };

        let (exercised, settled) = run(&original);
        let (decoded_exercised, decoded_settled) = run(&decoded);
        assert_eq!(decoded_exercised, exercised);
        assert_eq!(decoded_settled, settled);
        assert_eq!(settled.effects[0].amount, dec!(100000));
    }

    #[test]
    fn test_decode_rejects_tampered_resume() {
        let terms = TarfTerms::default();
        let market = tarf_market();
        let bindings = Bindings::new();
        let env = Environment::new(&bindings, &market);
        let resume = resume_of(&tarf_after_first_period(&terms, &env));

        let mut past_end = resume.clone();
        past_end.rollout.period = 99;

        let mut missing_var = resume;
        missing_var.rollout.vars.remove("cap");

        for tampered in [past_end, missing_var] {
            let bytes = to_canonical_bytes(&Arrangement::Resume(Box::new(tampered))).unwrap();
            assert!(matches!(
                from_canonical_bytes(&bytes),
                Err(CanonicalError::Construction(ConstructionError::MalformedSchedule { .. }))
            ));
        }
    }

    #[test]
    fn test_snapshot_carries_bindings() {
        let snapshot = ContractSnapshot::new(sample(), Bindings::new().with("notional", dec!(10000000)));
        let bytes = snapshot.to_canonical_bytes().unwrap();
        let decoded = ContractSnapshot::from_canonical_bytes(&bytes).unwrap();

        assert_eq!(decoded, snapshot);
        assert_eq!(decoded.content_hash().unwrap(), snapshot.content_hash().unwrap());
    }
}
