//! Replay runner

use chrono::NaiveDate;
use log::{debug, info, warn};
use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::canonical::{content_hash, CanonicalError, ContentHash, ContractSnapshot};
use crate::contract::{Arrangement, Party};
use crate::currency::Currency;
use crate::evaluator::{elect, net_positions, Election, ElectionError};
use crate::expression::{Environment, EvalError, ObservableResolver};
use crate::temporal::format_date;

/// One recorded election
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionStep {
    pub actor: Party,
    pub label: String,
    pub at: NaiveDate,
}

impl ElectionStep {
    pub fn new(actor: &Party, label: &str, at: NaiveDate) -> Self {
        Self {
            actor: actor.clone(),
            label: label.to_string(),
            at,
        }
    }
}

/// Configuration for a replay run
#[derive(Debug, Clone)]
pub struct ReplayConfig {
    /// Number of independent holders in [`ReplayRunner::run_holders`]
    pub holders: usize,

    /// Fail if holders end at different content hashes
    pub verify_agreement: bool,

    /// Reject logs whose election dates go backwards
    pub require_chronological: bool,

    /// Fail unless the log runs the arrangement down to `Zero`
    pub require_terminal: bool,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            holders: 3,
            verify_agreement: true,
            require_chronological: false,
            require_terminal: false,
        }
    }
}

impl ReplayConfig {
    /// Settlement-grade checks: ordered log, fully discharged contract
    pub fn strict() -> Self {
        Self {
            holders: 5,
            verify_agreement: true,
            require_chronological: true,
            require_terminal: true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("step {step}: '{label}' by {actor} failed: {source}")]
    Election {
        step: usize,
        actor: Party,
        label: String,
        source: ElectionError,
    },

    #[error("step {step}: date {date} is earlier than the previous election")]
    OutOfOrder { step: usize, date: String },

    #[error("log ended with obligations outstanding")]
    NotTerminal,

    #[error("holders disagree on the final state: {hashes:?}")]
    Disagreement { hashes: Vec<ContentHash> },

    #[error("no holders configured")]
    NoHolders,

    #[error("net positions: {0}")]
    Positions(#[from] EvalError),

    #[error(transparent)]
    Canonical(#[from] CanonicalError),
}

/// Net amount received by one party in one currency
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetPosition {
    pub party: Party,
    pub currency: Currency,
    pub amount: Decimal,
}

/// Result of replaying a log
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayOutcome {
    pub elections: Vec<Election>,
    pub final_state: Arrangement,
    pub final_hash: ContentHash,
    pub positions: Vec<NetPosition>,
}

impl ReplayOutcome {
    pub fn payment_count(&self) -> usize {
        self.elections.iter().map(|e| e.effects.len()).sum()
    }
}

/// Applies election logs to arrangements
#[derive(Debug, Clone, Default)]
pub struct ReplayRunner {
    config: ReplayConfig,
}

impl ReplayRunner {
    pub fn new(config: ReplayConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReplayConfig {
        &self.config
    }

    /// Apply `steps` to `tree` in order
    pub fn replay(
        &self,
        tree: &Arrangement,
        steps: &[ElectionStep],
        env: &Environment<'_>,
    ) -> Result<ReplayOutcome, ReplayError> {
        let mut current = tree.clone();
        let mut elections = Vec::with_capacity(steps.len());
        let mut last_date: Option<NaiveDate> = None;

        for (i, step) in steps.iter().enumerate() {
            if self.config.require_chronological && last_date.is_some_and(|last| step.at < last) {
                return Err(ReplayError::OutOfOrder { step: i, date: format_date(step.at) });
            }
            last_date = Some(step.at);

            let election = elect(&current, &step.actor, &step.label, step.at, env).map_err(|source| {
                ReplayError::Election {
                    step: i,
                    actor: step.actor.clone(),
                    label: step.label.clone(),
                    source,
                }
            })?;
            debug!("step {}: {} -> {} payment(s)", i, step.label, election.effects.len());
            current = election.successor.clone();
            elections.push(election);
        }

        if self.config.require_terminal && !current.is_zero() {
            return Err(ReplayError::NotTerminal);
        }

        let positions = net_positions(elections.iter().flat_map(|e| e.effects.iter()))?
            .into_iter()
            .map(|((party, currency), amount)| NetPosition { party, currency, amount })
            .collect();

        Ok(ReplayOutcome {
            final_hash: content_hash(&current)?,
            elections,
            final_state: current,
            positions,
        })
    }

    /// Replay the same log for every configured holder in parallel
    ///
    /// Each holder decodes its own copy of the snapshot from canonical bytes,
    /// as it would after fetching it by hash.
    pub fn run_holders(
        &self,
        snapshot: &ContractSnapshot,
        steps: &[ElectionStep],
        resolver: &dyn ObservableResolver,
    ) -> Result<ReplayOutcome, ReplayError> {
        if self.config.holders == 0 {
            return Err(ReplayError::NoHolders);
        }

        let bytes = snapshot.to_canonical_bytes()?;
        info!(
            "replaying {} election(s) for {} holder(s), snapshot {}",
            steps.len(),
            self.config.holders,
            snapshot.content_hash()?
        );

        let outcomes: Vec<ReplayOutcome> = (0..self.config.holders)
            .into_par_iter()
            .map(|_| {
                let copy = ContractSnapshot::from_canonical_bytes(&bytes)?;
                let env = Environment::new(&copy.bindings, resolver);
                self.replay(&copy.arrangement, steps, &env)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut hashes: Vec<ContentHash> = outcomes.iter().map(|o| o.final_hash).collect();
        hashes.sort();
        hashes.dedup();
        if hashes.len() > 1 {
            warn!("holders disagree: {} distinct final states", hashes.len());
            if self.config.verify_agreement {
                return Err(ReplayError::Disagreement { hashes });
            }
        }

        let outcome = outcomes.into_iter().next().ok_or(ReplayError::NoHolders)?;
        info!(
            "replay complete: {} payment(s), final state {}",
            outcome.payment_count(),
            outcome.final_hash
        );
        Ok(outcome)
    }
}
