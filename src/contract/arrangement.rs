//! Arrangement tree nodes

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::expression::Amount;
use crate::rollout::Resume;
use crate::temporal::TemporalPredicate;
use super::error::ConstructionError;
use super::obligation::Obligation;
use super::party::PartySet;

/// A contract's remaining obligations and choices from a given point
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Arrangement {
    /// Terminal: no further obligations, ever
    Zero,
    /// Mutually exclusive elections available at this point
    Actions(ActionSet),
    /// `next(...)` as written in a rollout body, before instantiation
    Next(NextDirective),
    /// `next(...)` bound to a rollout period; resolved when its action is elected
    Resume(Box<Resume>),
}

impl Arrangement {
    pub fn is_zero(&self) -> bool {
        matches!(self, Arrangement::Zero)
    }

    /// The action set at this node, if any
    pub fn action_set(&self) -> Option<&ActionSet> {
        match self {
            Arrangement::Actions(set) => Some(set),
            _ => None,
        }
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let pad = "  ".repeat(depth);
        match self {
            Arrangement::Zero => writeln!(f, "{}zero", pad),
            Arrangement::Actions(set) => {
                writeln!(f, "{}actions", pad)?;
                for action in set.iter() {
                    writeln!(f, "{}  ({}) may \"{}\" {}", pad, action.actors, action.label, action.guard)?;
                    for effect in &action.effects {
                        writeln!(f, "{}    {}", pad, effect)?;
                    }
                    action.continuation.write_indented(f, depth + 2)?;
                }
                Ok(())
            }
            Arrangement::Next(directive) => writeln!(f, "{}{}", pad, directive),
            Arrangement::Resume(resume) => writeln!(f, "{}{}", pad, resume),
        }
    }
}

impl fmt::Display for Arrangement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

/// One labeled, guarded, authorized election
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Action {
    pub label: String,
    pub actors: PartySet,
    pub guard: TemporalPredicate,
    pub effects: Vec<Obligation>,
    pub continuation: Arrangement,
}

/// Actions available at one node, in authoring order, labels unique
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionSet(Vec<Action>);

impl ActionSet {
    /// Build a set, rejecting empty and duplicate labels
    pub fn new(actions: Vec<Action>) -> Result<Self, ConstructionError> {
        let set = ActionSet(actions);
        set.check_labels()?;
        Ok(set)
    }

    pub(crate) fn check_labels(&self) -> Result<(), ConstructionError> {
        let mut seen = BTreeSet::new();
        for action in &self.0 {
            if action.label.is_empty() {
                return Err(ConstructionError::EmptyLabel);
            }
            if !seen.insert(action.label.as_str()) {
                return Err(ConstructionError::DuplicateLabel { label: action.label.clone() });
            }
        }
        Ok(())
    }

    pub fn get(&self, label: &str) -> Option<&Action> {
        self.0.iter().find(|a| a.label == label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Transform every action, keeping labels and order
    pub(crate) fn map(&self, f: impl Fn(&Action) -> Action) -> ActionSet {
        ActionSet(self.0.iter().map(f).collect())
    }
}

/// New value for a rollout variable, carried into the next period
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rebind {
    pub name: String,
    pub value: Amount,
}

/// Unbound `next()` / `next(var to expr, ...)`
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NextDirective {
    pub rebinds: Vec<Rebind>,
}

impl fmt::Display for Rebind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "vars.{} to {}", self.name, self.value)
    }
}

impl fmt::Display for NextDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rebinds: Vec<String> = self.rebinds.iter().map(|r| r.to_string()).collect();
        write!(f, "next({})", rebinds.join(", "))
    }
}
