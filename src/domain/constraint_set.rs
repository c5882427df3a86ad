//! Constraint sets
//!
//! A `ConstraintSet` is the AND of its clauses, kept in reduced form:
//! at most one pin, one lower bound and one upper bound, plus exclusions
//! in first-seen order. The empty set is the `any` sentinel.

use super::{Bound, Clause, Version};
use serde::{Serialize, Serializer};
use std::fmt;

/// An intersection of clauses describing every acceptable version
#[derive(Debug, Clone, Default)]
pub struct ConstraintSet {
    pub(crate) pin: Option<Version>,
    pub(crate) lower: Option<Bound>,
    pub(crate) upper: Option<Bound>,
    pub(crate) exclusions: Vec<Version>,
}

impl ConstraintSet {
    /// The unconstrained sentinel
    pub fn any() -> Self {
        Self::default()
    }

    /// A set holding only `==version`
    pub fn pinned(version: Version) -> Self {
        Self {
            pin: Some(version),
            ..Self::default()
        }
    }

    /// Returns true for the unconstrained sentinel
    pub fn is_any(&self) -> bool {
        self.pin.is_none()
            && self.lower.is_none()
            && self.upper.is_none()
            && self.exclusions.is_empty()
    }

    pub fn pin(&self) -> Option<&Version> {
        self.pin.as_ref()
    }

    pub fn lower(&self) -> Option<&Bound> {
        self.lower.as_ref()
    }

    pub fn upper(&self) -> Option<&Bound> {
        self.upper.as_ref()
    }

    pub fn exclusions(&self) -> &[Version] {
        &self.exclusions
    }

    /// Clauses in canonical order: the pin alone, otherwise lower bound,
    /// upper bound, then exclusions in first-seen order
    pub fn clauses(&self) -> Vec<Clause> {
        if let Some(ref pin) = self.pin {
            return vec![Clause::Pin(pin.clone())];
        }
        let mut clauses = Vec::with_capacity(2 + self.exclusions.len());
        if let Some(ref lower) = self.lower {
            clauses.push(Clause::Lower(lower.clone()));
        }
        if let Some(ref upper) = self.upper {
            clauses.push(Clause::Upper(upper.clone()));
        }
        clauses.extend(self.exclusions.iter().cloned().map(Clause::Exclude));
        clauses
    }

    /// Returns true if `version` satisfies every clause
    pub fn contains(&self, version: &Version) -> bool {
        self.clauses().iter().all(|clause| clause.matches(version))
    }
}

impl PartialEq for ConstraintSet {
    /// Exclusion order is presentation only; two sets are equal when they
    /// admit the same pin, bounds and excluded versions.
    fn eq(&self, other: &Self) -> bool {
        self.pin == other.pin
            && self.lower == other.lower
            && self.upper == other.upper
            && self.exclusions.len() == other.exclusions.len()
            && self
                .exclusions
                .iter()
                .all(|v| other.exclusions.contains(v))
    }
}

impl fmt::Display for ConstraintSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_any() {
            return f.write_str("any");
        }
        let clauses: Vec<String> = self.clauses().iter().map(|c| c.to_string()).collect();
        f.write_str(&clauses.join(","))
    }
}

impl Serialize for ConstraintSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
