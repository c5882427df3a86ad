//! Compatibility matrix cells and their classification

use serde::Serialize;

/// A three-valued flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Ternary {
    Yes,
    No,
    /// Not known, or not applicable to this cell
    Unknown,
}

impl Ternary {
    pub fn is_yes(&self) -> bool {
        matches!(self, Ternary::Yes)
    }

    pub fn is_no(&self) -> bool {
        matches!(self, Ternary::No)
    }
}

impl From<bool> for Ternary {
    fn from(value: bool) -> Self {
        if value {
            Ternary::Yes
        } else {
            Ternary::No
        }
    }
}

/// Four-way severity of a present cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Compatible, and compliant or not subject to the baseline
    FullyGood,
    /// Compatible but below the compliance baseline
    CompatibleNoncompliant,
    /// Incompatible, but compliant or not subject to the baseline
    IncompatibleCompliant,
    /// Incompatible and below the compliance baseline
    IncompatibleNoncompliant,
}

impl Classification {
    /// Classify a compatibility/compliance pair.
    ///
    /// Unknown compatibility cannot be confirmed and counts as incompatible;
    /// unknown compliance means the baseline does not apply.
    pub fn from_flags(compatible: Ternary, compliant: Ternary) -> Self {
        match (compatible.is_yes(), compliant.is_no()) {
            (true, false) => Classification::FullyGood,
            (true, true) => Classification::CompatibleNoncompliant,
            (false, false) => Classification::IncompatibleCompliant,
            (false, true) => Classification::IncompatibleNoncompliant,
        }
    }

    /// Short label used by text renderers
    pub fn label(&self) -> &'static str {
        match self {
            Classification::FullyGood => "ok",
            Classification::CompatibleNoncompliant => "noncompliant",
            Classification::IncompatibleCompliant => "incompatible",
            Classification::IncompatibleNoncompliant => "incompatible+noncompliant",
        }
    }
}

/// One (project, dependency) entry of the matrix
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MatrixCell {
    /// The project does not require this dependency
    Absent,
    /// The project requires this dependency
    Present {
        compatible: Ternary,
        compliant: Ternary,
        /// The project's own range in canonical form
        range: String,
        classification: Classification,
    },
}

impl MatrixCell {
    /// Creates a present cell, deriving its classification
    pub fn present(compatible: Ternary, compliant: Ternary, range: impl Into<String>) -> Self {
        MatrixCell::Present {
            compatible,
            compliant,
            range: range.into(),
            classification: Classification::from_flags(compatible, compliant),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, MatrixCell::Absent)
    }

    /// Classification of a present cell
    pub fn classification(&self) -> Option<Classification> {
        match self {
            MatrixCell::Absent => None,
            MatrixCell::Present { classification, .. } => Some(*classification),
        }
    }

    pub fn compatible(&self) -> Option<Ternary> {
        match self {
            MatrixCell::Absent => None,
            MatrixCell::Present { compatible, .. } => Some(*compatible),
        }
    }

    pub fn compliant(&self) -> Option<Ternary> {
        match self {
            MatrixCell::Absent => None,
            MatrixCell::Present { compliant, .. } => Some(*compliant),
        }
    }

    pub fn range(&self) -> Option<&str> {
        match self {
            MatrixCell::Absent => None,
            MatrixCell::Present { range, .. } => Some(range),
        }
    }
}
