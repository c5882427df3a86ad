//! Per-project dependency requirements

use super::ConstraintSet;
use crate::error::ConflictError;
use crate::resolve::combine;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// Canonical form of a dependency name
pub fn canonical_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// The ranges one project demands of each of its dependencies
#[derive(Debug, Clone, PartialEq)]
pub struct DependencyRequirements {
    /// Project label, e.g. `sunpy==7.1.0`
    project: String,
    /// Dependency name -> required range, sorted by name
    requirements: BTreeMap<String, ConstraintSet>,
}

impl DependencyRequirements {
    /// Creates requirements for a project; names are canonicalized
    ///
    /// Names must be unique after canonicalization: a later duplicate
    /// replaces the earlier range. Use [`Self::try_new`] when duplicates
    /// may occur.
    pub fn new(
        project: impl Into<String>,
        requirements: impl IntoIterator<Item = (String, ConstraintSet)>,
    ) -> Self {
        Self {
            project: project.into(),
            requirements: requirements
                .into_iter()
                .map(|(name, range)| (canonical_name(&name), range))
                .collect(),
        }
    }

    /// Creates requirements for a project, intersecting the ranges of
    /// names that coincide after canonicalization
    pub fn try_new(
        project: impl Into<String>,
        requirements: impl IntoIterator<Item = (String, ConstraintSet)>,
    ) -> Result<Self, ConflictError> {
        let mut folded: BTreeMap<String, ConstraintSet> = BTreeMap::new();
        for (name, range) in requirements {
            match folded.entry(canonical_name(&name)) {
                Entry::Vacant(slot) => {
                    slot.insert(range);
                }
                Entry::Occupied(mut slot) => {
                    let joined = combine(slot.get(), &range)?;
                    slot.insert(joined);
                }
            }
        }
        Ok(Self {
            project: project.into(),
            requirements: folded,
        })
    }

    /// Project label
    pub fn project(&self) -> &str {
        &self.project
    }

    /// Range required for `dependency`, if the project requires it
    pub fn get(&self, dependency: &str) -> Option<&ConstraintSet> {
        self.requirements.get(&canonical_name(dependency))
    }

    /// Iterate over (dependency, range) pairs in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConstraintSet)> {
        self.requirements.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.requirements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }
}
