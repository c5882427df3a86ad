//! Cross-project aggregation into a registry

use super::combine;
use crate::domain::{ConstraintSet, DependencyRequirements};
use crate::error::AggregateError;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Resolved state of one dependency
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryEntry {
    /// Every requirement seen so far is jointly satisfiable
    Range(ConstraintSet),
    /// At least two requirements share no version; sticky
    Conflict,
}

impl RegistryEntry {
    pub fn is_conflict(&self) -> bool {
        matches!(self, RegistryEntry::Conflict)
    }

    pub fn range(&self) -> Option<&ConstraintSet> {
        match self {
            RegistryEntry::Range(range) => Some(range),
            RegistryEntry::Conflict => None,
        }
    }
}

impl fmt::Display for RegistryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryEntry::Range(range) => write!(f, "{}", range),
            RegistryEntry::Conflict => f.write_str("conflict"),
        }
    }
}

impl Serialize for RegistryEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RegistryEntry::Range(range) => serializer.collect_str(range),
            RegistryEntry::Conflict => serializer.serialize_none(),
        }
    }
}

/// Dependency name -> jointly allowed range or conflict marker
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Registry {
    entries: BTreeMap<String, RegistryEntry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, dependency: &str) -> Option<&RegistryEntry> {
        self.entries.get(dependency)
    }

    pub fn contains(&self, dependency: &str) -> bool {
        self.entries.contains_key(dependency)
    }

    /// Entries in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RegistryEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Names of conflicted dependencies
    pub fn conflicts(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, entry)| entry.is_conflict())
            .map(|(name, _)| name)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy of this registry without the dependencies `other` already holds
    pub fn without_keys_of(&self, other: &Registry) -> Registry {
        Registry {
            entries: self
                .entries
                .iter()
                .filter(|(name, _)| !other.contains(name))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    fn insert(&mut self, dependency: &str, entry: RegistryEntry) {
        self.entries.insert(dependency.to_string(), entry);
    }
}

/// A conflict recorded during lenient aggregation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConflictRecord {
    /// Project whose requirement could not be joined
    pub project: String,
    pub dependency: String,
    /// The project's own range
    pub required: ConstraintSet,
    /// The range accumulated before this project
    pub already_required: ConstraintSet,
}

impl From<ConflictRecord> for AggregateError {
    fn from(record: ConflictRecord) -> Self {
        AggregateError::Conflict {
            project: record.project,
            dependency: record.dependency,
            source: crate::error::ConflictError {
                current: record.already_required,
                incoming: record.required,
            },
        }
    }
}

/// Fold every project's requirements into one registry
///
/// With `fail_fast` the first conflict is returned as an error; otherwise
/// the dependency is marked conflicted and folding continues.
///
/// Folding is order-independent except for bounds that tie on a version
/// with different strictness: `>=1.5` meeting `>1.5` conflicts, but not
/// once a tighter bound such as `>=2` has absorbed one of them.
pub fn aggregate(
    projects: &[DependencyRequirements],
    fail_fast: bool,
) -> Result<Registry, AggregateError> {
    aggregate_with_diagnostics(projects, fail_fast).map(|(registry, _)| registry)
}

/// Like [`aggregate`], also returning every conflict met in lenient mode
pub fn aggregate_with_diagnostics(
    projects: &[DependencyRequirements],
    fail_fast: bool,
) -> Result<(Registry, Vec<ConflictRecord>), AggregateError> {
    let mut registry = Registry::new();
    let mut conflicts = Vec::new();

    for project in projects {
        for (dependency, range) in project.iter() {
            let next = match registry.get(dependency) {
                None => RegistryEntry::Range(range.clone()),
                Some(RegistryEntry::Conflict) => continue,
                Some(RegistryEntry::Range(current)) => match combine(current, range) {
                    Ok(joined) => RegistryEntry::Range(joined),
                    Err(err) => {
                        let record = ConflictRecord {
                            project: project.project().to_string(),
                            dependency: dependency.to_string(),
                            required: err.incoming,
                            already_required: err.current,
                        };
                        if fail_fast {
                            return Err(record.into());
                        }
                        tracing::info!(
                            project = %record.project,
                            dependency = %record.dependency,
                            required = %record.required,
                            already_required = %record.already_required,
                            "marking dependency as conflicted"
                        );
                        conflicts.push(record);
                        RegistryEntry::Conflict
                    }
                },
            };
            registry.insert(dependency, next);
        }
    }

    Ok((registry, conflicts))
}

/// Union of two registries; on a shared name the `core` entry wins
pub fn merge(core: &Registry, other: &Registry) -> Registry {
    let mut merged = other.clone();
    for (name, entry) in core.iter() {
        merged.insert(name, entry.clone());
    }
    merged
}

/// Fail-fast aggregation over a whole package set, for "can all of these
/// be installed together" checks
pub fn check_installable(projects: &[DependencyRequirements]) -> Result<Registry, AggregateError> {
    aggregate(projects, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_constraint_set;

    fn project(name: &str, reqs: &[(&str, &str)]) -> DependencyRequirements {
        DependencyRequirements::new(
            name,
            reqs.iter()
                .map(|(dep, range)| (dep.to_string(), parse_constraint_set(range).unwrap())),
        )
    }

    fn range(registry: &Registry, dep: &str) -> String {
        registry.get(dep).unwrap().to_string()
    }

    #[test]
    fn test_new_dependency_inserted_directly() {
        let registry = aggregate(&[project("a", &[("numpy", ">=1.0")])], true).unwrap();
        assert_eq!(range(&registry, "numpy"), ">=1.0");
    }

    #[test]
    fn test_ranges_are_intersected() {
        let registry = aggregate(
            &[
                project("a", &[("numpy", ">=1.0,<2.0")]),
                project("b", &[("numpy", ">=1.5"), ("scipy", "any")]),
            ],
            true,
        )
        .unwrap();
        assert_eq!(range(&registry, "numpy"), ">=1.5,<2.0");
        assert_eq!(range(&registry, "scipy"), "any");
    }

    #[test]
    fn test_lenient_marks_conflict_and_continues() {
        let (registry, conflicts) = aggregate_with_diagnostics(
            &[
                project("a", &[("numpy", ">=1.0,<2.0")]),
                project("b", &[("numpy", ">=1.5")]),
                project("c", &[("numpy", "==2.5"), ("scipy", ">=1.0")]),
            ],
            false,
        )
        .unwrap();
        assert!(registry.get("numpy").unwrap().is_conflict());
        assert_eq!(range(&registry, "scipy"), ">=1.0");
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].project, "c");
        assert_eq!(conflicts[0].already_required.to_string(), ">=1.5,<2.0");
        assert_eq!(registry.conflicts(), vec!["numpy"]);
    }

    #[test]
    fn test_fail_fast_names_project_and_dependency() {
        let err = aggregate(
            &[
                project("a", &[("numpy", ">=1.0,<2.0")]),
                project("b", &[("numpy", ">=1.5")]),
                project("c", &[("numpy", "==2.5")]),
            ],
            true,
        )
        .unwrap_err();
        assert_eq!(err.dependency(), "numpy");
        let msg = err.to_string();
        assert!(msg.contains("'c'"));
        assert!(msg.contains("==2.5"));
        assert!(msg.contains(">=1.5,<2.0"));
    }

    #[test]
    fn test_strictness_tie_depends_on_fold_order() {
        let fold = |ranges: &[&str]| {
            let projects: Vec<_> = ranges
                .iter()
                .enumerate()
                .map(|(i, r)| project(&format!("p{}", i), &[("numpy", r)]))
                .collect();
            aggregate(&projects, false).unwrap().get("numpy").unwrap().to_string()
        };
        assert_eq!(fold(&[">=1.5", ">1.5", ">=2"]), "conflict");
        assert_eq!(fold(&[">=1.5", ">=2", ">1.5"]), ">=2");
    }

    #[test]
    fn test_conflict_is_sticky() {
        let registry = aggregate(
            &[
                project("a", &[("numpy", "<2")]),
                project("b", &[("numpy", ">=2")]),
                project("c", &[("numpy", "any")]),
                project("d", &[("numpy", "<2")]),
            ],
            false,
        )
        .unwrap();
        assert!(registry.get("numpy").unwrap().is_conflict());
    }

    #[test]
    fn test_merge_core_wins() {
        let core = aggregate(&[project("core", &[("numpy", ">=2.0"), ("astropy", ">=6")])], true)
            .unwrap();
        let other = aggregate(
            &[
                project("x", &[("numpy", "<2")]),
                project("y", &[("numpy", ">=2")]),
                project("z", &[("pandas", ">=2")]),
            ],
            false,
        )
        .unwrap();
        let merged = merge(&core, &other);
        assert_eq!(range(&merged, "numpy"), ">=2.0");
        assert_eq!(range(&merged, "pandas"), ">=2");
        let names: Vec<&str> = merged.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["astropy", "numpy", "pandas"]);
    }

    #[test]
    fn test_without_keys_of() {
        let core = aggregate(&[project("core", &[("numpy", ">=2.0")])], true).unwrap();
        let other = aggregate(&[project("x", &[("numpy", "<3"), ("pandas", "any")])], true).unwrap();
        let unique = other.without_keys_of(&core);
        assert!(!unique.contains("numpy"));
        assert!(unique.contains("pandas"));
    }

    #[test]
    fn test_check_installable() {
        assert!(check_installable(&[
            project("a", &[("numpy", ">=1.0")]),
            project("b", &[("numpy", "<3")]),
        ])
        .is_ok());
        assert!(check_installable(&[
            project("a", &[("numpy", "<1.0")]),
            project("b", &[("numpy", ">=3")]),
        ])
        .is_err());
    }

    #[test]
    fn test_registry_serializes_conflict_as_null() {
        let registry = aggregate(
            &[
                project("a", &[("numpy", "<2"), ("scipy", ">=1")]),
                project("b", &[("numpy", ">=2")]),
            ],
            false,
        )
        .unwrap();
        let json = serde_json::to_value(&registry).unwrap();
        assert!(json["numpy"].is_null());
        assert_eq!(json["scipy"], ">=1");
    }
}
