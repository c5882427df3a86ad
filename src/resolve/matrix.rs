//! Project x dependency compatibility matrix

use super::{are_compatible, overlaps, Registry, RegistryEntry};
use crate::baseline::ComplianceBaseline;
use crate::domain::{ConstraintSet, DependencyRequirements, MatrixCell, Ternary};
use serde::Serialize;
use std::collections::BTreeMap;

/// One project's row: every registry dependency mapped to a cell
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixRow {
    pub project: String,
    pub cells: BTreeMap<String, MatrixCell>,
}

/// Rows in project order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CompatibilityMatrix {
    rows: Vec<MatrixRow>,
}

impl CompatibilityMatrix {
    pub fn rows(&self) -> &[MatrixRow] {
        &self.rows
    }

    /// Cell for a (project, dependency) pair
    pub fn cell(&self, project: &str, dependency: &str) -> Option<&MatrixCell> {
        self.rows
            .iter()
            .find(|row| row.project == project)
            .and_then(|row| row.cells.get(dependency))
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Build the matrix from a frozen registry
///
/// Dependencies in the registry that a project does not require yield
/// [`MatrixCell::Absent`]. A conflicted dependency is incompatible for
/// every project that requires it.
pub fn build_matrix(
    registry: &Registry,
    projects: &[DependencyRequirements],
    baseline: &ComplianceBaseline,
) -> CompatibilityMatrix {
    let rows = projects
        .iter()
        .map(|project| {
            let mut cells: BTreeMap<String, MatrixCell> = registry
                .iter()
                .map(|(name, _)| (name.to_string(), MatrixCell::Absent))
                .collect();
            for (dependency, range) in project.iter() {
                let compatible = compatibility(registry.get(dependency), range);
                let compliant = compliance(baseline.minimum(dependency), range);
                cells.insert(
                    dependency.to_string(),
                    MatrixCell::present(compatible, compliant, range.to_string()),
                );
            }
            MatrixRow {
                project: project.project().to_string(),
                cells,
            }
        })
        .collect();

    CompatibilityMatrix { rows }
}

fn compatibility(entry: Option<&RegistryEntry>, range: &ConstraintSet) -> Ternary {
    match entry {
        Some(RegistryEntry::Range(allowed)) => are_compatible(allowed, range).into(),
        Some(RegistryEntry::Conflict) => Ternary::No,
        None => Ternary::Unknown,
    }
}

/// Compliance of a range against an optional baseline minimum
///
/// A range complies when it shares at least one version with the minimum;
/// a strict bound tied to the baseline (`>1.26` against `>=1.26`) complies.
pub fn compliance(minimum: Option<&ConstraintSet>, range: &ConstraintSet) -> Ternary {
    match minimum {
        Some(minimum) => overlaps(minimum, range).into(),
        None => Ternary::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Classification;
    use crate::parser::parse_constraint_set;
    use crate::resolve::aggregate;

    fn project(name: &str, reqs: &[(&str, &str)]) -> DependencyRequirements {
        DependencyRequirements::new(
            name,
            reqs.iter()
                .map(|(dep, range)| (dep.to_string(), parse_constraint_set(range).unwrap())),
        )
    }

    #[test]
    fn test_compatible_and_compliant() {
        let projects = vec![
            project("a", &[("numpy", ">=2.0")]),
            project("b", &[("numpy", "<3")]),
        ];
        let registry = aggregate(&projects, false).unwrap();
        let baseline = ComplianceBaseline::parse("numpy>=1.26").unwrap();
        let matrix = build_matrix(&registry, &projects, &baseline);

        let cell = matrix.cell("a", "numpy").unwrap();
        assert_eq!(cell.compatible(), Some(Ternary::Yes));
        assert_eq!(cell.compliant(), Some(Ternary::Yes));
        assert_eq!(cell.classification(), Some(Classification::FullyGood));
    }

    #[test]
    fn test_strict_bound_tied_to_baseline_is_compliant() {
        let minimum = parse_constraint_set(">=1.26").unwrap();
        let range = parse_constraint_set(">1.26").unwrap();
        assert_eq!(compliance(Some(&minimum), &range), Ternary::Yes);
        assert_eq!(compliance(None, &range), Ternary::Unknown);
    }

    #[test]
    fn test_noncompliant_range() {
        let projects = vec![project("a", &[("numpy", "<1.20")])];
        let registry = aggregate(&projects, false).unwrap();
        let baseline = ComplianceBaseline::parse("numpy>=2.0").unwrap();
        let matrix = build_matrix(&registry, &projects, &baseline);

        let cell = matrix.cell("a", "numpy").unwrap();
        assert_eq!(cell.compliant(), Some(Ternary::No));
        assert_eq!(
            cell.classification(),
            Some(Classification::CompatibleNoncompliant)
        );
    }

    #[test]
    fn test_conflict_marks_every_requirer_incompatible() {
        let projects = vec![
            project("a", &[("numpy", ">=1.0,<2.0")]),
            project("b", &[("numpy", ">=1.5")]),
            project("c", &[("numpy", "==2.5")]),
        ];
        let registry = aggregate(&projects, false).unwrap();
        let matrix = build_matrix(&registry, &projects, &ComplianceBaseline::empty());

        for name in ["a", "b", "c"] {
            let cell = matrix.cell(name, "numpy").unwrap();
            assert_eq!(cell.compatible(), Some(Ternary::No), "{}", name);
            assert_eq!(cell.compliant(), Some(Ternary::Unknown));
            assert_eq!(
                cell.classification(),
                Some(Classification::IncompatibleCompliant)
            );
        }
    }

    #[test]
    fn test_absent_dependency_cell() {
        let projects = vec![
            project("a", &[("numpy", ">=1.0")]),
            project("b", &[("scipy", ">=1.0")]),
        ];
        let registry = aggregate(&projects, false).unwrap();
        let matrix = build_matrix(&registry, &projects, &ComplianceBaseline::empty());

        assert!(matrix.cell("a", "scipy").unwrap().is_absent());
        assert!(matrix.cell("b", "numpy").unwrap().is_absent());
        assert!(!matrix.cell("a", "numpy").unwrap().is_absent());
    }

    #[test]
    fn test_unknown_registry_entry() {
        let projects = vec![project("a", &[("numpy", ">=1.0")])];
        let matrix = build_matrix(&Registry::new(), &projects, &ComplianceBaseline::empty());
        let cell = matrix.cell("a", "numpy").unwrap();
        assert_eq!(cell.compatible(), Some(Ternary::Unknown));
        assert_eq!(
            cell.classification(),
            Some(Classification::IncompatibleCompliant)
        );
    }

    #[test]
    fn test_incompatible_against_core_registry() {
        let core = vec![project("core", &[("numpy", ">=2.0")])];
        let other = vec![project("x", &[("numpy", "<1.20")])];
        let registry = aggregate(&core, true).unwrap();
        let baseline = ComplianceBaseline::parse("numpy>=1.26").unwrap();
        let matrix = build_matrix(&registry, &other, &baseline);

        let cell = matrix.cell("x", "numpy").unwrap();
        assert_eq!(
            cell.classification(),
            Some(Classification::IncompatibleNoncompliant)
        );
        assert_eq!(cell.range(), Some("<1.20"));
    }

    #[test]
    fn test_rows_keep_project_order() {
        let projects = vec![project("zeta", &[]), project("alpha", &[])];
        let matrix = build_matrix(&Registry::new(), &projects, &ComplianceBaseline::empty());
        let names: Vec<&str> = matrix.rows().iter().map(|r| r.project.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }
}
