//! Report assembly
//!
//! Drives the engine end to end over already-discovered requirements:
//! 1. Core projects are aggregated fail-fast; they must never conflict
//! 2. Other projects are aggregated leniently so every conflict is seen
//! 3. Core entries win over other entries of the same name
//! 4. The matrix covers core projects first, then the rest, in input order

use super::{
    aggregate, aggregate_with_diagnostics, build_matrix, compliance, merge, CompatibilityMatrix,
    ConflictRecord, Registry, RegistryEntry,
};
use crate::baseline::ComplianceBaseline;
use crate::domain::{DependencyRequirements, MatrixCell, Ternary};
use crate::error::AggregateError;
use serde::Serialize;
use std::collections::BTreeMap;

/// Allowed range of one dependency, annotated for reporting
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllowedRange {
    /// Jointly allowed range, or `None` when conflicted
    pub range: RegistryEntry,
    /// True when the dependency came from the core set
    pub core: bool,
    /// Whether the allowed range meets the baseline
    pub compliant: Ternary,
}

/// Everything a renderer needs; nothing here is recomputed downstream
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompatibilityReport {
    pub core_projects: Vec<String>,
    pub other_projects: Vec<String>,
    /// Dependency name -> annotated allowed range
    pub allowed: BTreeMap<String, AllowedRange>,
    pub matrix: CompatibilityMatrix,
    /// Conflicts met while aggregating the other projects
    pub conflicts: Vec<ConflictRecord>,
    /// One line per non-compliant requirement
    pub compliance_problems: Vec<String>,
}

impl CompatibilityReport {
    /// Names of conflicted dependencies
    pub fn conflicted_dependencies(&self) -> Vec<&str> {
        self.allowed
            .iter()
            .filter(|(_, a)| a.range.is_conflict())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn has_conflicts(&self) -> bool {
        self.allowed.values().any(|a| a.range.is_conflict())
    }
}

/// Build the full report
///
/// Only a conflict inside the core set is an error.
pub fn build_report(
    core: &[DependencyRequirements],
    other: &[DependencyRequirements],
    baseline: &ComplianceBaseline,
) -> Result<CompatibilityReport, AggregateError> {
    let core_registry = aggregate(core, true)?;
    let (other_registry, conflicts) = aggregate_with_diagnostics(other, false)?;
    let other_registry = other_registry.without_keys_of(&core_registry);
    let registry = merge(&core_registry, &other_registry);

    let projects: Vec<DependencyRequirements> = core.iter().chain(other).cloned().collect();
    let matrix = build_matrix(&registry, &projects, baseline);

    tracing::debug!(
        dependencies = registry.len(),
        projects = projects.len(),
        conflicts = conflicts.len(),
        "built compatibility matrix"
    );

    Ok(CompatibilityReport {
        core_projects: core.iter().map(|p| p.project().to_string()).collect(),
        other_projects: other.iter().map(|p| p.project().to_string()).collect(),
        allowed: annotate(&registry, &core_registry, baseline),
        compliance_problems: compliance_problems(&matrix, baseline),
        matrix,
        conflicts,
    })
}

fn annotate(
    registry: &Registry,
    core: &Registry,
    baseline: &ComplianceBaseline,
) -> BTreeMap<String, AllowedRange> {
    registry
        .iter()
        .map(|(name, entry)| {
            let compliant = match (entry, baseline.minimum(name)) {
                (_, None) => Ternary::Unknown,
                (RegistryEntry::Conflict, Some(_)) => Ternary::No,
                (RegistryEntry::Range(range), minimum) => compliance(minimum, range),
            };
            let allowed = AllowedRange {
                range: entry.clone(),
                core: core.contains(name),
                compliant,
            };
            (name.to_string(), allowed)
        })
        .collect()
}

/// `<project>: requires <dep><range> but baseline requires <dep><minimum>`
/// for every non-compliant cell, sorted by project then dependency
pub fn compliance_problems(
    matrix: &CompatibilityMatrix,
    baseline: &ComplianceBaseline,
) -> Vec<String> {
    let mut problems = Vec::new();
    for row in matrix.rows() {
        let project = project_name(&row.project);
        for (dependency, cell) in &row.cells {
            let MatrixCell::Present {
                compliant: Ternary::No,
                range,
                ..
            } = cell
            else {
                continue;
            };
            let Some(minimum) = baseline.minimum(dependency) else {
                continue;
            };
            problems.push((project, dependency.as_str(), range.as_str(), minimum));
        }
    }

    problems.sort_by_key(|(project, dependency, _, _)| {
        (project.to_lowercase(), dependency.to_lowercase())
    });
    problems
        .into_iter()
        .map(|(project, dependency, range, minimum)| {
            format!(
                "{}: requires {}{} but baseline requires {}{}",
                project, dependency, range, dependency, minimum
            )
        })
        .collect()
}

/// Project label without its `==version` suffix
fn project_name(label: &str) -> &str {
    label.split("==").next().unwrap_or(label)
}
