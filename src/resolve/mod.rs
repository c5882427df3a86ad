//! Constraint algebra and compatibility resolution
//!
//! This module contains the engine proper:
//! - Normalization of wildcard and compatible-release clauses
//! - Check-then-apply intersection of constraint sets
//! - Cross-project aggregation into a registry
//! - The compatibility matrix and report assembly
//!
//! Everything here is synchronous and free of shared state.

mod aggregate;
mod combine;
mod matrix;
mod normalize;
mod report;

pub use aggregate::{
    aggregate, aggregate_with_diagnostics, check_installable, merge, ConflictRecord, Registry,
    RegistryEntry,
};
pub(crate) use combine::build_set;
pub use combine::{are_compatible, combine, is_compatible, overlaps};
pub use matrix::{build_matrix, compliance, CompatibilityMatrix, MatrixRow};
pub use normalize::{normalize, Normalized};
pub use report::{build_report, compliance_problems, AllowedRange, CompatibilityReport};
