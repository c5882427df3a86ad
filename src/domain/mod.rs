//! Core domain models for depmatrix
//!
//! This module contains the value types used throughout the engine:
//! - Release versions and their ordering
//! - Raw and canonical constraint clauses
//! - Constraint sets (intersections of clauses)
//! - Per-project dependency requirements
//! - Compatibility matrix cells and their classification

mod cell;
mod clause;
mod constraint_set;
mod requirements;
mod version;

pub use cell::{Classification, MatrixCell, Ternary};
pub use clause::{Bound, Clause, Operator, RawClause, VersionLiteral};
pub use constraint_set::ConstraintSet;
pub use requirements::{canonical_name, DependencyRequirements};
pub use version::{compare, parse_version, PreRelease, Version};
