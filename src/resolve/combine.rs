//! Constraint set intersection
//!
//! Intersection is check-then-apply: each clause of the incoming set is
//! first tested against the accumulator, and only a compatible clause may
//! tighten it. A failed check aborts the whole call and leaves the inputs
//! untouched.

use crate::domain::{Bound, Clause, ConstraintSet};
use crate::error::ConflictError;
use std::cmp::Ordering;

/// How bound ties are judged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Reducing the clauses of one expression; the tighter bound wins
    Build,
    /// Joining two parties' sets; a lower (or upper) bound at the same
    /// version with different strictness is a disagreement
    Join,
}

/// Intersect `incoming` into `current`
///
/// `any` on either side returns the other operand unchanged.
pub fn combine(
    current: &ConstraintSet,
    incoming: &ConstraintSet,
) -> Result<ConstraintSet, ConflictError> {
    if incoming.is_any() {
        return Ok(current.clone());
    }
    if current.is_any() {
        return Ok(incoming.clone());
    }

    fold(current.clone(), incoming.clauses(), Mode::Join).ok_or_else(|| ConflictError {
        current: current.clone(),
        incoming: incoming.clone(),
    })
}

/// Dry run of [`combine`]
pub fn are_compatible(current: &ConstraintSet, incoming: &ConstraintSet) -> bool {
    combine(current, incoming).is_ok()
}

/// Returns true if some version satisfies both sets
///
/// Unlike [`are_compatible`], bounds that tie on a version with different
/// strictness still overlap: `>1.26` and `>=1.26` share `1.27`.
pub fn overlaps(a: &ConstraintSet, b: &ConstraintSet) -> bool {
    if a.is_any() || b.is_any() {
        return true;
    }
    fold(a.clone(), b.clauses(), Mode::Build).is_some()
}

/// Returns true if `clause` can be added to `current` without emptying it
pub fn is_compatible(current: &ConstraintSet, clause: &Clause) -> bool {
    check(current, clause, Mode::Join)
}

/// Reduce the clauses of a single expression into a set, or `None` if
/// they contradict each other
pub(crate) fn build_set(clauses: impl IntoIterator<Item = Clause>) -> Option<ConstraintSet> {
    fold(ConstraintSet::any(), clauses, Mode::Build)
}

fn fold(
    mut acc: ConstraintSet,
    clauses: impl IntoIterator<Item = Clause>,
    mode: Mode,
) -> Option<ConstraintSet> {
    for clause in clauses {
        if !check(&acc, &clause, mode) {
            return None;
        }
        apply(&mut acc, clause);
    }
    Some(acc)
}

fn check(acc: &ConstraintSet, clause: &Clause, mode: Mode) -> bool {
    if let Some(pin) = acc.pin() {
        // a pinned accumulator admits exactly one version
        return match clause {
            Clause::Exclude(v) => v != pin,
            other => other.matches(pin),
        };
    }

    match clause {
        Clause::Pin(v) => acc.contains(v),
        Clause::Exclude(_) => true,
        Clause::Lower(bound) => {
            if mode == Mode::Join && strictness_tie(acc.lower(), bound) {
                return false;
            }
            acc.upper().map_or(true, |upper| bounds_overlap(bound, upper))
        }
        Clause::Upper(bound) => {
            if mode == Mode::Join && strictness_tie(acc.upper(), bound) {
                return false;
            }
            acc.lower().map_or(true, |lower| bounds_overlap(lower, bound))
        }
    }
}

fn strictness_tie(existing: Option<&Bound>, proposed: &Bound) -> bool {
    existing.is_some_and(|b| b.version == proposed.version && b.inclusive != proposed.inclusive)
}

/// Can some version sit at or above `lower` and at or below `upper`?
fn bounds_overlap(lower: &Bound, upper: &Bound) -> bool {
    match lower.version.cmp(&upper.version) {
        Ordering::Less => true,
        Ordering::Equal => lower.inclusive && upper.inclusive,
        Ordering::Greater => false,
    }
}

fn apply(acc: &mut ConstraintSet, clause: Clause) {
    match clause {
        Clause::Pin(v) => *acc = ConstraintSet::pinned(v),
        _ if acc.pin.is_some() => {}
        Clause::Exclude(v) => {
            if !acc.exclusions.contains(&v) {
                acc.exclusions.push(v);
            }
        }
        Clause::Lower(bound) => {
            if acc.lower.as_ref().map_or(true, |b| tighter(&bound, b, Ordering::Greater)) {
                acc.lower = Some(bound);
            }
        }
        Clause::Upper(bound) => {
            if acc.upper.as_ref().map_or(true, |b| tighter(&bound, b, Ordering::Less)) {
                acc.upper = Some(bound);
            }
        }
    }
}

/// `proposed` beats `existing` when it lies further in `direction`, or at
/// the same version when it is strict and `existing` is not
fn tighter(proposed: &Bound, existing: &Bound, direction: Ordering) -> bool {
    match proposed.version.cmp(&existing.version) {
        Ordering::Equal => !proposed.inclusive && existing.inclusive,
        ordering => ordering == direction,
    }
}
