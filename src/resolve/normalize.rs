//! Rewrites raw clauses into canonical bound/exclusion clauses
//!
//! - `==X.Y.*` becomes `>=X.Y.0,<X.(Y+1).0`
//! - `~=X.Y` becomes `>=X.Y,<X.(Y+1)`; `~=X` becomes `>=X,<X+1`
//! - `~=X.Y.Z...` drops the last segment and bumps the one before it,
//!   so `~=1.2.3.4` becomes `>=1.2.3.4,<1.2.4`
//! - `!=X.Y.*` becomes `!=X.Y` and reports the approximation
//! - a wildcard on any other operator is dropped

use crate::domain::{Bound, Clause, Operator, RawClause, Version, VersionLiteral};
use crate::error::{ParseError, UnrepresentableWildcardExclusion};

/// Minimum number of release segments written for wildcard bounds
const WILDCARD_PAD: usize = 3;

/// Canonical form of one raw clause
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    /// One or two canonical clauses
    pub clauses: Vec<Clause>,
    /// Set when `!=X.*` had to be approximated
    pub approximation: Option<UnrepresentableWildcardExclusion>,
}

impl Normalized {
    fn exact(clauses: Vec<Clause>) -> Self {
        Self {
            clauses,
            approximation: None,
        }
    }
}

/// Normalize a raw clause
pub fn normalize(raw: &RawClause) -> Result<Normalized, ParseError> {
    match &raw.literal {
        VersionLiteral::Exact(version) => normalize_exact(raw, raw.operator, version),
        VersionLiteral::Wildcard(prefix) => normalize_wildcard(raw, prefix),
    }
}

fn normalize_exact(
    raw: &RawClause,
    operator: Operator,
    version: &Version,
) -> Result<Normalized, ParseError> {
    let v = version.clone();
    let clause = match operator {
        Operator::Equal => Clause::Pin(v),
        Operator::NotEqual => Clause::Exclude(v),
        Operator::Greater => Clause::Lower(Bound::exclusive(v)),
        Operator::GreaterOrEqual => Clause::Lower(Bound::inclusive(v)),
        Operator::Less => Clause::Upper(Bound::exclusive(v)),
        Operator::LessOrEqual => Clause::Upper(Bound::inclusive(v)),
        Operator::Compatible => return compatible_release(raw, version),
    };
    Ok(Normalized::exact(vec![clause]))
}

/// `~=` keeps the written version as lower bound; the upper bound bumps
/// the second segment of `X.Y` and the next-to-last segment of longer
/// releases
fn compatible_release(raw: &RawClause, version: &Version) -> Result<Normalized, ParseError> {
    let mut upper = match version.release() {
        [] => vec![0],
        release @ ([_] | [_, _]) => release.to_vec(),
        [prefix @ .., _] => prefix.to_vec(),
    };
    bump_last(raw, &mut upper)?;
    Ok(Normalized::exact(vec![
        Clause::Lower(Bound::inclusive(version.clone())),
        Clause::Upper(Bound::exclusive(Version::from_release(upper))),
    ]))
}

/// Increments the last release segment in place
fn bump_last(raw: &RawClause, segments: &mut [u64]) -> Result<(), ParseError> {
    if let Some(last) = segments.last_mut() {
        *last = last
            .checked_add(1)
            .ok_or_else(|| ParseError::new(raw.to_string(), "version segment too large to bump"))?;
    }
    Ok(())
}

fn normalize_wildcard(raw: &RawClause, prefix: &[u64]) -> Result<Normalized, ParseError> {
    let base = Version::from_release(prefix.to_vec());
    match raw.operator {
        Operator::Equal => {
            let mut upper = prefix.to_vec();
            bump_last(raw, &mut upper)?;
            Ok(Normalized::exact(vec![
                Clause::Lower(Bound::inclusive(Version::from_release(padded(prefix.to_vec())))),
                Clause::Upper(Bound::exclusive(Version::from_release(padded(upper)))),
            ]))
        }
        Operator::NotEqual => {
            let clause = Clause::Exclude(base);
            Ok(Normalized {
                approximation: Some(UnrepresentableWildcardExclusion {
                    literal: raw.to_string(),
                    approximation: clause.to_string(),
                }),
                clauses: vec![clause],
            })
        }
        Operator::Compatible => Err(ParseError::new(
            raw.to_string(),
            "compatible release cannot use a wildcard",
        )),
        operator => normalize_exact(raw, operator, &base),
    }
}

fn padded(mut segments: Vec<u64>) -> Vec<u64> {
    if segments.len() < WILDCARD_PAD {
        segments.resize(WILDCARD_PAD, 0);
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::parse_version;
    use crate::parser::parse_clause;

    fn norm(text: &str) -> Normalized {
        normalize(&parse_clause(text).unwrap()).unwrap()
    }

    fn rendered(text: &str) -> Vec<String> {
        norm(text).clauses.iter().map(|c| c.to_string()).collect()
    }

    fn admits(text: &str, version: &str) -> bool {
        let version = parse_version(version).unwrap();
        norm(text).clauses.iter().all(|c| c.matches(&version))
    }

    #[test]
    fn test_plain_clauses_pass_through() {
        assert_eq!(rendered(">=1.2"), vec![">=1.2"]);
        assert_eq!(rendered("<2"), vec!["<2"]);
        assert_eq!(rendered("!=1.5"), vec!["!=1.5"]);
        assert_eq!(rendered("==1.0.1"), vec!["==1.0.1"]);
    }

    #[test]
    fn test_wildcard_pin() {
        assert_eq!(rendered("==1.*"), vec![">=1.0.0", "<2.0.0"]);
        assert_eq!(rendered("==1.6.*"), vec![">=1.6.0", "<1.7.0"]);
        assert_eq!(rendered("==1.2.3.*"), vec![">=1.2.3", "<1.2.4"]);
    }

    #[test]
    fn test_wildcard_pin_admits_prefix_only() {
        for ok in ["1.0", "1.0.1", "1.9.9"] {
            assert!(admits("==1.*", ok), "{}", ok);
        }
        assert!(!admits("==1.*", "2.0"));
        assert!(!admits("==1.*", "0.9"));
    }

    #[test]
    fn test_compatible_release() {
        assert_eq!(rendered("~=1.2"), vec![">=1.2", "<1.3"]);
        assert_eq!(rendered("~=1.2.3"), vec![">=1.2.3", "<1.3"]);
        assert_eq!(rendered("~=3.0"), vec![">=3.0", "<3.1"]);
        assert_eq!(rendered("~=2"), vec![">=2", "<3"]);
        assert_eq!(rendered("~=1.2.3.4"), vec![">=1.2.3.4", "<1.2.4"]);
    }

    #[test]
    fn test_compatible_release_membership() {
        assert!(admits("~=1.2", "1.2"));
        assert!(admits("~=1.2", "1.2.9"));
        assert!(!admits("~=1.2", "1.1.9"));
        assert!(!admits("~=1.2", "1.3.0"));
    }

    #[test]
    fn test_wildcard_exclusion_is_approximated() {
        let normalized = norm("!=1.6.*");
        assert_eq!(normalized.clauses.len(), 1);
        assert_eq!(normalized.clauses[0].to_string(), "!=1.6");
        let signal = normalized.approximation.unwrap();
        assert_eq!(signal.literal, "!=1.6.*");
        assert_eq!(signal.approximation, "!=1.6");
    }

    #[test]
    fn test_wildcard_on_bound_is_dropped() {
        let normalized = norm(">=1.6.*");
        assert_eq!(normalized.clauses[0].to_string(), ">=1.6");
        assert!(normalized.approximation.is_none());
    }

    #[test]
    fn test_compatible_wildcard_is_error() {
        let raw = parse_clause("~=1.*").unwrap();
        let err = normalize(&raw).unwrap_err();
        assert_eq!(err.token, "~=1.*");
    }

    #[test]
    fn test_bump_overflow_is_error() {
        for text in ["~=18446744073709551615", "~=1.18446744073709551615", "==18446744073709551615.*"] {
            let raw = parse_clause(text).unwrap();
            let err = normalize(&raw).unwrap_err();
            assert_eq!(err.token, text);
            assert_eq!(err.message, "version segment too large to bump");
        }
        assert!(crate::parser::parse_constraint_set("~=18446744073709551615").is_err());
    }
}
