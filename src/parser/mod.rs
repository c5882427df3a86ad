//! Constraint expression parsers
//!
//! This module turns text into domain values:
//! - Single clauses (`>=1.2`, `!=1.6.*`, `~=3.0`)
//! - Comma-separated constraint sets, normalized and reduced
//! - `uv pip tree --show-version-specifiers` output (see [`tree`])

mod tree;

pub use crate::domain::parse_version;
pub use tree::{parse_tree_output, Discovered};

use crate::domain::{ConstraintSet, Operator, RawClause, VersionLiteral};
use crate::error::{ParseError, UnrepresentableWildcardExclusion};
use crate::resolve::{build_set, normalize};

/// Sentinel text for the unconstrained set
pub const ANY: &str = "any";

/// Parse one clause as written, e.g. `>=1.2` or `==1.*`
///
/// Operators are matched longest first so `<=1.0` never reads as `<` + `=1.0`.
pub fn parse_clause(text: &str) -> Result<RawClause, ParseError> {
    let trimmed = text.trim();

    if trimmed.starts_with("===") {
        return Err(ParseError::new(trimmed, "arbitrary equality is not supported"));
    }

    let operator = Operator::BY_MATCH_LENGTH
        .iter()
        .find(|op| trimmed.starts_with(op.symbol()))
        .copied()
        .ok_or_else(|| ParseError::new(trimmed, "expected an operator (==, !=, >, >=, <, <=, ~=)"))?;

    let literal = trimmed[operator.symbol().len()..].trim();
    if literal.is_empty() {
        return Err(ParseError::new(trimmed, "missing version after operator"));
    }

    Ok(RawClause::new(operator, parse_literal(trimmed, literal)?))
}

fn parse_literal(clause: &str, literal: &str) -> Result<VersionLiteral, ParseError> {
    let Some(prefix) = literal.strip_suffix(".*") else {
        let version = parse_version(literal)
            .map_err(|e| ParseError::new(clause, e.message))?;
        return Ok(VersionLiteral::Exact(version));
    };

    let prefix = prefix.strip_prefix(['v', 'V']).unwrap_or(prefix);
    let segments = prefix
        .split('.')
        .map(|s| s.parse::<u64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| ParseError::new(clause, "wildcard must follow numeric release segments"))?;

    Ok(VersionLiteral::Wildcard(segments))
}

/// Parse a constraint expression into a reduced constraint set
///
/// `any` (any case) and the empty string mean the unconstrained set.
/// Uses of the `!=X.*` approximation are logged; call
/// [`parse_constraint_set_audited`] to receive them instead.
pub fn parse_constraint_set(text: &str) -> Result<ConstraintSet, ParseError> {
    let (set, approximations) = parse_constraint_set_audited(text)?;
    for signal in &approximations {
        tracing::warn!(
            literal = %signal.literal,
            approximation = %signal.approximation,
            "wildcard exclusion cannot be represented exactly; excluding base version only"
        );
    }
    Ok(set)
}

/// Parse a constraint expression, returning every wildcard-exclusion
/// approximation made along the way
pub fn parse_constraint_set_audited(
    text: &str,
) -> Result<(ConstraintSet, Vec<UnrepresentableWildcardExclusion>), ParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ANY) {
        return Ok((ConstraintSet::any(), Vec::new()));
    }

    let mut clauses = Vec::new();
    let mut approximations = Vec::new();

    for segment in trimmed.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if segment.eq_ignore_ascii_case(ANY) {
            return Err(ParseError::new(
                trimmed,
                "'any' cannot be combined with other clauses",
            ));
        }
        let normalized = normalize(&parse_clause(segment)?)?;
        clauses.extend(normalized.clauses);
        approximations.extend(normalized.approximation);
    }

    let set = build_set(clauses)
        .ok_or_else(|| ParseError::new(trimmed, "clauses admit no version"))?;

    Ok((set, approximations))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Version;

    fn v(s: &str) -> Version {
        parse_version(s).unwrap()
    }

    #[test]
    fn test_parse_clause_operators() {
        let cases = [
            ("==1.0", Operator::Equal),
            ("!=1.0", Operator::NotEqual),
            (">1.0", Operator::Greater),
            (">=1.0", Operator::GreaterOrEqual),
            ("<1.0", Operator::Less),
            ("<=1.0", Operator::LessOrEqual),
            ("~=1.0", Operator::Compatible),
        ];
        for (text, expected) in cases {
            let clause = parse_clause(text).unwrap();
            assert_eq!(clause.operator, expected, "{}", text);
            assert_eq!(clause.literal, VersionLiteral::Exact(v("1.0")));
        }
    }

    #[test]
    fn test_parse_clause_less_or_equal_not_split() {
        let clause = parse_clause("<=2.0").unwrap();
        assert_eq!(clause.operator, Operator::LessOrEqual);
        assert_eq!(clause.to_string(), "<=2.0");
    }

    #[test]
    fn test_parse_clause_wildcard() {
        let clause = parse_clause("== 1.6.*").unwrap();
        assert_eq!(clause.operator, Operator::Equal);
        assert_eq!(clause.literal, VersionLiteral::Wildcard(vec![1, 6]));
    }

    #[test]
    fn test_parse_clause_errors_carry_token() {
        let err = parse_clause("1.0").unwrap_err();
        assert_eq!(err.token, "1.0");

        let err = parse_clause(">=").unwrap_err();
        assert_eq!(err.token, ">=");

        let err = parse_clause(">=abc").unwrap_err();
        assert_eq!(err.token, ">=abc");

        let err = parse_clause("===1.0").unwrap_err();
        assert!(err.message.contains("arbitrary equality"));

        let err = parse_clause("==x.*").unwrap_err();
        assert_eq!(err.token, "==x.*");
    }

    #[test]
    fn test_parse_any_and_empty() {
        assert!(parse_constraint_set("any").unwrap().is_any());
        assert!(parse_constraint_set("ANY").unwrap().is_any());
        assert!(parse_constraint_set("  ").unwrap().is_any());
        assert!(parse_constraint_set("").unwrap().is_any());
    }

    #[test]
    fn test_parse_any_mixed_is_error() {
        let err = parse_constraint_set(">=1.0,any").unwrap_err();
        assert!(err.message.contains("'any'"));
    }

    #[test]
    fn test_parse_set_reduces_and_orders() {
        let set = parse_constraint_set("!=1.5, <2.0, >=1.0, >=1.2").unwrap();
        assert_eq!(set.to_string(), ">=1.2,<2.0,!=1.5");
    }

    #[test]
    fn test_parse_set_expands_compatible_release() {
        assert_eq!(parse_constraint_set("~=1.2").unwrap().to_string(), ">=1.2,<1.3");
        assert_eq!(
            parse_constraint_set("~=1.2.3").unwrap().to_string(),
            ">=1.2.3,<1.3"
        );
    }

    #[test]
    fn test_parse_set_expands_wildcard_pin() {
        assert_eq!(
            parse_constraint_set("==1.*").unwrap().to_string(),
            ">=1.0.0,<2.0.0"
        );
    }

    #[test]
    fn test_parse_set_records_approximation() {
        let (set, signals) = parse_constraint_set_audited(">=1.0,!=1.6.*").unwrap();
        assert_eq!(set.to_string(), ">=1.0,!=1.6");
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].literal, "!=1.6.*");
        assert_eq!(signals[0].approximation, "!=1.6");
    }

    #[test]
    fn test_parse_set_self_contradiction() {
        let err = parse_constraint_set(">=2.0,<1.0").unwrap_err();
        assert_eq!(err.token, ">=2.0,<1.0");
        assert!(err.message.contains("no version"));
    }

    #[test]
    fn test_parse_set_skips_empty_segments() {
        let set = parse_constraint_set(">=1.0,,<2.0,").unwrap();
        assert_eq!(set.to_string(), ">=1.0,<2.0");
    }

    #[test]
    fn test_parse_set_bad_clause_names_clause() {
        let err = parse_constraint_set(">=1.0,>>2").unwrap_err();
        assert_eq!(err.token, ">>2");
    }
}
