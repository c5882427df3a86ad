//! Constraint clauses
//!
//! A clause pairs an operator with a version. Clauses come in two shapes:
//! - `RawClause`: as written, may carry `~=` or a `.*` wildcard
//! - `Clause`: canonical pin / exclusion / lower bound / upper bound

use super::Version;
use serde::{Serialize, Serializer};
use std::fmt;

/// Comparison operator of a clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterOrEqual,
    /// `<`
    Less,
    /// `<=`
    LessOrEqual,
    /// `~=` (compatible release)
    Compatible,
}

impl Operator {
    /// Operators in the order they must be tried when scanning text,
    /// two-character tokens before their one-character prefixes.
    pub const BY_MATCH_LENGTH: [Operator; 7] = [
        Operator::Compatible,
        Operator::Equal,
        Operator::NotEqual,
        Operator::GreaterOrEqual,
        Operator::LessOrEqual,
        Operator::Greater,
        Operator::Less,
    ];

    /// The operator token
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::Greater => ">",
            Operator::GreaterOrEqual => ">=",
            Operator::Less => "<",
            Operator::LessOrEqual => "<=",
            Operator::Compatible => "~=",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Version part of a clause as written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionLiteral {
    /// A complete version
    Exact(Version),
    /// Release prefix followed by `.*` (e.g. `1.6.*` holds `[1, 6]`)
    Wildcard(Vec<u64>),
}

impl fmt::Display for VersionLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionLiteral::Exact(version) => write!(f, "{}", version),
            VersionLiteral::Wildcard(prefix) => {
                let parts: Vec<String> = prefix.iter().map(|s| s.to_string()).collect();
                write!(f, "{}.*", parts.join("."))
            }
        }
    }
}

/// A clause exactly as parsed, before normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawClause {
    pub operator: Operator,
    pub literal: VersionLiteral,
}

impl RawClause {
    /// Creates a new raw clause
    pub fn new(operator: Operator, literal: VersionLiteral) -> Self {
        Self { operator, literal }
    }
}

impl fmt::Display for RawClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.operator, self.literal)
    }
}

/// One edge of a version interval
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Bound {
    pub version: Version,
    pub inclusive: bool,
}

impl Bound {
    /// Inclusive bound (`>=` / `<=`)
    pub fn inclusive(version: Version) -> Self {
        Self {
            version,
            inclusive: true,
        }
    }

    /// Exclusive bound (`>` / `<`)
    pub fn exclusive(version: Version) -> Self {
        Self {
            version,
            inclusive: false,
        }
    }
}

/// A canonical clause; never carries `~=` or a wildcard
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Clause {
    /// `==v`
    Pin(Version),
    /// `!=v`
    Exclude(Version),
    /// `>v` or `>=v`
    Lower(Bound),
    /// `<v` or `<=v`
    Upper(Bound),
}

impl Clause {
    /// The operator this clause renders with
    pub fn operator(&self) -> Operator {
        match self {
            Clause::Pin(_) => Operator::Equal,
            Clause::Exclude(_) => Operator::NotEqual,
            Clause::Lower(b) if b.inclusive => Operator::GreaterOrEqual,
            Clause::Lower(_) => Operator::Greater,
            Clause::Upper(b) if b.inclusive => Operator::LessOrEqual,
            Clause::Upper(_) => Operator::Less,
        }
    }

    /// The version this clause compares against
    pub fn version(&self) -> &Version {
        match self {
            Clause::Pin(v) | Clause::Exclude(v) => v,
            Clause::Lower(b) | Clause::Upper(b) => &b.version,
        }
    }

    /// Returns true if `version` satisfies this clause on its own
    pub fn matches(&self, version: &Version) -> bool {
        match self {
            Clause::Pin(v) => version == v,
            Clause::Exclude(v) => version != v,
            Clause::Lower(b) if b.inclusive => version >= &b.version,
            Clause::Lower(b) => version > &b.version,
            Clause::Upper(b) if b.inclusive => version <= &b.version,
            Clause::Upper(b) => version < &b.version,
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.operator(), self.version())
    }
}

impl Serialize for Clause {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
