//! Application error types using thiserror
//!
//! Error hierarchy:
//! - ParseError: malformed version or constraint text
//! - ConflictError: two constraint sets share no satisfying version
//! - UnrepresentableWildcardExclusion: audit signal for the `!=X.*` approximation
//! - AggregateError: fail-fast aggregation hit a conflict
//! - DiscoveryError / BatchDiscoveryError: dependency-tree discovery failures
//! - BaselineError: compliance baseline could not be loaded
//! - ConfigError: issues with CLI or config file values

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::domain::ConstraintSet;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Constraint text could not be parsed
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Fail-fast aggregation found a conflict
    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    /// One or more packages could not be discovered
    #[error(transparent)]
    Discovery(#[from] BatchDiscoveryError),

    /// Compliance baseline errors
    #[error(transparent)]
    Baseline(#[from] BaselineError),

    /// Configuration related errors
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Malformed version or constraint text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid version constraint '{token}': {message}")]
pub struct ParseError {
    /// The offending token as written
    pub token: String,
    /// What was wrong with it
    pub message: String,
}

impl ParseError {
    /// Creates a new ParseError
    pub fn new(token: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            message: message.into(),
        }
    }
}

/// Two constraint sets provably share no satisfying version
#[derive(Error, Debug, Clone, PartialEq)]
#[error("found incompatibility: {current} vs. {incoming}")]
pub struct ConflictError {
    /// The accumulated set the incoming set was combined into
    pub current: ConstraintSet,
    /// The set that could not be merged
    pub incoming: ConstraintSet,
}

/// Raised when `!=X.*` is approximated by `!=X`
///
/// Only the base version is excluded; `X.1`, `X.2`, ... remain allowed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("wildcard exclusion '{literal}' approximated as '{approximation}'")]
pub struct UnrepresentableWildcardExclusion {
    /// The wildcard clause as written (e.g. `!=1.6.*`)
    pub literal: String,
    /// The clause actually stored (e.g. `!=1.6`)
    pub approximation: String,
}

/// Errors raised while folding project requirements into a registry
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AggregateError {
    /// A project's range conflicts with the ranges accumulated so far
    #[error("found conflict in '{project}': {dependency} requires {} but {} is already required", .source.incoming, .source.current)]
    Conflict {
        project: String,
        dependency: String,
        #[source]
        source: ConflictError,
    },
}

impl AggregateError {
    /// Name of the dependency that conflicted
    pub fn dependency(&self) -> &str {
        match self {
            AggregateError::Conflict { dependency, .. } => dependency,
        }
    }
}

/// A single package's dependency discovery failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to process package '{package}': {message}")]
pub struct DiscoveryError {
    /// Package identifier as given by the caller
    pub package: String,
    /// Failure description
    pub message: String,
}

impl DiscoveryError {
    /// Creates a new DiscoveryError
    pub fn new(package: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            message: message.into(),
        }
    }
}

/// Every package whose discovery failed in one batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchDiscoveryError {
    /// Failures in the caller's package order
    pub failures: Vec<DiscoveryError>,
}

impl BatchDiscoveryError {
    /// Names of the packages that failed
    pub fn packages(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.package.as_str()).collect()
    }
}

impl fmt::Display for BatchDiscoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dependency discovery failed for {} package(s): {}",
            self.failures.len(),
            self.packages().join(", ")
        )?;
        for failure in &self.failures {
            write!(f, "\n  - {}", failure)?;
        }
        Ok(())
    }
}

impl std::error::Error for BatchDiscoveryError {}

/// Errors related to the compliance baseline
#[derive(Error, Debug)]
pub enum BaselineError {
    /// Baseline file could not be read
    #[error("failed to read baseline file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A baseline line is not `name<op>version`
    #[error("invalid baseline entry '{line}': {message}")]
    InvalidEntry { line: String, message: String },
}

impl BaselineError {
    /// Creates a new InvalidEntry error
    pub fn invalid_entry(line: impl Into<String>, message: impl Into<String>) -> Self {
        BaselineError::InvalidEntry {
            line: line.into(),
            message: message.into(),
        }
    }
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error
    #[error("failed to parse TOML in {path}: {message}")]
    TomlParseError { path: PathBuf, message: String },

    /// No packages were given
    #[error("no packages given: pass package names or list them in the config file")]
    NoPackages,

    /// Invalid worker count
    #[error("invalid job count {value}: expected at least 1")]
    InvalidJobs { value: usize },

    /// Invalid discovery command template
    #[error("invalid discovery command '{command}': {message}")]
    InvalidCommand { command: String, message: String },

    /// Conflicting options
    #[error("conflicting options: {message}")]
    ConflictingOptions { message: String },
}
