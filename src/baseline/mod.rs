//! Compliance baseline
//!
//! A baseline maps dependency names to a minimum-version lower bound taken
//! from an external retention policy. It annotates results only and never
//! takes part in conflict detection.
//!
//! Sources:
//! - `FileBaseline`: one `name<op>version` entry per line
//! - `StaticBaseline`: entries given inline (e.g. from the config file)

use crate::domain::{canonical_name, Clause, ConstraintSet};
use crate::error::BaselineError;
use crate::parser::parse_constraint_set;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::LazyLock;

static ENTRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z0-9_.-]+)\s*(.*)$").unwrap());

/// Minimum-version policy per dependency
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComplianceBaseline {
    minimums: BTreeMap<String, ConstraintSet>,
}

impl ComplianceBaseline {
    /// Baseline with no tracked dependencies
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a baseline from (name, constraint) pairs
    pub fn from_entries<N, C>(entries: impl IntoIterator<Item = (N, C)>) -> Result<Self, BaselineError>
    where
        N: AsRef<str>,
        C: AsRef<str>,
    {
        let mut minimums = BTreeMap::new();
        for (name, constraint) in entries {
            let (name, constraint) = (name.as_ref(), constraint.as_ref());
            let line = format!("{}{}", name, constraint);
            let minimum = parse_minimum(&line, constraint)?;
            minimums.insert(canonical_name(name), minimum);
        }
        Ok(Self { minimums })
    }

    /// Parse `name<op>version` lines; blank lines and `#` comments are skipped
    pub fn parse(text: &str) -> Result<Self, BaselineError> {
        let mut minimums = BTreeMap::new();
        for line in text.lines() {
            let line = line.split('#').next().unwrap_or_default().trim();
            if line.is_empty() {
                continue;
            }
            let caps = ENTRY_RE
                .captures(line)
                .ok_or_else(|| BaselineError::invalid_entry(line, "expected name<op>version"))?;
            let minimum = parse_minimum(line, &caps[2])?;
            minimums.insert(canonical_name(&caps[1]), minimum);
        }
        Ok(Self { minimums })
    }

    /// The minimum-version constraint for `dependency`, if tracked
    pub fn minimum(&self, dependency: &str) -> Option<&ConstraintSet> {
        self.minimums.get(&canonical_name(dependency))
    }

    /// Iterate over tracked dependencies in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConstraintSet)> {
        self.minimums.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.minimums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.minimums.is_empty()
    }
}

fn parse_minimum(line: &str, constraint: &str) -> Result<ConstraintSet, BaselineError> {
    let constraint = constraint.trim();
    if constraint.is_empty() {
        return Err(BaselineError::invalid_entry(line, "missing minimum version"));
    }
    let set = parse_constraint_set(constraint)
        .map_err(|e| BaselineError::invalid_entry(line, e.to_string()))?;
    match set.clauses().as_slice() {
        [Clause::Lower(_)] => Ok(set),
        _ => Err(BaselineError::invalid_entry(
            line,
            "baseline must be a single lower bound (>= or >)",
        )),
    }
}

/// Something that can produce a compliance baseline
pub trait BaselineSource {
    /// Load the baseline
    fn load(&self) -> Result<ComplianceBaseline, BaselineError>;

    /// Human-readable origin, for logging
    fn describe(&self) -> String;
}

/// Baseline read from a text file
#[derive(Debug, Clone)]
pub struct FileBaseline {
    path: PathBuf,
}

impl FileBaseline {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl BaselineSource for FileBaseline {
    fn load(&self) -> Result<ComplianceBaseline, BaselineError> {
        let text = std::fs::read_to_string(&self.path).map_err(|source| BaselineError::ReadError {
            path: self.path.clone(),
            source,
        })?;
        let baseline = ComplianceBaseline::parse(&text)?;
        tracing::debug!(path = %self.path.display(), entries = baseline.len(), "loaded baseline file");
        Ok(baseline)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Baseline given as in-memory (name, constraint) pairs
#[derive(Debug, Clone, Default)]
pub struct StaticBaseline {
    entries: Vec<(String, String)>,
}

impl StaticBaseline {
    pub fn new(entries: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }
}

impl BaselineSource for StaticBaseline {
    fn load(&self) -> Result<ComplianceBaseline, BaselineError> {
        ComplianceBaseline::from_entries(self.entries.iter().map(|(n, c)| (n, c)))
    }

    fn describe(&self) -> String {
        format!("{} inline entries", self.entries.len())
    }
}
