//! Parser for `uv pip tree --show-version-specifiers` output
//!
//! Expected shape:
//! ```text
//! requests v2.32.5
//! ├── certifi v2026.1.4 [required: >=2017.4.17]
//! └── urllib3 v2.5.0 [required: >=1.21.1, <3]
//! ```

use super::{parse_constraint_set, ANY};
use crate::domain::{canonical_name, parse_version, ConstraintSet, Version};
use crate::error::DiscoveryError;
use crate::resolve::combine;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static ROOT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z0-9_.-]+)\s+v(\S+)$").unwrap());
static DEPENDENCY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[│\s├└─]*([A-Za-z0-9_.-]+)\s+v\S+\s+\[(?:required|requires):\s+(.+?)\]\s*$")
        .unwrap()
});

/// A package's resolved version and the ranges it places on its dependencies
#[derive(Debug, Clone, PartialEq)]
pub struct Discovered {
    /// Root package name as printed by the tool
    pub name: String,
    /// Resolved version of the root package
    pub version: Version,
    /// Dependency name (lower-cased) -> intersected range
    pub requirements: BTreeMap<String, ConstraintSet>,
}

/// Parse dependency-tree output captured for `package`
///
/// Lines that are neither the root nor a dependency with a specifier are
/// ignored. A dependency listed more than once has its ranges intersected.
pub fn parse_tree_output(package: &str, output: &str) -> Result<Discovered, DiscoveryError> {
    let mut lines = output.lines().map(str::trim).filter(|l| !l.is_empty());

    let root = lines
        .next()
        .ok_or_else(|| DiscoveryError::new(package, "empty dependency tree output"))?;
    let caps = ROOT_RE.captures(root).ok_or_else(|| {
        DiscoveryError::new(
            package,
            format!("first line did not match '<name> v<version>': {}", root),
        )
    })?;
    let name = caps[1].to_string();
    let version = parse_version(&caps[2]).map_err(|e| DiscoveryError::new(package, e.to_string()))?;

    let mut requirements: BTreeMap<String, ConstraintSet> = BTreeMap::new();
    for line in lines {
        let Some(caps) = DEPENDENCY_RE.captures(line) else {
            continue;
        };
        let dependency = canonical_name(&caps[1]);
        let range = parse_requirement(&caps[2])
            .map_err(|e| DiscoveryError::new(package, format!("{}: {}", dependency, e)))?;

        let merged = match requirements.get(&dependency) {
            Some(existing) => combine(existing, &range).map_err(|e| {
                DiscoveryError::new(package, format!("{} listed twice: {}", dependency, e))
            })?,
            None => range,
        };
        requirements.insert(dependency, merged);
    }

    Ok(Discovered {
        name,
        version,
        requirements,
    })
}

fn parse_requirement(text: &str) -> Result<ConstraintSet, crate::error::ParseError> {
    let text = text.trim();
    if text == "*" {
        return parse_constraint_set(ANY);
    }
    let compact: Vec<&str> = text.split(',').map(str::trim).collect();
    parse_constraint_set(&compact.join(","))
}
