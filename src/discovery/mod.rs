//! Dependency discovery collaborators
//!
//! Discovery turns a package identifier into its resolved version and the
//! ranges it requires of its dependencies. This module provides:
//! - `CommandDiscovery`: runs a dependency-tree command per package
//! - `SnapshotDiscovery`: reads previously captured tree output from disk

mod command;
mod snapshot;

pub use command::{CommandDiscovery, DEFAULT_COMMAND};
pub use snapshot::SnapshotDiscovery;

use crate::domain::{canonical_name, ConstraintSet, DependencyRequirements};
use crate::error::DiscoveryError;
use crate::parser::Discovered;
use async_trait::async_trait;

/// Trait for dependency discovery backends
#[async_trait]
pub trait DependencyDiscovery: Send + Sync {
    /// Short backend name, for logging
    fn name(&self) -> &'static str;

    /// Discover the dependency ranges of one package
    async fn discover(&self, package: &str) -> Result<Discovered, DiscoveryError>;
}

/// Name part of a package spec
///
/// `"sunpy==7.1.0"` -> `"sunpy"`, `"pyhc-core[tests]==0.0.7"` -> `"pyhc-core"`
pub fn base_package_name(spec: &str) -> &str {
    spec.trim()
        .split(|c: char| matches!(c, '=' | '<' | '>' | '!' | '[') || c.is_whitespace())
        .next()
        .unwrap_or_default()
}

/// Label of a discovered project: the spec itself if it already pins a
/// version, otherwise `<spec>==<version>`
pub fn project_label(spec: &str, discovered: &Discovered) -> String {
    let spec = spec.trim();
    if spec.contains("==") {
        spec.to_string()
    } else {
        format!("{}=={}", spec, discovered.version)
    }
}

impl DependencyRequirements {
    /// Requirements of a discovered project, including its own pin
    pub fn from_discovered(spec: &str, discovered: Discovered) -> Self {
        let label = project_label(spec, &discovered);
        let own_pin = ConstraintSet::pinned(discovered.version.clone());
        let mut requirements = discovered.requirements;
        requirements.insert(canonical_name(base_package_name(spec)), own_pin);
        DependencyRequirements::new(label, requirements)
    }
}
