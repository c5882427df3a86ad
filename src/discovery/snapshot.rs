//! Discovery from captured tree output

use super::{base_package_name, DependencyDiscovery};
use crate::error::DiscoveryError;
use crate::parser::{parse_tree_output, Discovered};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Reads `<dir>/<base-name>.txt` for each package
#[derive(Debug, Clone)]
pub struct SnapshotDiscovery {
    dir: PathBuf,
}

impl SnapshotDiscovery {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Snapshot file for a package spec
    pub fn snapshot_path(&self, package: &str) -> PathBuf {
        self.dir.join(format!("{}.txt", base_package_name(package)))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl DependencyDiscovery for SnapshotDiscovery {
    fn name(&self) -> &'static str {
        "snapshot"
    }

    async fn discover(&self, package: &str) -> Result<Discovered, DiscoveryError> {
        let path = self.snapshot_path(package);
        tracing::debug!(package, path = %path.display(), "reading snapshot");
        let text = tokio::fs::read_to_string(&path).await.map_err(|e| {
            DiscoveryError::new(package, format!("cannot read snapshot {}: {}", path.display(), e))
        })?;
        parse_tree_output(package, &text)
    }
}
