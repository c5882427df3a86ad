//! Orchestrator for coordinating a compatibility review
//!
//! This module provides:
//! - Workflow coordination: discover → aggregate → matrix → report
//! - Bounded parallel discovery with results kept in input order
//! - Fail-fast cancellation of outstanding discovery work
//! - A single batch error naming every package that failed

use crate::baseline::ComplianceBaseline;
use crate::config::{DiscoverySetting, Settings};
use crate::discovery::{CommandDiscovery, DependencyDiscovery, SnapshotDiscovery};
use crate::domain::DependencyRequirements;
use crate::error::{AppError, BatchDiscoveryError, ConfigError, DiscoveryError};
use crate::progress::Progress;
use crate::resolve::{build_report, check_installable, CompatibilityReport, Registry};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Discover every package with at most `jobs` running at once
///
/// Results are returned in the order of `packages`, whatever order the
/// workers finish in. With `fail_fast`, the first failure aborts all
/// outstanding work.
pub async fn discover_all(
    discovery: Arc<dyn DependencyDiscovery>,
    packages: &[String],
    jobs: usize,
    fail_fast: bool,
    progress: &Progress,
) -> Result<Vec<DependencyRequirements>, BatchDiscoveryError> {
    let semaphore = Arc::new(Semaphore::new(jobs.max(1)));
    let mut tasks = JoinSet::new();

    for (index, package) in packages.iter().enumerate() {
        let discovery = Arc::clone(&discovery);
        let semaphore = Arc::clone(&semaphore);
        let package = package.clone();
        tasks.spawn(async move {
            let result = match semaphore.acquire_owned().await {
                Ok(_permit) => {
                    tracing::debug!(package = %package, backend = discovery.name(), "discovering");
                    discovery
                        .discover(&package)
                        .await
                        .map(|found| DependencyRequirements::from_discovered(&package, found))
                }
                Err(_) => Err(DiscoveryError::new(&package, "worker pool closed")),
            };
            (index, result)
        });
    }

    let mut slots: Vec<Option<DependencyRequirements>> = packages.iter().map(|_| None).collect();
    let mut failures: Vec<(usize, DiscoveryError)> = Vec::new();
    let mut aborted = false;

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, Ok(requirements))) => {
                progress.set_message(requirements.project());
                slots[index] = Some(requirements);
            }
            Ok((index, Err(error))) => {
                tracing::warn!(package = %error.package, "{}", error.message);
                failures.push((index, error));
                if fail_fast && !aborted {
                    tasks.abort_all();
                    aborted = true;
                }
            }
            Err(join_error) if join_error.is_cancelled() => {}
            Err(join_error) => {
                tracing::error!(error = %join_error, "discovery task failed");
            }
        }
        progress.inc();
    }

    if !aborted {
        // a task that neither filled its slot nor reported an error panicked
        for (index, slot) in slots.iter().enumerate() {
            if slot.is_none() && !failures.iter().any(|(i, _)| *i == index) {
                failures.push((
                    index,
                    DiscoveryError::new(&packages[index], "discovery task panicked"),
                ));
            }
        }
    }

    if !failures.is_empty() {
        failures.sort_by_key(|(index, _)| *index);
        return Err(BatchDiscoveryError {
            failures: failures.into_iter().map(|(_, e)| e).collect(),
        });
    }

    Ok(slots.into_iter().flatten().collect())
}

/// Orchestrator for coordinating the review workflow
pub struct Orchestrator {
    settings: Settings,
    /// Discovery for core packages
    core_discovery: Arc<dyn DependencyDiscovery>,
    /// Discovery for other packages
    other_discovery: Arc<dyn DependencyDiscovery>,
    show_progress: bool,
}

impl Orchestrator {
    /// Create an orchestrator from resolved settings
    pub fn new(settings: Settings) -> Result<Self, ConfigError> {
        let (core_discovery, other_discovery) = match &settings.discovery {
            DiscoverySetting::Snapshots(dir) => {
                let snapshots: Arc<dyn DependencyDiscovery> = Arc::new(SnapshotDiscovery::new(dir));
                (Arc::clone(&snapshots), snapshots)
            }
            DiscoverySetting::Command { core, other } => {
                let core: Arc<dyn DependencyDiscovery> =
                    Arc::new(CommandDiscovery::from_template(core)?);
                let other: Arc<dyn DependencyDiscovery> =
                    Arc::new(CommandDiscovery::from_template(other)?);
                (core, other)
            }
        };

        Ok(Self::with_discovery(settings, core_discovery, other_discovery))
    }

    /// Create an orchestrator with custom discovery backends (for testing)
    pub fn with_discovery(
        settings: Settings,
        core_discovery: Arc<dyn DependencyDiscovery>,
        other_discovery: Arc<dyn DependencyDiscovery>,
    ) -> Self {
        Self {
            settings,
            core_discovery,
            other_discovery,
            show_progress: false,
        }
    }

    /// Enable or disable progress bars
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Discover core and other packages
    pub async fn discover(
        &self,
    ) -> Result<(Vec<DependencyRequirements>, Vec<DependencyRequirements>), AppError> {
        let mut progress = Progress::new(self.show_progress);
        let total = self.settings.core.len() + self.settings.other.len();
        progress.start(total as u64, "Discovering dependencies");

        let core = discover_all(
            Arc::clone(&self.core_discovery),
            &self.settings.core,
            self.settings.jobs,
            self.settings.fail_fast,
            &progress,
        )
        .await;
        let core = match core {
            Ok(core) => core,
            Err(e) => {
                progress.finish_and_clear();
                return Err(e.into());
            }
        };

        let other = discover_all(
            Arc::clone(&self.other_discovery),
            &self.settings.other,
            self.settings.jobs,
            self.settings.fail_fast,
            &progress,
        )
        .await;
        progress.finish_and_clear();

        Ok((core, other?))
    }

    /// Build the full compatibility report
    pub async fn report(&self) -> Result<CompatibilityReport, AppError> {
        let baseline = self.load_baseline()?;
        let (core, other) = self.discover().await?;
        Ok(build_report(&core, &other, &baseline)?)
    }

    /// Check that every package can be installed together
    pub async fn check(&self) -> Result<Registry, AppError> {
        let (core, other) = self.discover().await?;
        let all: Vec<DependencyRequirements> = core.into_iter().chain(other).collect();
        Ok(check_installable(&all)?)
    }

    fn load_baseline(&self) -> Result<ComplianceBaseline, AppError> {
        let source = self.settings.baseline_source();
        let baseline = source.load()?;
        tracing::debug!(source = %source.describe(), entries = baseline.len(), "loaded baseline");
        Ok(baseline)
    }
}
