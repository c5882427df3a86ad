//! Configuration file and resolved settings
//!
//! Values are layered: CLI arguments override the config file, which
//! overrides built-in defaults.
//!
//! ```toml
//! [packages]
//! core = ["numpy", "astropy"]
//! other = ["sunpy", "hapiclient"]
//!
//! [discovery]
//! command = "./tree-for-package.sh {package}"
//! core_command = "uv pip tree --show-version-specifiers --package {name}"
//! jobs = 4
//!
//! [baseline]
//! numpy = ">=1.26.0"
//! ```

use crate::baseline::{BaselineSource, FileBaseline, StaticBaseline};
use crate::cli::CliArgs;
use crate::discovery::DEFAULT_COMMAND;
use crate::error::ConfigError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "depmatrix.toml";

/// Default number of concurrent discoveries
pub const DEFAULT_JOBS: usize = 4;

/// Contents of `depmatrix.toml`
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub packages: PackagesSection,
    pub discovery: DiscoverySection,
    pub baseline: BaselineSection,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PackagesSection {
    pub core: Vec<String>,
    pub other: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DiscoverySection {
    /// Template for other packages
    pub command: Option<String>,
    /// Template for core packages (usually an already-installed environment)
    pub core_command: Option<String>,
    pub jobs: Option<usize>,
    pub snapshots: Option<PathBuf>,
    pub fail_fast: Option<bool>,
}

/// `file = "..."` or inline `name = ">=x"` entries
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct BaselineSection {
    pub file: Option<PathBuf>,
    #[serde(flatten)]
    pub entries: BTreeMap<String, String>,
}

impl FileConfig {
    /// Parse config text; `path` is used for error messages
    pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::TomlParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Read and parse a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    /// Load the explicit config file, or `depmatrix.toml` if it exists
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    tracing::debug!(path = DEFAULT_CONFIG_FILE, "using config file");
                    Self::load(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

/// Where the compliance baseline comes from
#[derive(Debug, Clone, PartialEq, Default)]
pub enum BaselineSetting {
    #[default]
    None,
    File(PathBuf),
    Inline(Vec<(String, String)>),
}

/// Discovery backend to use
#[derive(Debug, Clone, PartialEq)]
pub enum DiscoverySetting {
    /// Run commands; separate templates for core and other packages
    Command { core: String, other: String },
    /// Read captured output from a directory
    Snapshots(PathBuf),
}

/// Fully resolved settings for one run
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub core: Vec<String>,
    pub other: Vec<String>,
    pub discovery: DiscoverySetting,
    pub jobs: usize,
    pub fail_fast: bool,
    pub baseline: BaselineSetting,
    pub check: bool,
}

impl Settings {
    /// Resolve settings from CLI arguments and the config file they point to
    pub fn resolve(args: &CliArgs) -> Result<Self, ConfigError> {
        let file = FileConfig::discover(args.config.as_deref())?;
        Self::from_parts(args, file)
    }

    /// Layer CLI arguments over an already-loaded config file
    pub fn from_parts(args: &CliArgs, file: FileConfig) -> Result<Self, ConfigError> {
        let core = if args.core.is_empty() {
            file.packages.core
        } else {
            args.core.clone()
        };
        let other = if args.packages.is_empty() {
            file.packages.other
        } else {
            args.packages.clone()
        };
        if core.is_empty() && other.is_empty() {
            return Err(ConfigError::NoPackages);
        }

        if args.snapshots.is_some() && args.command.is_some() {
            return Err(ConfigError::ConflictingOptions {
                message: "--snapshots and --command cannot be used together".to_string(),
            });
        }
        let discovery = match args.snapshots.clone() {
            Some(dir) => DiscoverySetting::Snapshots(dir),
            None if args.command.is_some() => {
                let command = args.command.clone().unwrap_or_default();
                DiscoverySetting::Command {
                    core: file.discovery.core_command.unwrap_or_else(|| command.clone()),
                    other: command,
                }
            }
            None => match file.discovery.snapshots {
                Some(dir) => DiscoverySetting::Snapshots(dir),
                None => {
                    let other = file
                        .discovery
                        .command
                        .unwrap_or_else(|| DEFAULT_COMMAND.to_string());
                    DiscoverySetting::Command {
                        core: file.discovery.core_command.unwrap_or_else(|| other.clone()),
                        other,
                    }
                }
            },
        };

        let jobs = args.jobs.or(file.discovery.jobs).unwrap_or(DEFAULT_JOBS);
        if jobs == 0 {
            return Err(ConfigError::InvalidJobs { value: jobs });
        }

        let baseline = match (&args.baseline, file.baseline.file, file.baseline.entries) {
            (Some(path), _, _) => BaselineSetting::File(path.clone()),
            (None, Some(_), entries) if !entries.is_empty() => {
                return Err(ConfigError::ConflictingOptions {
                    message: "[baseline] has both `file` and inline entries".to_string(),
                })
            }
            (None, Some(path), _) => BaselineSetting::File(path),
            (None, None, entries) if !entries.is_empty() => {
                BaselineSetting::Inline(entries.into_iter().collect())
            }
            (None, None, _) => BaselineSetting::None,
        };

        Ok(Self {
            core,
            other,
            discovery,
            jobs,
            fail_fast: !args.keep_going && file.discovery.fail_fast.unwrap_or(true),
            baseline,
            check: args.check,
        })
    }

    /// Baseline source for these settings
    pub fn baseline_source(&self) -> Box<dyn BaselineSource> {
        match &self.baseline {
            BaselineSetting::None => Box::new(StaticBaseline::default()),
            BaselineSetting::File(path) => Box::new(FileBaseline::new(path)),
            BaselineSetting::Inline(entries) => Box::new(StaticBaseline::new(entries.clone())),
        }
    }
}
