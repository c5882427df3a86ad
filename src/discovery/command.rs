//! Discovery through an external dependency-tree command

use super::{base_package_name, DependencyDiscovery};
use crate::error::{ConfigError, DiscoveryError};
use crate::parser::{parse_tree_output, Discovered};
use async_trait::async_trait;
use tokio::process::Command;

/// Default command template
pub const DEFAULT_COMMAND: &str = "uv pip tree --show-version-specifiers --package {name}";

/// Placeholder replaced by the full package spec
const PACKAGE_PLACEHOLDER: &str = "{package}";
/// Placeholder replaced by the base package name
const NAME_PLACEHOLDER: &str = "{name}";

/// Runs a whitespace-split command template once per package
///
/// `{package}` expands to the spec as given (`sunpy==7.1.0`) and `{name}`
/// to its base name (`sunpy`). The command's stdout must be
/// `uv pip tree --show-version-specifiers` output.
#[derive(Debug, Clone)]
pub struct CommandDiscovery {
    program: String,
    args: Vec<String>,
}

impl CommandDiscovery {
    /// Create from a command template
    pub fn from_template(template: &str) -> Result<Self, ConfigError> {
        let mut words = template.split_whitespace().map(str::to_string);
        let program = words.next().ok_or_else(|| ConfigError::InvalidCommand {
            command: template.to_string(),
            message: "command is empty".to_string(),
        })?;
        let args: Vec<String> = words.collect();

        if !args
            .iter()
            .any(|a| a.contains(PACKAGE_PLACEHOLDER) || a.contains(NAME_PLACEHOLDER))
        {
            return Err(ConfigError::InvalidCommand {
                command: template.to_string(),
                message: format!(
                    "expected a {} or {} placeholder",
                    PACKAGE_PLACEHOLDER, NAME_PLACEHOLDER
                ),
            });
        }

        Ok(Self { program, args })
    }

    /// Program and arguments for one package
    pub fn command_line(&self, package: &str) -> (String, Vec<String>) {
        let name = base_package_name(package);
        let args = self
            .args
            .iter()
            .map(|a| {
                a.replace(PACKAGE_PLACEHOLDER, package.trim())
                    .replace(NAME_PLACEHOLDER, name)
            })
            .collect();
        (self.program.clone(), args)
    }
}

impl Default for CommandDiscovery {
    fn default() -> Self {
        Self {
            program: "uv".to_string(),
            args: DEFAULT_COMMAND
                .split_whitespace()
                .skip(1)
                .map(str::to_string)
                .collect(),
        }
    }
}

#[async_trait]
impl DependencyDiscovery for CommandDiscovery {
    fn name(&self) -> &'static str {
        "command"
    }

    async fn discover(&self, package: &str) -> Result<Discovered, DiscoveryError> {
        let (program, args) = self.command_line(package);
        tracing::debug!(package, command = %format!("{} {}", program, args.join(" ")), "running discovery command");

        let output = Command::new(&program)
            .args(&args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| DiscoveryError::new(package, format!("failed to run '{}': {}", program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DiscoveryError::new(
                package,
                format!("'{}' exited with {}: {}", program, output.status, stderr.trim()),
            ));
        }

        parse_tree_output(package, &String::from_utf8_lossy(&output.stdout))
    }
}
