//! CLI argument parsing module for depmatrix

use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Parse a worker count; zero workers is rejected
fn parse_jobs(s: &str) -> Result<usize, String> {
    let jobs: usize = s
        .trim()
        .parse()
        .map_err(|_| format!("invalid job count: {}", s))?;
    if jobs == 0 {
        return Err("job count must be at least 1".to_string());
    }
    Ok(jobs)
}

/// Cross-project dependency compatibility matrix
#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "depmatrix",
    version,
    about = "Find the dependency ranges a set of packages can share"
)]
pub struct CliArgs {
    /// Packages to review (e.g. `sunpy`, `hapiclient==0.2.6`)
    pub packages: Vec<String>,

    /// Core package that must never conflict (can be specified multiple times)
    #[arg(long = "core", action = ArgAction::Append, value_name = "PACKAGE")]
    pub core: Vec<String>,

    // Sources
    /// Config file (default: ./depmatrix.toml if present)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Compliance baseline file with one `name>=version` per line
    #[arg(long, value_name = "FILE")]
    pub baseline: Option<PathBuf>,

    /// Read captured tree output from `<DIR>/<name>.txt` instead of running commands
    #[arg(long, value_name = "DIR")]
    pub snapshots: Option<PathBuf>,

    /// Discovery command template with a {package} or {name} placeholder
    #[arg(long, value_name = "TEMPLATE")]
    pub command: Option<String>,

    /// Number of packages discovered concurrently
    #[arg(short, long, value_parser = parse_jobs)]
    pub jobs: Option<usize>,

    /// Keep discovering after a package fails and report every failure
    #[arg(long)]
    pub keep_going: bool,

    // Modes
    /// Only check that all packages can be installed together
    #[arg(long)]
    pub check: bool,

    // Output options
    /// Output results in JSON format
    #[arg(long)]
    pub json: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable quiet mode - minimal output
    #[arg(short, long)]
    pub quiet: bool,
}

impl CliArgs {
    /// Whether progress bars should be drawn
    pub fn show_progress(&self) -> bool {
        !self.quiet && !self.json
    }

    /// Default log filter when `RUST_LOG` is unset
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "warn"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_default_args() {
        let args = CliArgs::parse_from(["depmatrix"]);
        assert!(args.packages.is_empty());
        assert!(args.core.is_empty());
        assert!(args.config.is_none());
        assert!(args.baseline.is_none());
        assert!(args.snapshots.is_none());
        assert!(args.command.is_none());
        assert!(args.jobs.is_none());
        assert!(!args.keep_going);
        assert!(!args.check);
        assert!(!args.json);
        assert!(!args.verbose);
        assert!(!args.quiet);
    }

    #[test]
    fn test_positional_packages() {
        let args = CliArgs::parse_from(["depmatrix", "sunpy", "hapiclient==0.2.6"]);
        assert_eq!(args.packages, vec!["sunpy", "hapiclient==0.2.6"]);
    }

    #[test]
    fn test_core_multiple() {
        let args = CliArgs::parse_from(["depmatrix", "--core", "numpy", "--core", "astropy", "x"]);
        assert_eq!(args.core, vec!["numpy", "astropy"]);
        assert_eq!(args.packages, vec!["x"]);
    }

    #[test]
    fn test_jobs() {
        let args = CliArgs::parse_from(["depmatrix", "-j", "8"]);
        assert_eq!(args.jobs, Some(8));
        assert!(CliArgs::try_parse_from(["depmatrix", "--jobs", "0"]).is_err());
        assert!(CliArgs::try_parse_from(["depmatrix", "--jobs", "many"]).is_err());
    }

    #[test]
    fn test_parse_jobs() {
        assert_eq!(parse_jobs("4").unwrap(), 4);
        assert!(parse_jobs("0").is_err());
        assert!(parse_jobs("").is_err());
    }

    #[test]
    fn test_show_progress() {
        assert!(CliArgs::parse_from(["depmatrix"]).show_progress());
        assert!(!CliArgs::parse_from(["depmatrix", "-q"]).show_progress());
        assert!(!CliArgs::parse_from(["depmatrix", "--json"]).show_progress());
    }

    #[test]
    fn test_log_level() {
        assert_eq!(CliArgs::parse_from(["depmatrix"]).log_level(), "warn");
        assert_eq!(
            CliArgs::parse_from(["depmatrix", "--verbose"]).log_level(),
            "debug"
        );
    }

    #[test]
    fn test_combined_flags() {
        let args = CliArgs::parse_from([
            "depmatrix",
            "--config",
            "custom.toml",
            "--baseline",
            "spec0.txt",
            "--snapshots",
            "trees",
            "--check",
            "--keep-going",
            "--json",
            "sunpy",
        ]);
        assert_eq!(args.config, Some(PathBuf::from("custom.toml")));
        assert_eq!(args.baseline, Some(PathBuf::from("spec0.txt")));
        assert_eq!(args.snapshots, Some(PathBuf::from("trees")));
        assert!(args.check);
        assert!(args.keep_going);
        assert!(args.json);
        assert_eq!(args.packages, vec!["sunpy"]);
    }
}
