//! Text output formatter for human-readable display
//!
//! This module provides:
//! - Allowed range per dependency, with core and compliance markers
//! - Conflicts found while aggregating
//! - Per-project cells colored by classification
//! - Compliance problems and a closing summary line

use crate::domain::{Classification, MatrixCell, Ternary};
use crate::output::{CheckOutcome, ReportFormatter, Verbosity};
use crate::resolve::{CompatibilityReport, MatrixRow};
use colored::{ColoredString, Colorize};
use std::io::Write;

/// Label shown in place of a range for conflicted dependencies
const CONFLICT_LABEL: &str = "CONFLICT";

/// Text formatter for human-readable output
pub struct TextFormatter {
    /// Verbosity level
    verbosity: Verbosity,
    /// Whether to use colors
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            color: true,
        }
    }

    /// Create a new text formatter with color option
    pub fn with_color(verbosity: Verbosity, color: bool) -> Self {
        Self { verbosity, color }
    }

    /// Severity color of a classification
    fn paint(&self, text: &str, classification: Classification) -> String {
        if !self.color {
            return text.to_string();
        }
        let painted: ColoredString = match classification {
            Classification::FullyGood => text.green(),
            Classification::CompatibleNoncompliant => text.yellow(),
            Classification::IncompatibleCompliant => text.red(),
            Classification::IncompatibleNoncompliant => text.truecolor(255, 140, 0).bold(),
        };
        painted.to_string()
    }

    fn compliance_marker(compliant: Ternary) -> &'static str {
        match compliant {
            Ternary::Yes => "",
            Ternary::No => " (below baseline)",
            Ternary::Unknown => "",
        }
    }

    fn heading(&self, text: &str, writer: &mut dyn Write) -> std::io::Result<()> {
        if self.color {
            writeln!(writer, "{}", text.bold())
        } else {
            writeln!(writer, "{}", text)
        }
    }

    fn format_allowed(
        &self,
        report: &CompatibilityReport,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        if report.allowed.is_empty() {
            return Ok(());
        }
        self.heading("Allowed ranges", writer)?;
        let width = report.allowed.keys().map(|k| k.len()).max().unwrap_or(0);

        for (name, allowed) in &report.allowed {
            let core = if allowed.core { " [core]" } else { "" };
            let marker = Self::compliance_marker(allowed.compliant);
            match allowed.range.range() {
                Some(range) => {
                    let text = range.to_string();
                    let shown = if self.color && allowed.compliant.is_no() {
                        text.yellow().to_string()
                    } else {
                        text
                    };
                    writeln!(writer, "  {:width$} {}{}{}", name, shown, core, marker, width = width)?;
                }
                None => {
                    let shown = if self.color {
                        CONFLICT_LABEL.red().bold().to_string()
                    } else {
                        CONFLICT_LABEL.to_string()
                    };
                    writeln!(writer, "  {:width$} {}{}{}", name, shown, core, marker, width = width)?;
                }
            }
        }
        writeln!(writer)
    }

    fn format_conflicts(
        &self,
        report: &CompatibilityReport,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        if report.conflicts.is_empty() {
            return Ok(());
        }
        self.heading("Conflicts", writer)?;
        for record in &report.conflicts {
            writeln!(
                writer,
                "  {}: {} requires {} but {} is already required",
                record.project, record.dependency, record.required, record.already_required
            )?;
        }
        writeln!(writer)
    }

    fn format_row(&self, row: &MatrixRow, writer: &mut dyn Write) -> std::io::Result<()> {
        let present: Vec<(&String, &MatrixCell)> =
            row.cells.iter().filter(|(_, c)| !c.is_absent()).collect();
        let bad = present
            .iter()
            .filter(|(_, c)| c.classification() != Some(Classification::FullyGood))
            .count();

        if self.verbosity != Verbosity::Verbose && bad == 0 {
            return Ok(());
        }

        if self.color {
            writeln!(writer, "  {}", row.project.bold())?;
        } else {
            writeln!(writer, "  {}", row.project)?;
        }

        let width = present.iter().map(|(n, _)| n.len()).max().unwrap_or(0);
        for (name, cell) in &row.cells {
            match cell {
                MatrixCell::Absent => {
                    if self.verbosity == Verbosity::Verbose {
                        writeln!(writer, "    {:width$} -", name, width = width)?;
                    }
                }
                MatrixCell::Present {
                    range,
                    classification,
                    ..
                } => {
                    if self.verbosity != Verbosity::Verbose
                        && *classification == Classification::FullyGood
                    {
                        continue;
                    }
                    writeln!(
                        writer,
                        "    {:width$} {} [{}]",
                        name,
                        range,
                        self.paint(classification.label(), *classification),
                        width = width
                    )?;
                }
            }
        }
        Ok(())
    }

    fn format_summary(
        &self,
        report: &CompatibilityReport,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let projects = report.core_projects.len() + report.other_projects.len();
        let conflicts = report.conflicted_dependencies().len();
        let problems = report.compliance_problems.len();
        let line = format!(
            "{} projects, {} dependencies, {} {}, {} compliance {}",
            projects,
            report.allowed.len(),
            conflicts,
            if conflicts == 1 { "conflict" } else { "conflicts" },
            problems,
            if problems == 1 { "problem" } else { "problems" }
        );
        if self.color {
            let colored = if conflicts > 0 {
                line.red()
            } else if problems > 0 {
                line.yellow()
            } else {
                line.green()
            };
            writeln!(writer, "{}", colored)
        } else {
            writeln!(writer, "{}", line)
        }
    }
}

impl ReportFormatter for TextFormatter {
    fn format_report(
        &self,
        report: &CompatibilityReport,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        if self.verbosity == Verbosity::Quiet {
            for name in report.conflicted_dependencies() {
                writeln!(writer, "conflict: {}", name)?;
            }
            return self.format_summary(report, writer);
        }

        self.format_allowed(report, writer)?;
        self.format_conflicts(report, writer)?;

        if !report.matrix.is_empty() {
            self.heading("Projects", writer)?;
            for row in report.matrix.rows() {
                self.format_row(row, writer)?;
            }
            writeln!(writer)?;
        }

        if !report.compliance_problems.is_empty() {
            self.heading("Compliance problems", writer)?;
            for problem in &report.compliance_problems {
                writeln!(writer, "  {}", problem)?;
            }
            writeln!(writer)?;
        }

        self.format_summary(report, writer)
    }

    fn format_check(
        &self,
        outcome: CheckOutcome<'_>,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        match outcome {
            CheckOutcome::Installable(registry) => {
                let line = format!(
                    "All packages can be installed together ({} dependencies)",
                    registry.len()
                );
                if self.color {
                    writeln!(writer, "{}", line.green())?;
                } else {
                    writeln!(writer, "{}", line)?;
                }
                if self.verbosity == Verbosity::Verbose {
                    for (name, entry) in registry.iter() {
                        writeln!(writer, "  {} {}", name, entry)?;
                    }
                }
                Ok(())
            }
            CheckOutcome::Conflict(error) => {
                let line = format!("Not installable: {}", error);
                if self.color {
                    writeln!(writer, "{}", line.red())
                } else {
                    writeln!(writer, "{}", line)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baseline::ComplianceBaseline;
    use crate::domain::DependencyRequirements;
    use crate::parser::parse_constraint_set;
    use crate::resolve::{aggregate, build_report, check_installable};

    fn project(name: &str, reqs: &[(&str, &str)]) -> DependencyRequirements {
        DependencyRequirements::new(
            name,
            reqs.iter()
                .map(|(dep, range)| (dep.to_string(), parse_constraint_set(range).unwrap())),
        )
    }

    fn create_test_report() -> CompatibilityReport {
        let core = vec![project("core==1.0", &[("astropy", ">=6.0")])];
        let other = vec![
            project("x==1.0", &[("numpy", "<2"), ("scipy", ">=1.0")]),
            project("y==2.0", &[("numpy", ">=2"), ("scipy", "<1.10")]),
            project("z==3.0", &[("astropy", "<5"), ("pandas", "<2.0")]),
        ];
        let baseline = ComplianceBaseline::parse("scipy>=1.12\npandas>=2.0").unwrap();
        build_report(&core, &other, &baseline).unwrap()
    }

    fn render(formatter: &TextFormatter, report: &CompatibilityReport) -> String {
        let mut output = Vec::new();
        formatter.format_report(report, &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_format_normal() {
        let output = render(&TextFormatter::with_color(Verbosity::Normal, false), &create_test_report());

        assert!(output.contains("Allowed ranges"));
        assert!(output.contains("astropy >=6.0 [core]"));
        assert!(output.contains("numpy   CONFLICT"));
        assert!(output.contains("scipy   >=1.0,<1.10 (below baseline)"));
        assert!(output.contains("y==2.0: numpy requires >=2 but <2 is already required"));
        assert!(output.contains("astropy <5 [incompatible]"));
        assert!(output.contains("pandas  <2.0 [noncompliant]"));
        assert!(output.contains("y: requires scipy<1.10 but baseline requires scipy>=1.12"));
        assert!(output.contains("z: requires pandas<2.0 but baseline requires pandas>=2.0"));
        assert!(output.contains("4 projects, 4 dependencies, 1 conflict, 2 compliance problems"));
        // fully good rows are hidden outside verbose mode
        assert!(!output.contains("  core==1.0\n"));
    }

    #[test]
    fn test_format_verbose_shows_good_rows() {
        let output = render(&TextFormatter::with_color(Verbosity::Verbose, false), &create_test_report());
        assert!(output.contains("  core==1.0\n"));
        assert!(output.contains("astropy >=6.0 [ok]"));
        assert!(output.contains("numpy   -"));
    }

    #[test]
    fn test_format_quiet() {
        let output = render(&TextFormatter::with_color(Verbosity::Quiet, false), &create_test_report());
        assert!(output.starts_with("conflict: numpy\n"));
        assert!(!output.contains("Allowed ranges"));
        assert_eq!(output.lines().count(), 2);
    }

    #[test]
    fn test_format_with_color_keeps_text() {
        let output = render(&TextFormatter::new(Verbosity::Normal), &create_test_report());
        assert!(output.contains("CONFLICT"));
        assert!(output.contains("incompatible"));
    }

    #[test]
    fn test_format_check_installable() {
        let registry = aggregate(&[project("x", &[("numpy", ">=1")])], true).unwrap();
        let mut output = Vec::new();
        TextFormatter::with_color(Verbosity::Verbose, false)
            .format_check(CheckOutcome::Installable(&registry), &mut output)
            .unwrap();
        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("All packages can be installed together (1 dependencies)"));
        assert!(output.contains("  numpy >=1"));
    }

    #[test]
    fn test_format_check_conflict() {
        let err = check_installable(&[
            project("x", &[("numpy", "<2")]),
            project("y", &[("numpy", ">=2")]),
        ])
        .unwrap_err();
        let mut output = Vec::new();
        TextFormatter::with_color(Verbosity::Normal, false)
            .format_check(CheckOutcome::Conflict(&err), &mut output)
            .unwrap();
        let output = String::from_utf8(output).unwrap();
        assert!(output.starts_with("Not installable: found conflict in 'y'"));
        assert!(output.contains("numpy requires >=2 but <2 is already required"));
    }
}
