//! JSON output formatter for machine processing
//!
//! This module provides:
//! - JSON serialization of the full compatibility report
//! - A compact installability verdict for `--check`

use crate::error::AggregateError;
use crate::output::{CheckOutcome, ReportFormatter};
use crate::resolve::{CompatibilityReport, Registry};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;

/// JSON formatter for machine-readable output
#[derive(Debug, Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new() -> Self {
        Self
    }
}

/// JSON representation of the full report
#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: DateTime<Utc>,
    #[serde(flatten)]
    report: &'a CompatibilityReport,
}

/// JSON representation of a check verdict
#[derive(Serialize)]
struct JsonCheck<'a> {
    installable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    dependencies: Option<&'a Registry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dependency: Option<&'a str>,
}

impl JsonCheck<'_> {
    fn conflict(error: &AggregateError) -> JsonCheck<'_> {
        JsonCheck {
            installable: false,
            dependencies: None,
            error: Some(error.to_string()),
            dependency: Some(error.dependency()),
        }
    }
}

fn write_json<T: Serialize>(value: &T, writer: &mut dyn Write) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(std::io::Error::other)?;
    writeln!(writer, "{}", json)
}

impl ReportFormatter for JsonFormatter {
    fn format_report(
        &self,
        report: &CompatibilityReport,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let output = JsonReport {
            generated_at: Utc::now(),
            report,
        };
        write_json(&output, writer)
    }

    fn format_check(
        &self,
        outcome: CheckOutcome<'_>,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let output = match outcome {
            CheckOutcome::Installable(registry) => JsonCheck {
                installable: true,
                dependencies: Some(registry),
                error: None,
                dependency: None,
            },
            CheckOutcome::Conflict(error) => JsonCheck::conflict(error),
        };
        write_json(&output, writer)
    }
}
