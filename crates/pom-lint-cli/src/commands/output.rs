//! Rendering of lint results.

use anyhow::Result;
use pom_lint_core::{CheckerNote, FixReport, LintResult, Severity, Violation};
use serde::Serialize;

use crate::OutputFormat;

/// Prints lint results in the requested format.
pub fn print(result: &LintResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(result),
        OutputFormat::Json => return print_json(result),
        OutputFormat::Compact => print_compact(result),
    }
    Ok(())
}

fn print_text(result: &LintResult) {
    let (errors, warnings, infos) = result.count_by_severity();

    for violation in result.iter() {
        let severity_indicator = match violation.severity {
            Severity::Error => "\x1b[31merror\x1b[0m",
            Severity::Warning => "\x1b[33mwarning\x1b[0m",
            Severity::Info => "\x1b[34minfo\x1b[0m",
        };

        println!(
            "{} {} at {}:{}",
            violation.code,
            violation.checker,
            violation.location.file.display(),
            violation.location.line,
        );
        println!("  {}: {}", severity_indicator, violation.message);
        if let Some(suggestion) = &violation.suggestion {
            println!("  = help: {}", suggestion.message);
        }
        println!();
    }

    for note in &result.notes {
        println!("note [{}]: {}", note.checker, note.message);
    }

    let summary_color = if errors > 0 {
        "\x1b[31m"
    } else if warnings > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };

    println!(
        "{}Found {} error(s), {} warning(s), {} info(s) in {} descriptor(s)\x1b[0m",
        summary_color, errors, warnings, infos, result.documents_checked
    );
}

/// Flat JSON shape: violations in report order plus totals.
#[derive(Serialize)]
struct JsonReport<'a> {
    documents_checked: usize,
    violations: Vec<&'a Violation>,
    notes: &'a [CheckerNote],
    errors: usize,
    warnings: usize,
    infos: usize,
}

fn json(result: &LintResult) -> Result<String> {
    let (errors, warnings, infos) = result.count_by_severity();
    let report = JsonReport {
        documents_checked: result.documents_checked,
        violations: result.iter().collect(),
        notes: &result.notes,
        errors,
        warnings,
        infos,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

fn print_json(result: &LintResult) -> Result<()> {
    println!("{}", json(result)?);
    Ok(())
}

fn print_compact(result: &LintResult) {
    for violation in result.iter() {
        println!("{violation}");
    }
}

/// Prints what a fix run rewrote.
pub fn print_fix(report: &FixReport) {
    for path in &report.changed {
        println!("fixed {}", path.display());
    }
    println!(
        "Rewrote {} of {} descriptor(s)",
        report.changed.len(),
        report.documents_processed
    );
}
