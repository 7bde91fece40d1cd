//! Shared output formatting for lint results.

use anyhow::{Context, Result};
use indent_lint_core::{LintResult, Severity, ViolationDiagnostic};
use miette::NamedSource;
use std::path::Path;
use std::sync::Arc;

use crate::OutputFormat;

/// Print lint results in the specified format.
///
/// `root` is the analyzed directory or file violation paths are relative to.
pub fn print(result: &LintResult, format: OutputFormat, root: &Path) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(result),
        OutputFormat::Json => return print_json(result),
        OutputFormat::Compact => print_compact(result),
        OutputFormat::Pretty => return print_pretty(result, root),
    }
    Ok(())
}

fn print_text(result: &LintResult) {
    for violation in &result.violations {
        let severity_indicator = match violation.severity {
            Severity::Error => "\x1b[31merror\x1b[0m",
            Severity::Warning => "\x1b[33mwarning\x1b[0m",
            Severity::Info => "\x1b[34minfo\x1b[0m",
        };

        println!(
            "{} {} at {}:{}:{}",
            violation.code,
            violation.rule,
            violation.location.file.display(),
            violation.location.line,
            violation.location.column,
        );
        println!("  {}: {}", severity_indicator, violation.message);
        println!();
    }

    print_summary(result);
}

fn print_summary(result: &LintResult) {
    let (errors, warnings, infos) = result.count_by_severity();

    let summary_color = if errors > 0 {
        "\x1b[31m"
    } else if warnings > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };

    println!(
        "{}Found {} error(s), {} warning(s), {} info(s) in {} file(s)\x1b[0m",
        summary_color, errors, warnings, infos, result.files_checked
    );
    if !result.files_skipped.is_empty() {
        println!(
            "Skipped {} file(s) with syntax errors",
            result.files_skipped.len()
        );
    }
}

fn print_json(result: &LintResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    println!("{json}");
    Ok(())
}

fn print_compact(result: &LintResult) {
    for violation in &result.violations {
        println!("{violation}");
    }
}

fn print_pretty(result: &LintResult, root: &Path) -> Result<()> {
    // a file root reports violations by file name
    let base = if root.is_file() {
        root.parent().unwrap_or(root)
    } else {
        root
    };

    // violations arrive grouped by file
    let mut current: Option<(&Path, Arc<str>)> = None;

    for violation in &result.violations {
        let file = violation.location.file.as_path();
        let cached = current
            .as_ref()
            .filter(|(path, _)| *path == file)
            .map(|(_, content)| Arc::clone(content));
        let content = match cached {
            Some(content) => content,
            None => {
                let content: Arc<str> = std::fs::read_to_string(base.join(file))
                    .with_context(|| format!("Failed to read {}", file.display()))?
                    .into();
                current = Some((file, Arc::clone(&content)));
                content
            }
        };

        let report = miette::Report::new(ViolationDiagnostic::from(violation))
            .with_source_code(NamedSource::new(file.display().to_string(), content));
        println!("{report:?}");
    }

    print_summary(result);
    Ok(())
}
