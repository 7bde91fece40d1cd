//! Core types for indentation violations and results.

use miette::{Diagnostic, SourceSpan};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::options::UnitKind;

/// Rule code attached to every indentation violation.
pub const CODE: &str = "IND001";

/// Rule name attached to every indentation violation.
pub const NAME: &str = "indent";

/// Severity level for lint violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message, does not fail lint.
    Info,
    /// Warning that should be addressed.
    Warning,
    /// Error that must be fixed.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Source code location of the offending leading whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// File path relative to project root.
    pub file: PathBuf,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
    /// Byte offset in file (for miette integration).
    pub offset: usize,
    /// Length of the span in bytes.
    pub length: usize,
}

impl Location {
    /// Creates a new location with explicit values.
    #[must_use]
    pub fn new(file: PathBuf, line: usize, column: usize) -> Self {
        Self {
            file,
            line,
            column,
            offset: 0,
            length: 0,
        }
    }

    /// Sets the byte offset and length for this location.
    #[must_use]
    pub fn with_span(mut self, offset: usize, length: usize) -> Self {
        self.offset = offset;
        self.length = length;
        self
    }
}

/// Expected versus found indentation for one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndentMismatch {
    /// Expected number of indentation characters.
    pub expected: usize,
    /// Character the expectation is counted in.
    pub unit: UnitKind,
    /// Spaces actually found in the leading whitespace.
    pub found_spaces: usize,
    /// Tabs actually found in the leading whitespace.
    pub found_tabs: usize,
}

impl IndentMismatch {
    /// Renders the diagnostic message for this mismatch.
    ///
    /// The "found" part is a bare number when the found character matches
    /// the configured unit, e.g. `Expected indentation of 4 spaces but found 2.`
    #[must_use]
    pub fn message(&self) -> String {
        let expected = format!(
            "{} {}",
            self.expected,
            self.unit.word(self.expected)
        );
        let spaces_word = UnitKind::Space.word(self.found_spaces);
        let tabs_word = UnitKind::Tab.word(self.found_tabs);

        let found = match (self.found_spaces, self.found_tabs) {
            (0, 0) => "0".to_string(),
            (spaces, 0) if self.unit == UnitKind::Space => spaces.to_string(),
            (spaces, 0) => format!("{spaces} {spaces_word}"),
            (0, tabs) if self.unit == UnitKind::Tab => tabs.to_string(),
            (0, tabs) => format!("{tabs} {tabs_word}"),
            (spaces, tabs) => format!("{spaces} {spaces_word} and {tabs} {tabs_word}"),
        };

        format!("Expected indentation of {expected} but found {found}.")
    }
}

/// An indentation violation found during analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    /// Rule code (e.g., "IND001").
    pub code: String,
    /// Rule name (e.g., "indent").
    pub rule: String,
    /// Severity of this violation.
    pub severity: Severity,
    /// Location of the leading whitespace that is wrong.
    pub location: Location,
    /// Human-readable message.
    pub message: String,
    /// Structured expected/found counts.
    pub mismatch: IndentMismatch,
}

impl Violation {
    /// Creates a new violation; the message is rendered from `mismatch`.
    #[must_use]
    pub fn new(severity: Severity, location: Location, mismatch: IndentMismatch) -> Self {
        Self {
            code: CODE.to_string(),
            rule: NAME.to_string(),
            severity,
            location,
            message: mismatch.message(),
            mismatch,
        }
    }

    /// Returns the 1-indexed line of this violation.
    #[must_use]
    pub fn line(&self) -> usize {
        self.location.line
    }

    /// Formats the violation for terminal output.
    #[must_use]
    pub fn format(&self) -> String {
        use std::fmt::Write;
        let mut output = format!(
            "{} {} at {}:{}:{}\n",
            self.code,
            self.rule,
            self.location.file.display(),
            self.location.line,
            self.location.column,
        );
        let _ = writeln!(output, "  {}: {}", self.severity, self.message);
        output
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}: {} [{}] {}",
            self.location.file.display(),
            self.location.line,
            self.location.column,
            self.severity,
            self.code,
            self.message
        )
    }
}

/// Converts a Violation to a miette Diagnostic for rich error display.
#[derive(Debug, thiserror::Error, Diagnostic)]
#[error("{message}")]
pub struct ViolationDiagnostic {
    message: String,
    #[help]
    help: Option<String>,
    #[label("{label_message}")]
    span: SourceSpan,
    label_message: String,
}

impl From<&Violation> for ViolationDiagnostic {
    fn from(v: &Violation) -> Self {
        let m = &v.mismatch;
        Self {
            message: format!("[{}] {}", v.code, v.message),
            help: Some(format!(
                "indent this line with {} {}",
                m.expected,
                m.unit.word(m.expected)
            )),
            span: SourceSpan::from((v.location.offset, v.location.length)),
            label_message: v.rule.clone(),
        }
    }
}

/// Result of running lint analysis.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LintResult {
    /// All violations found.
    pub violations: Vec<Violation>,
    /// Number of files checked.
    pub files_checked: usize,
    /// Files skipped because they could not be parsed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files_skipped: Vec<PathBuf>,
}

impl LintResult {
    /// Creates a new empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.violations
            .iter()
            .any(|v| v.severity == Severity::Error)
    }

    /// Counts violations by severity.
    #[must_use]
    pub fn count_by_severity(&self) -> (usize, usize, usize) {
        let count = |severity: Severity| {
            self.violations
                .iter()
                .filter(|v| v.severity == severity)
                .count()
        };
        (
            count(Severity::Error),
            count(Severity::Warning),
            count(Severity::Info),
        )
    }

    /// Checks if any violations meet or exceed the given severity threshold.
    #[must_use]
    pub fn has_violations_at(&self, severity: Severity) -> bool {
        self.violations.iter().any(|v| v.severity >= severity)
    }

    /// Sorts violations by file, then line, then column.
    pub fn sort(&mut self) {
        self.violations.sort_by(|a, b| {
            a.location
                .file
                .cmp(&b.location.file)
                .then(a.location.line.cmp(&b.location.line))
                .then(a.location.column.cmp(&b.location.column))
        });
    }

    /// Adds violations from another result.
    pub fn extend(&mut self, other: Self) {
        self.violations.extend(other.violations);
        self.files_checked += other.files_checked;
        self.files_skipped.extend(other.files_skipped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mismatch(expected: usize, unit: UnitKind, spaces: usize, tabs: usize) -> IndentMismatch {
        IndentMismatch {
            expected,
            unit,
            found_spaces: spaces,
            found_tabs: tabs,
        }
    }

    fn make_violation(severity: Severity, line: usize) -> Violation {
        Violation::new(
            severity,
            Location::new(PathBuf::from("src/app.ts"), line, 1).with_span(10, 2),
            mismatch(4, UnitKind::Space, 2, 0),
        )
    }

    // --- message tests ---

    #[test]
    fn message_abbreviates_matching_unit() {
        assert_eq!(
            mismatch(2, UnitKind::Space, 4, 0).message(),
            "Expected indentation of 2 spaces but found 4."
        );
        assert_eq!(
            mismatch(1, UnitKind::Tab, 0, 2).message(),
            "Expected indentation of 1 tab but found 2."
        );
    }

    #[test]
    fn message_spells_out_other_unit() {
        assert_eq!(
            mismatch(2, UnitKind::Tab, 4, 0).message(),
            "Expected indentation of 2 tabs but found 4 spaces."
        );
        assert_eq!(
            mismatch(4, UnitKind::Space, 0, 1).message(),
            "Expected indentation of 4 spaces but found 1 tab."
        );
        assert_eq!(
            mismatch(1, UnitKind::Tab, 1, 0).message(),
            "Expected indentation of 1 tab but found 1 space."
        );
    }

    #[test]
    fn message_reports_zero_found() {
        assert_eq!(
            mismatch(1, UnitKind::Space, 0, 0).message(),
            "Expected indentation of 1 space but found 0."
        );
    }

    #[test]
    fn message_renders_mixed_counts() {
        assert_eq!(
            mismatch(0, UnitKind::Space, 2, 1).message(),
            "Expected indentation of 0 spaces but found 2 spaces and 1 tab."
        );
    }

    // --- Violation tests ---

    #[test]
    fn violation_carries_rule_identity() {
        let v = make_violation(Severity::Error, 3);
        assert_eq!(v.code, CODE);
        assert_eq!(v.rule, NAME);
        assert_eq!(v.line(), 3);
        assert_eq!(v.message, "Expected indentation of 4 spaces but found 2.");
    }

    #[test]
    fn violation_display_is_compact() {
        let v = make_violation(Severity::Warning, 7);
        insta::assert_snapshot!(
            v.to_string(),
            @"src/app.ts:7:1: warning [IND001] Expected indentation of 4 spaces but found 2."
        );
    }

    #[test]
    fn diagnostic_uses_whitespace_span() {
        let v = make_violation(Severity::Error, 3);
        let diag = ViolationDiagnostic::from(&v);
        assert_eq!(diag.span, SourceSpan::from((10, 2)));
        assert_eq!(diag.help.as_deref(), Some("indent this line with 4 spaces"));
    }

    // --- LintResult tests ---

    #[test]
    fn has_violations_at_error_only() {
        let mut result = LintResult::new();
        result.violations.push(make_violation(Severity::Warning, 1));
        assert!(!result.has_violations_at(Severity::Error));
        assert!(result.has_violations_at(Severity::Warning));
        assert!(!result.has_errors());
    }

    #[test]
    fn sort_orders_by_line() {
        let mut result = LintResult::new();
        result.violations.push(make_violation(Severity::Error, 9));
        result.violations.push(make_violation(Severity::Error, 2));
        result.sort();
        let lines: Vec<usize> = result.violations.iter().map(Violation::line).collect();
        assert_eq!(lines, vec![2, 9]);
    }

    #[test]
    fn extend_merges_counts() {
        let mut a = LintResult::new();
        a.files_checked = 2;
        let mut b = LintResult::new();
        b.files_checked = 3;
        b.violations.push(make_violation(Severity::Info, 1));
        b.files_skipped.push(PathBuf::from("broken.ts"));
        a.extend(b);
        assert_eq!(a.files_checked, 5);
        assert_eq!(a.count_by_severity(), (0, 0, 1));
        assert_eq!(a.files_skipped.len(), 1);
    }
}
