//! Single-file indentation engine.
//!
//! Parses one source file, runs an [`IndentVerifier`] pass over it and drops
//! the violations that inline `// indent-lint: allow` directives cover.

use std::path::{Path, PathBuf};

use indent_lint_core::{AllowanceIndex, Config, ResolvedConfig, Severity, Violation};
use tracing::debug;

use crate::tree::{Dialect, SourceTree, TreeError};
use crate::verifier::IndentVerifier;

/// Errors checking a single file.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// IO error reading the file.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parser setup failed.
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// The source does not parse cleanly; its indentation is not checked.
    #[error("Syntax error in {path} at {line}:{column}")]
    Syntax {
        /// File containing the error.
        path: PathBuf,
        /// 1-indexed line of the first error.
        line: usize,
        /// 1-indexed column of the first error.
        column: usize,
    },
}

/// Checks the indentation of individual files.
#[derive(Debug, Clone, Copy)]
pub struct IndentEngine {
    options: ResolvedConfig,
    severity: Severity,
}

impl Default for IndentEngine {
    fn default() -> Self {
        Self::new(ResolvedConfig::default(), Severity::Error)
    }
}

impl IndentEngine {
    /// Creates an engine with resolved options.
    #[must_use]
    pub fn new(options: ResolvedConfig, severity: Severity) -> Self {
        Self { options, severity }
    }

    /// Creates an engine from the `[rules.indent]` section of `config`.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.resolved_options(), config.severity())
    }

    /// Options every pass runs with.
    #[must_use]
    pub fn options(&self) -> &ResolvedConfig {
        &self.options
    }

    /// Reads and checks `path`.
    ///
    /// The grammar follows the extension of `path`. Violations are reported
    /// against `report_as`, usually the path relative to the project root.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not parse.
    pub fn check_file(&self, path: &Path, report_as: &Path) -> Result<Vec<Violation>, EngineError> {
        let source = std::fs::read_to_string(path).map_err(|e| EngineError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let dialect = Dialect::from_path(path).unwrap_or(Dialect::Tsx);
        self.check_with_dialect(report_as, &source, dialect)
    }

    /// Checks `source`, choosing the grammar from the extension of `path`.
    ///
    /// Files with an unknown extension are parsed as TSX, which also
    /// accepts plain JavaScript.
    ///
    /// # Errors
    ///
    /// Returns an error if the source does not parse.
    pub fn check(&self, path: &Path, source: &str) -> Result<Vec<Violation>, EngineError> {
        let dialect = Dialect::from_path(path).unwrap_or(Dialect::Tsx);
        self.check_with_dialect(path, source, dialect)
    }

    /// Checks `source` with an explicit grammar.
    ///
    /// # Errors
    ///
    /// Returns an error if the source does not parse.
    pub fn check_with_dialect(
        &self,
        path: &Path,
        source: &str,
        dialect: Dialect,
    ) -> Result<Vec<Violation>, EngineError> {
        debug!("Checking {} as {dialect}", path.display());

        let tree = SourceTree::parse(source, dialect)?;
        if let Some((line, column)) = tree.first_error() {
            return Err(EngineError::Syntax {
                path: path.to_path_buf(),
                line,
                column,
            });
        }

        let violations =
            IndentVerifier::new(&tree, self.options, path.to_path_buf(), self.severity).verify();

        let allowance = AllowanceIndex::new(source);
        if allowance.is_empty() {
            return Ok(violations);
        }
        let (allowed, violations): (Vec<_>, Vec<_>) = violations
            .into_iter()
            .partition(|v| allowance.is_allowed(v.line()));
        for v in &allowed {
            match allowance.reason(v.line()) {
                Some(reason) => debug!("Allowed {}:{} ({reason})", path.display(), v.line()),
                None => debug!("Allowed {}:{}", path.display(), v.line()),
            }
        }
        Ok(violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indent_lint_core::IndentUnit;

    fn engine() -> IndentEngine {
        IndentEngine::new(
            ResolvedConfig::with_unit(IndentUnit::Spaces(2)),
            Severity::Warning,
        )
    }

    #[test]
    fn reports_with_configured_severity() {
        let violations = engine()
            .check(Path::new("a.ts"), "if (a) {\nb();\n}\n")
            .expect("check");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].severity, Severity::Warning);
        assert_eq!(violations[0].location.file, PathBuf::from("a.ts"));
    }

    #[test]
    fn syntax_error_is_reported_not_verified() {
        let err = engine()
            .check(Path::new("a.ts"), "if (a {\n  b();\n")
            .unwrap_err();
        assert!(matches!(err, EngineError::Syntax { .. }));
    }

    #[test]
    fn allow_directive_suppresses_line() {
        let src = "if (a) {\n  // indent-lint: allow\n      b();\n   c();\n}\n";
        let violations = engine().check(Path::new("a.ts"), src).expect("check");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].line(), 4);
    }

    #[test]
    fn allow_file_suppresses_everything() {
        let src = "// indent-lint: allow-file\nif (a) {\nb();\n}\n";
        assert!(engine()
            .check(Path::new("a.ts"), src)
            .expect("check")
            .is_empty());
    }

    #[test]
    fn check_file_picks_grammar_from_real_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("cast.ts");
        std::fs::write(&file, "const y = <string>x;\nif (a) {\nb();\n}\n").expect("write");

        let violations = engine()
            .check_file(&file, Path::new("cast"))
            .expect("type assertions parse as TypeScript");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].line(), 3);
        assert_eq!(violations[0].location.file, PathBuf::from("cast"));
    }

    #[test]
    fn javascript_and_jsx_parse_with_tsx_grammar() {
        let src = "const el = (\n  <div>\n    {items}\n  </div>\n);\n";
        assert!(engine().check(Path::new("view.jsx"), src).is_ok());
    }

    #[test]
    fn default_engine_uses_four_spaces() {
        let engine = IndentEngine::default();
        assert_eq!(engine.options().unit, IndentUnit::Spaces(4));
        let violations = engine
            .check(Path::new("a.js"), "function f() {\n  return 1;\n}\n")
            .expect("check");
        assert_eq!(violations[0].severity, Severity::Error);
        assert_eq!(
            violations[0].message,
            "Expected indentation of 4 spaces but found 2."
        );
    }

    #[test]
    fn from_config_reads_rule_section() {
        let config = Config::parse("[rules.indent]\nindent = \"tab\"\nseverity = \"info\"\n")
            .expect("config");
        let engine = IndentEngine::from_config(&config);
        assert_eq!(engine.options().unit, IndentUnit::Tab);
        assert_eq!(engine.severity, Severity::Info);
    }
}
