//! Multi-file analysis.
//!
//! Discovers source files under a root, checks them in parallel with one
//! [`IndentEngine`] pass per file and merges the results.

use std::path::{Path, PathBuf};

use indent_lint_core::{Config, LintResult, Violation};
use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::engine::{EngineError, IndentEngine};

/// Errors that can occur during analysis.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// IO error resolving the root.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Directory walk failed.
    #[error("Failed to walk source tree: {0}")]
    Walk(#[from] ignore::Error),

    /// A file could not be checked.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The thread pool could not be created.
    #[error("Failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Builder for configuring an [`Analyzer`].
#[derive(Default)]
pub struct AnalyzerBuilder {
    root: Option<PathBuf>,
    exclude_patterns: Vec<String>,
    extensions: Vec<String>,
    config: Option<Config>,
    engine: Option<IndentEngine>,
    fail_on_parse_error: Option<bool>,
}

impl AnalyzerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the root directory to analyze.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Adds an exclude glob pattern.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Adds multiple exclude glob patterns.
    #[must_use]
    pub fn excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Adds a file extension to check, without the leading dot.
    #[must_use]
    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extensions.push(extension.into());
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Overrides the engine derived from the configuration.
    #[must_use]
    pub fn engine(mut self, engine: IndentEngine) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Sets whether to fail on unparsable files (default: from config, else false).
    #[must_use]
    pub fn fail_on_parse_error(mut self, fail: bool) -> Self {
        self.fail_on_parse_error = Some(fail);
        self
    }

    /// Builds the analyzer.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be resolved.
    pub fn build(self) -> Result<Analyzer, AnalyzerError> {
        let config = self.config.unwrap_or_default();

        let root = self
            .root
            .unwrap_or_else(|| config.analyzer.root.clone());
        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()?.join(&root)
        };

        let mut exclude_patterns = self.exclude_patterns;
        exclude_patterns.extend(config.analyzer.exclude.iter().cloned());

        let mut extensions = self.extensions;
        if extensions.is_empty() {
            extensions.clone_from(&config.analyzer.extensions);
        }

        let engine = self
            .engine
            .unwrap_or_else(|| IndentEngine::from_config(&config));

        Ok(Analyzer {
            root,
            exclude_patterns,
            extensions,
            engine,
            enabled: config.is_enabled(),
            respect_gitignore: config.analyzer.respect_gitignore,
            fail_on_parse_error: self
                .fail_on_parse_error
                .unwrap_or(config.analyzer.fail_on_parse_error),
            parallelism: config.analyzer.parallelism,
        })
    }
}

/// Checks every matching file under a root directory.
///
/// Use [`Analyzer::builder()`] to construct an instance.
#[derive(Debug)]
pub struct Analyzer {
    root: PathBuf,
    exclude_patterns: Vec<String>,
    extensions: Vec<String>,
    engine: IndentEngine,
    enabled: bool,
    respect_gitignore: bool,
    fail_on_parse_error: bool,
    parallelism: Option<usize>,
}

enum FileOutcome {
    Checked(Vec<Violation>),
    Skipped(PathBuf),
}

impl Analyzer {
    /// Creates a new builder for configuring an analyzer.
    #[must_use]
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Returns the root directory being analyzed.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Analyzes all files and returns the results.
    ///
    /// # Errors
    ///
    /// Returns an error if file discovery fails, a file cannot be read, or a
    /// file does not parse while `fail_on_parse_error` is set.
    pub fn analyze(&self) -> Result<LintResult, AnalyzerError> {
        info!("Starting analysis at {:?}", self.root);

        let mut result = LintResult::new();
        if !self.enabled {
            info!("Indent rule disabled, nothing to check");
            return Ok(result);
        }

        let files = self.discover_files()?;
        info!("Found {} files to analyze", files.len());

        let outcomes = match self.parallelism {
            Some(threads) => rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()?
                .install(|| self.check_all(&files)),
            None => self.check_all(&files),
        };

        for outcome in outcomes {
            match outcome? {
                FileOutcome::Checked(violations) => {
                    result.violations.extend(violations);
                    result.files_checked += 1;
                }
                FileOutcome::Skipped(path) => result.files_skipped.push(path),
            }
        }

        result.sort();

        info!(
            "Analysis complete: {} violations in {} files",
            result.violations.len(),
            result.files_checked
        );

        Ok(result)
    }

    fn check_all(&self, files: &[PathBuf]) -> Vec<Result<FileOutcome, AnalyzerError>> {
        files
            .par_iter()
            .map(|path| self.analyze_file(path))
            .collect()
    }

    fn analyze_file(&self, path: &Path) -> Result<FileOutcome, AnalyzerError> {
        match self.engine.check_file(path, self.report_path(path)) {
            Ok(violations) => Ok(FileOutcome::Checked(violations)),
            Err(EngineError::Syntax { path, line, column }) if !self.fail_on_parse_error => {
                warn!(
                    "Skipping {}: syntax error at {line}:{column}",
                    path.display()
                );
                Ok(FileOutcome::Skipped(path))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Path violations in `path` are reported against: relative to the root,
    /// or the bare file name when the root is the file itself.
    fn report_path<'a>(&self, path: &'a Path) -> &'a Path {
        match path.strip_prefix(&self.root) {
            Ok(rel) if rel.as_os_str().is_empty() => path.file_name().map_or(path, Path::new),
            Ok(rel) => rel,
            Err(_) => path,
        }
    }

    /// Discovers all source files to analyze, sorted.
    fn discover_files(&self) -> Result<Vec<PathBuf>, AnalyzerError> {
        let mut builder = ignore::WalkBuilder::new(&self.root);
        builder
            .hidden(false)
            .git_ignore(self.respect_gitignore)
            .git_exclude(self.respect_gitignore)
            .ignore(self.respect_gitignore)
            .require_git(false);

        let mut files = Vec::new();
        for entry in builder.build() {
            let entry = entry?;
            let path = entry.path();

            if !entry.file_type().is_some_and(|t| t.is_file()) || !self.has_extension(path) {
                continue;
            }

            if self.should_exclude(path) {
                debug!("Excluding: {}", path.display());
                continue;
            }

            files.push(path.to_path_buf());
        }

        files.sort();
        Ok(files)
    }

    fn has_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e == ext))
    }

    /// Checks if a path should be excluded.
    fn should_exclude(&self, path: &Path) -> bool {
        let rel = path.strip_prefix(&self.root).unwrap_or(path);
        let rel_str = rel.to_string_lossy();
        let path_str = path.to_string_lossy();

        self.exclude_patterns.iter().any(|pattern| {
            match glob::Pattern::new(pattern) {
                Ok(glob_pattern) => {
                    glob_pattern.matches(&rel_str) || glob_pattern.matches(&path_str)
                }
                Err(e) => {
                    warn!("Ignoring invalid exclude pattern {pattern:?}: {e}");
                    false
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("mkdir");
        }
        fs::write(path, content).expect("write");
    }

    #[test]
    fn test_exclude_patterns() {
        let analyzer = Analyzer::builder()
            .root("/project")
            .exclude("**/generated/**")
            .build()
            .expect("Failed to build analyzer");

        assert!(analyzer.should_exclude(Path::new("/project/src/generated/api.ts")));
        assert!(analyzer.should_exclude(Path::new("/project/node_modules/x/index.js")));
        assert!(!analyzer.should_exclude(Path::new("/project/src/app.ts")));
    }

    #[test]
    fn test_analyze_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "src/good.ts", "if (a) {\n    b();\n}\n");
        write(dir.path(), "src/bad.js", "if (a) {\n  b();\n}\n");
        write(dir.path(), "README.md", "  not code\n");
        write(dir.path(), "node_modules/dep/index.js", "if (a) {\nb();\n}\n");

        let result = Analyzer::builder()
            .root(dir.path())
            .build()
            .expect("build")
            .analyze()
            .expect("analyze");

        assert_eq!(result.files_checked, 2);
        assert_eq!(result.violations.len(), 1);
        assert_eq!(
            result.violations[0].location.file,
            PathBuf::from("src/bad.js")
        );
        assert!(result.has_errors());
    }

    #[test]
    fn test_file_root_reports_file_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "app.ts", "const y = <string>x;\nif (a) {\nb();\n}\n");
        let file = dir.path().join("app.ts");

        let result = Analyzer::builder()
            .root(&file)
            .build()
            .expect("build")
            .analyze()
            .expect("analyze");

        assert_eq!(result.files_checked, 1);
        assert!(result.files_skipped.is_empty());
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].location.file, PathBuf::from("app.ts"));
        assert_eq!(result.violations[0].line(), 3);
    }

    #[test]
    fn test_unparsable_file_is_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "broken.ts", "if (a {\n");
        write(dir.path(), "ok.ts", "a();\n");

        let result = Analyzer::builder()
            .root(dir.path())
            .build()
            .expect("build")
            .analyze()
            .expect("analyze");
        assert_eq!(result.files_checked, 1);
        assert_eq!(result.files_skipped, vec![PathBuf::from("broken.ts")]);
    }

    #[test]
    fn test_fail_on_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "broken.ts", "if (a {\n");

        let err = Analyzer::builder()
            .root(dir.path())
            .fail_on_parse_error(true)
            .build()
            .expect("build")
            .analyze()
            .unwrap_err();
        assert!(matches!(
            err,
            AnalyzerError::Engine(EngineError::Syntax { .. })
        ));
    }

    #[test]
    fn test_disabled_rule_checks_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "bad.ts", "if (a) {\nb();\n}\n");
        let config = Config::parse("[rules.indent]\nenabled = false\n").expect("config");

        let result = Analyzer::builder()
            .root(dir.path())
            .config(config)
            .build()
            .expect("build")
            .analyze()
            .expect("analyze");
        assert_eq!(result.files_checked, 0);
        assert!(result.violations.is_empty());
    }
}
