//! `indent-lint.toml` configuration.
//!
//! ```toml
//! [analyzer]
//! exclude = ["**/generated/**"]
//!
//! [rules.indent]
//! severity = "warning"
//! indent = 2
//! SwitchCase = 1
//! ```
//!
//! Unknown rule sections and option keys are kept but reported with a
//! warning when the file is parsed.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::options::{IndentOverrides, ResolvedConfig};
use crate::types::{Severity, NAME};

/// Option keys understood in `[rules.indent]`.
pub const OPTION_KEYS: &[&str] = &[
    "indent",
    "SwitchCase",
    "VariableDeclarator",
    "outerIIFEBody",
    "MemberExpression",
    "FunctionDeclaration",
    "FunctionExpression",
];

/// Top-level configuration for indent-lint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// File discovery settings.
    pub analyzer: AnalyzerConfig,

    /// The `[rules]` table.
    pub rules: RulesConfig,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        tracing::debug!("Loading config from {}", path.display());
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or a known key has the wrong
    /// type (`severity = 3`).
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        for key in config.unknown_keys() {
            tracing::warn!("ignoring unknown config key {key}");
        }
        Ok(config)
    }

    /// The `[rules.indent]` section, if present.
    #[must_use]
    pub fn rule(&self) -> Option<&RuleConfig> {
        self.rules.indent.as_ref()
    }

    /// Checks if the indentation rule is enabled (default: enabled).
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.rule().and_then(|rule| rule.enabled).unwrap_or(true)
    }

    /// Severity for indentation violations (default: error).
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.rule()
            .and_then(|rule| rule.severity)
            .unwrap_or(Severity::Error)
    }

    /// Option overrides from `[rules.indent]`.
    #[must_use]
    pub fn indent_overrides(&self) -> IndentOverrides {
        self.rule()
            .map(IndentOverrides::from_rule_config)
            .unwrap_or_default()
    }

    /// Fully resolved indentation options.
    #[must_use]
    pub fn resolved_options(&self) -> ResolvedConfig {
        ResolvedConfig::resolve(&self.indent_overrides())
    }

    /// Dotted paths of rule sections and option keys nothing reads.
    #[must_use]
    pub fn unknown_keys(&self) -> Vec<String> {
        let sections = self.rules.other.keys().map(|name| format!("rules.{name}"));
        let options = self.rule().into_iter().flat_map(|rule| {
            rule.options
                .keys()
                .filter(|key| !OPTION_KEYS.contains(&key.as_str()))
                .map(|key| format!("rules.{NAME}.{key}"))
        });
        sections.chain(options).collect()
    }
}

/// The `[rules]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesConfig {
    /// `[rules.indent]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indent: Option<RuleConfig>,

    /// Sections naming rules this tool does not have.
    #[serde(flatten)]
    pub other: BTreeMap<String, toml::Value>,
}

/// File discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Root directory to analyze (default: current directory).
    pub root: PathBuf,

    /// Glob patterns to exclude, matched against paths relative to the root
    /// and absolute paths.
    pub exclude: Vec<String>,

    /// File extensions to check, without the leading dot.
    pub extensions: Vec<String>,

    /// Whether `.gitignore` and `.ignore` files apply.
    pub respect_gitignore: bool,

    /// Abort instead of skipping files that contain syntax errors.
    pub fail_on_parse_error: bool,

    /// Worker threads for checking files; unset uses one per core.
    pub parallelism: Option<usize>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            exclude: vec!["**/node_modules/**".to_string(), "**/dist/**".to_string()],
            extensions: ["ts", "mts", "cts", "tsx", "js", "jsx", "mjs", "cjs"]
                .iter()
                .map(|e| (*e).to_string())
                .collect(),
            respect_gitignore: true,
            fail_on_parse_error: false,
            parallelism: None,
        }
    }
}

/// The `[rules.indent]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Whether the rule runs.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Severity of every violation.
    #[serde(default)]
    pub severity: Option<Severity>,

    /// Indentation options, read leniently by [`IndentOverrides::from_rule_config`].
    #[serde(flatten)]
    pub options: BTreeMap<String, toml::Value>,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Invalid TOML, or a known key of the wrong type.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::IndentUnit;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::parse("").expect("empty config");
        assert!(config.analyzer.respect_gitignore);
        assert!(config.rule().is_none());
        assert!(config.is_enabled());
        assert_eq!(config.severity(), Severity::Error);
        assert_eq!(config.resolved_options(), ResolvedConfig::default());
        assert!(config.analyzer.extensions.iter().any(|e| e == "ts"));
        assert_eq!(config.analyzer.exclude.len(), 2);
    }

    #[test]
    fn reads_analyzer_and_rule_sections() {
        let toml = r#"
[analyzer]
root = "./src"
exclude = ["**/generated/**"]
fail_on_parse_error = true
parallelism = 2

[rules.indent]
severity = "warning"
indent = 2
SwitchCase = 1
"#;

        let config = Config::parse(toml).expect("Failed to parse");
        assert_eq!(config.analyzer.root, PathBuf::from("./src"));
        assert_eq!(config.analyzer.exclude, vec!["**/generated/**".to_string()]);
        assert!(config.analyzer.fail_on_parse_error);
        assert!(config.analyzer.respect_gitignore);
        assert_eq!(config.analyzer.parallelism, Some(2));
        assert!(config.is_enabled());
        assert_eq!(config.severity(), Severity::Warning);
        assert!(config.unknown_keys().is_empty());

        let options = config.resolved_options();
        assert_eq!(options.unit, IndentUnit::Spaces(2));
        assert_eq!(options.switch_case, 1);
    }

    #[test]
    fn disabled_rule() {
        let config = Config::parse("[rules.indent]\nenabled = false\n").expect("Failed to parse");
        assert!(!config.is_enabled());
    }

    #[test]
    fn unknown_sections_and_keys_are_listed() {
        let toml = r#"
[rules.quotes]
style = "single"

[rules.indent]
indent = 2
switchCase = 1
"#;
        let config = Config::parse(toml).expect("Failed to parse");
        assert_eq!(
            config.unknown_keys(),
            vec![
                "rules.quotes".to_string(),
                "rules.indent.switchCase".to_string()
            ]
        );
        assert_eq!(config.resolved_options().switch_case, 0);
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let err = Config::parse("[rules.indent\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn wrong_severity_type_is_parse_error() {
        let err = Config::parse("[rules.indent]\nseverity = 3\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Config::from_file(Path::new("/nonexistent/indent-lint.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
