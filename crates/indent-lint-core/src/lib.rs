//! # indent-lint-core
//!
//! Core types for indentation linting.
//!
//! This crate holds everything that does not depend on a parser:
//!
//! - [`Violation`] and [`LintResult`] for representing findings
//! - [`ResolvedConfig`] and [`IndentOverrides`], the option normalizer
//! - [`Config`] for `indent-lint.toml`
//! - [`AllowanceIndex`] for `// indent-lint: allow` directives
//!
//! ## Example
//!
//! ```
//! use indent_lint_core::{IndentOverrides, IndentSetting, ResolvedConfig};
//!
//! let options = ResolvedConfig::resolve(
//!     &IndentOverrides::default()
//!         .indent(IndentSetting::Spaces(2))
//!         .switch_case(1),
//! );
//! assert_eq!(options.unit.size(), 2);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod allowance;
mod config;
mod options;
mod types;

pub use allowance::{AllowDirective, AllowanceIndex};
pub use config::{AnalyzerConfig, Config, ConfigError, RuleConfig, RulesConfig, OPTION_KEYS};
pub use options::{
    DeclaratorOffsets, DeclaratorSetting, FunctionOffsets, FunctionSetting, IndentOverrides,
    IndentSetting, IndentUnit, ParameterIndent, ResolvedConfig, UnitKind,
};
pub use types::{
    IndentMismatch, LintResult, Location, Severity, Violation, ViolationDiagnostic, CODE, NAME,
};
