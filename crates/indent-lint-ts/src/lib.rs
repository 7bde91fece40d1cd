//! # indent-lint-ts
//!
//! Tree-sitter based indentation verifier for TypeScript and JavaScript.
//!
//! This crate reuses `indent-lint-core` types (`Violation`, `Severity`,
//! `ResolvedConfig`) and adds:
//!
//! - [`SourceTree`] for parsing and positional queries over tree-sitter
//! - [`IndentVerifier`] for one indentation pass over one tree
//! - [`IndentEngine`] for checking a single file, allowance directives included
//! - [`Analyzer`] for checking a directory tree in parallel
//!
//! ## Example
//!
//! ```
//! use indent_lint_core::{IndentUnit, ResolvedConfig};
//! use indent_lint_ts::{verify_source, Dialect};
//!
//! let options = ResolvedConfig::with_unit(IndentUnit::Spaces(2));
//! let violations = verify_source("if (a) {\nb();\n}\n", Dialect::TypeScript, options)?;
//! assert_eq!(violations[0].message, "Expected indentation of 2 spaces but found 0.");
//! # Ok::<(), indent_lint_ts::TreeError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod analyzer;
mod cache;
pub mod engine;
pub mod kind;
mod reporter;
pub mod tree;
pub mod verifier;

pub use analyzer::{Analyzer, AnalyzerBuilder, AnalyzerError};
pub use cache::LineIndentCache;
pub use engine::{EngineError, IndentEngine};
pub use kind::NodeKind;
pub use reporter::Reporter;
pub use tree::{Dialect, SourceTree, TreeError};
pub use verifier::IndentVerifier;

use indent_lint_core::{ResolvedConfig, Severity, Violation};

/// Verifies `source` without a file name, at error severity.
///
/// Syntax errors are not rejected here; tree-sitter's recovered tree is
/// verified as is. Use [`IndentEngine`] to refuse unparsable input.
///
/// # Errors
///
/// Returns an error if the grammar cannot be loaded.
pub fn verify_source(
    source: &str,
    dialect: Dialect,
    options: ResolvedConfig,
) -> Result<Vec<Violation>, TreeError> {
    let tree = SourceTree::parse(source, dialect)?;
    Ok(IndentVerifier::new(&tree, options, std::path::PathBuf::new(), Severity::Error).verify())
}
