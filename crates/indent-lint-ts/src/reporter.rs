//! Collects indentation violations for one pass.

use std::collections::HashSet;
use std::path::PathBuf;

use indent_lint_core::{IndentMismatch, Location, Severity, UnitKind, Violation};
use tree_sitter::Node;

use crate::tree::SourceTree;

/// Turns mismatches into [`Violation`]s anchored at the offending whitespace.
#[derive(Debug)]
pub struct Reporter {
    file: PathBuf,
    severity: Severity,
    unit: UnitKind,
    violations: Vec<Violation>,
    seen: HashSet<(usize, usize, String)>,
}

impl Reporter {
    /// Creates a reporter for `file`.
    #[must_use]
    pub fn new(file: PathBuf, severity: Severity, unit: UnitKind) -> Self {
        Self {
            file,
            severity,
            unit,
            violations: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Records that `token` should be indented by `expected` characters.
    ///
    /// Lines indented with both spaces and tabs are never reported.
    pub fn report(
        &mut self,
        tree: &SourceTree,
        token: Node<'_>,
        expected: usize,
        spaces: usize,
        tabs: usize,
    ) {
        if spaces > 0 && tabs > 0 {
            return;
        }

        let width = spaces + tabs;
        let offset = token.start_byte().saturating_sub(width);
        let mismatch = IndentMismatch {
            expected,
            unit: self.unit,
            found_spaces: spaces,
            found_tabs: tabs,
        };
        let message = mismatch.message();

        if !self.seen.insert((offset, width, message)) {
            return;
        }

        let location = Location::new(
            self.file.clone(),
            SourceTree::row(token) + 1,
            tree.column_at(offset) + 1,
        )
        .with_span(offset, width);

        tracing::trace!(
            line = location.line,
            expected,
            spaces,
            tabs,
            "indentation mismatch"
        );
        self.violations
            .push(Violation::new(self.severity, location, mismatch));
    }

    /// Number of violations recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// True if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Violations ordered by byte offset.
    #[must_use]
    pub fn finish(mut self) -> Vec<Violation> {
        self.violations.sort_by_key(|v| v.location.offset);
        self.violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Dialect;

    fn statement<'t>(tree: &'t SourceTree, nth: usize) -> Node<'t> {
        SourceTree::named_children(tree.root())[nth]
    }

    #[test]
    fn anchors_at_leading_whitespace() {
        let tree = SourceTree::parse("a();\n  b();\n", Dialect::TypeScript).expect("parse");
        let mut reporter = Reporter::new("t.ts".into(), Severity::Error, UnitKind::Space);
        reporter.report(&tree, statement(&tree, 1), 0, 2, 0);

        let violations = reporter.finish();
        assert_eq!(violations.len(), 1);
        let v = &violations[0];
        assert_eq!(v.line(), 2);
        assert_eq!(v.location.column, 1);
        assert_eq!((v.location.offset, v.location.length), (5, 2));
        assert_eq!(v.message, "Expected indentation of 0 spaces but found 2.");
    }

    #[test]
    fn drops_mixed_indentation() {
        let tree = SourceTree::parse("a();\n \tb();\n", Dialect::TypeScript).expect("parse");
        let mut reporter = Reporter::new("t.ts".into(), Severity::Error, UnitKind::Space);
        reporter.report(&tree, statement(&tree, 1), 0, 1, 1);
        assert!(reporter.is_empty());
    }

    #[test]
    fn records_exact_duplicates_once() {
        let tree = SourceTree::parse("a();\n  b();\n", Dialect::TypeScript).expect("parse");
        let mut reporter = Reporter::new("t.ts".into(), Severity::Warning, UnitKind::Space);
        reporter.report(&tree, statement(&tree, 1), 4, 2, 0);
        reporter.report(&tree, statement(&tree, 1), 4, 2, 0);
        reporter.report(&tree, statement(&tree, 1), 8, 2, 0);
        assert_eq!(reporter.len(), 2);
    }

    #[test]
    fn finish_orders_by_offset() {
        let tree =
            SourceTree::parse("a();\n  b();\n   c();\n", Dialect::TypeScript).expect("parse");
        let mut reporter = Reporter::new("t.ts".into(), Severity::Error, UnitKind::Space);
        reporter.report(&tree, statement(&tree, 2), 0, 3, 0);
        reporter.report(&tree, statement(&tree, 1), 0, 2, 0);
        let lines: Vec<_> = reporter.finish().iter().map(Violation::line).collect();
        assert_eq!(lines, vec![2, 3]);
    }
}
