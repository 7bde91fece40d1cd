//! Comment-based allowance directives.
//!
//! Supports directives like:
//! ```text
//! foo();  // indent-lint: allow reason="generated layout"
//! // indent-lint: allow
//! // indent-lint: allow-file
//! ```
//!
//! A directive trailing code allows that line. A directive on a line of its
//! own allows the following line. `allow-file` allows every line.

use std::collections::HashMap;

const DIRECTIVE_PREFIX: &str = "indent-lint:";

/// Parsed allowance directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowDirective {
    /// Allows one line.
    Line {
        /// The reason provided (if any).
        reason: Option<String>,
    },
    /// Allows the whole file.
    File,
}

/// Lines of one source file on which violations are allowed.
#[derive(Debug, Clone, Default)]
pub struct AllowanceIndex {
    whole_file: bool,
    lines: HashMap<usize, Option<String>>,
}

impl AllowanceIndex {
    /// Scans `content` for directives.
    #[must_use]
    pub fn new(content: &str) -> Self {
        let mut index = Self::default();

        for (i, line) in content.lines().enumerate() {
            let Some((directive, standalone)) = parse_allow_directive(line) else {
                continue;
            };
            match directive {
                AllowDirective::File => index.whole_file = true,
                AllowDirective::Line { reason } => {
                    // 1-indexed: line i is `i + 1`, the next one `i + 2`
                    index
                        .lines
                        .insert(if standalone { i + 2 } else { i + 1 }, reason);
                }
            }
        }

        index
    }

    /// Returns true if violations on `line` (1-indexed) are allowed.
    #[must_use]
    pub fn is_allowed(&self, line: usize) -> bool {
        self.whole_file || self.lines.contains_key(&line)
    }

    /// Reason given by the directive allowing `line`, if it has one.
    #[must_use]
    pub fn reason(&self, line: usize) -> Option<&str> {
        self.lines.get(&line).and_then(Option::as_deref)
    }

    /// Returns true if nothing in the file is allowed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.whole_file && self.lines.is_empty()
    }
}

/// Parses a directive from a source line.
///
/// Returns the directive and whether the comment stands on a line of its own.
fn parse_allow_directive(line: &str) -> Option<(AllowDirective, bool)> {
    let comment_start = line.find("//")?;
    let standalone = line[..comment_start].trim().is_empty();
    let comment_content = line[comment_start + 2..].trim_start_matches('/').trim();

    let directive = comment_content.strip_prefix(DIRECTIVE_PREFIX)?.trim();

    if let Some(rest) = directive.strip_prefix("allow-file") {
        if rest.is_empty() || rest.starts_with(char::is_whitespace) {
            return Some((AllowDirective::File, standalone));
        }
        return None;
    }

    let rest = directive.strip_prefix("allow")?;
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }

    let rest = rest.trim();
    let reason = rest.strip_prefix("reason=").and_then(|reason_part| {
        let quoted = reason_part.trim().strip_prefix('"')?;
        let end = quoted.find('"')?;
        Some(quoted[..end].to_string())
    });

    Some((AllowDirective::Line { reason }, standalone))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_allow_directive() {
        let parsed = parse_allow_directive("  // indent-lint: allow");
        assert_eq!(parsed, Some((AllowDirective::Line { reason: None }, true)));
    }

    #[test]
    fn test_parse_allow_directive_with_reason() {
        let parsed = parse_allow_directive("foo(); // indent-lint: allow reason=\"aligned table\"");
        assert_eq!(
            parsed,
            Some((
                AllowDirective::Line {
                    reason: Some("aligned table".to_string())
                },
                false
            ))
        );
    }

    #[test]
    fn test_parse_allow_file() {
        let parsed = parse_allow_directive("// indent-lint: allow-file");
        assert_eq!(parsed, Some((AllowDirective::File, true)));
    }

    #[test]
    fn test_rejects_other_comments() {
        assert!(parse_allow_directive("// plain comment").is_none());
        assert!(parse_allow_directive("// indent-lint: allowance").is_none());
        assert!(parse_allow_directive("let a = 1;").is_none());
    }

    #[test]
    fn test_index_standalone_allows_next_line() {
        let content = "if (a) {\n  // indent-lint: allow\n      b();\n   c();\n}";
        let index = AllowanceIndex::new(content);
        assert!(index.is_allowed(3));
        assert!(!index.is_allowed(4));
    }

    #[test]
    fn test_index_trailing_allows_same_line() {
        let content = "if (a) {\n      b(); // indent-lint: allow\n}";
        let index = AllowanceIndex::new(content);
        assert!(index.is_allowed(2));
        assert!(!index.is_allowed(3));
    }

    #[test]
    fn test_index_keeps_reason_per_line() {
        let content = "a();\n  // indent-lint: allow reason=\"aligned table\"\n      b();\n c(); // indent-lint: allow\n";
        let index = AllowanceIndex::new(content);
        assert_eq!(index.reason(3), Some("aligned table"));
        assert!(index.is_allowed(4));
        assert_eq!(index.reason(4), None);
        assert_eq!(index.reason(1), None);
    }

    #[test]
    fn test_index_allow_file() {
        let index = AllowanceIndex::new("// indent-lint: allow-file\nfoo();\n");
        assert!(index.is_allowed(1));
        assert!(index.is_allowed(200));
        assert!(!index.is_empty());
    }

    #[test]
    fn test_index_empty_without_directives() {
        let index = AllowanceIndex::new("foo();\nbar();\n");
        assert!(index.is_empty());
        assert!(!index.is_allowed(1));
    }
}
