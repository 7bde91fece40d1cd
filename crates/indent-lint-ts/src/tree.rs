//! Syntax tree adapter over tree-sitter.
//!
//! [`SourceTree`] owns the source text and its parse tree. Every positional
//! question the verifier asks (rows, columns, first and last tokens, the
//! whitespace before a token) is answered here, so the verifier only ever
//! borrows nodes.

use std::fmt;
use std::path::Path;

use tree_sitter::{Language, Node, Parser, Tree};

use crate::kind::NodeKind;

/// Grammar used to parse a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// Plain TypeScript (`.ts`, `.mts`, `.cts`).
    TypeScript,
    /// TypeScript with JSX. Also parses plain JavaScript.
    Tsx,
}

impl Dialect {
    /// Picks the dialect from a file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "ts" | "mts" | "cts" => Some(Self::TypeScript),
            "tsx" | "js" | "jsx" | "mjs" | "cjs" => Some(Self::Tsx),
            _ => None,
        }
    }

    fn language(self) -> Language {
        match self {
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Self::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TypeScript => write!(f, "typescript"),
            Self::Tsx => write!(f, "tsx"),
        }
    }
}

/// Errors building a [`SourceTree`].
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// The grammar could not be loaded into the parser.
    #[error("failed to load {dialect} grammar: {source}")]
    Language {
        /// Dialect whose grammar failed.
        dialect: Dialect,
        /// Underlying tree-sitter error.
        source: tree_sitter::LanguageError,
    },

    /// The parser returned no tree.
    #[error("tree-sitter produced no tree for {dialect} source")]
    Parse {
        /// Dialect being parsed.
        dialect: Dialect,
    },
}

/// Leading whitespace measured in front of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LeadingWhitespace {
    /// Spaces in the leading run.
    pub spaces: usize,
    /// Tabs in the leading run.
    pub tabs: usize,
    /// The token is the first significant content on its line.
    pub first_in_line: bool,
}

/// Parsed source file.
pub struct SourceTree {
    source: String,
    tree: Tree,
    dialect: Dialect,
}

impl fmt::Debug for SourceTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceTree")
            .field("dialect", &self.dialect)
            .field("len", &self.source.len())
            .finish_non_exhaustive()
    }
}

impl SourceTree {
    /// Parses `source` with the grammar for `dialect`.
    ///
    /// # Errors
    ///
    /// Returns an error if the grammar cannot be loaded or the parser gives up.
    pub fn parse(source: impl Into<String>, dialect: Dialect) -> Result<Self, TreeError> {
        let source = source.into();
        let mut parser = Parser::new();
        parser
            .set_language(&dialect.language())
            .map_err(|source| TreeError::Language { dialect, source })?;
        let tree = parser
            .parse(source.as_bytes(), None)
            .ok_or(TreeError::Parse { dialect })?;

        Ok(Self {
            source,
            tree,
            dialect,
        })
    }

    /// The `program` node.
    #[must_use]
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Full source text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Grammar the tree was parsed with.
    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Position of the first syntax error, as 1-based line and column.
    #[must_use]
    pub fn first_error(&self) -> Option<(usize, usize)> {
        let root = self.root();
        if !root.has_error() {
            return None;
        }
        let mut node = root;
        loop {
            let next = {
                let mut cursor = node.walk();
                let children: Vec<_> = node.children(&mut cursor).collect();
                children
                    .into_iter()
                    .find(|child| child.has_error() || child.is_missing())
            };
            match next {
                Some(child) if child.is_error() || child.is_missing() => {
                    node = child;
                    break;
                }
                Some(child) => node = child,
                None => break,
            }
        }
        let pos = node.start_position();
        Some((pos.row + 1, pos.column + 1))
    }

    /// Text covered by `node`.
    #[must_use]
    pub fn text(&self, node: Node<'_>) -> &str {
        self.source
            .get(node.start_byte()..node.end_byte())
            .unwrap_or("")
    }

    /// Construct category of `node`.
    #[must_use]
    pub fn kind(node: Node<'_>) -> NodeKind {
        NodeKind::from_grammar(node.kind())
    }

    /// 0-based row where `node` starts.
    #[must_use]
    pub fn row(node: Node<'_>) -> usize {
        node.start_position().row
    }

    /// 0-based row where `node` ends.
    #[must_use]
    pub fn end_row(node: Node<'_>) -> usize {
        node.end_position().row
    }

    /// True if `node` spans no line break.
    #[must_use]
    pub fn is_single_line(node: Node<'_>) -> bool {
        Self::row(node) == Self::end_row(node)
    }

    /// Byte offset of the start of the line containing `offset`.
    #[must_use]
    pub fn line_start(&self, offset: usize) -> usize {
        self.source
            .get(..offset)
            .and_then(|before| before.rfind('\n'))
            .map_or(0, |i| i + 1)
    }

    /// 0-based column of `offset`, counted in characters.
    #[must_use]
    pub fn column_at(&self, offset: usize) -> usize {
        self.source
            .get(self.line_start(offset)..offset)
            .map_or(0, |prefix| prefix.chars().count())
    }

    /// 0-based column of the start of `node`, counted in characters.
    #[must_use]
    pub fn column(&self, node: Node<'_>) -> usize {
        self.column_at(node.start_byte())
    }

    /// Children that are real syntax: named, not comments.
    #[must_use]
    pub fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
        let mut cursor = node.walk();
        node.named_children(&mut cursor)
            .filter(|child| !child.is_extra() && Self::kind(*child) != NodeKind::Comment)
            .collect()
    }

    /// Children stored under `field`, comments excluded.
    #[must_use]
    pub fn field_children<'t>(node: Node<'t>, field: &str) -> Vec<Node<'t>> {
        let mut cursor = node.walk();
        node.children_by_field_name(field, &mut cursor)
            .filter(|child| !child.is_extra())
            .collect()
    }

    /// First child token whose grammar kind is exactly `kind`.
    #[must_use]
    pub fn child_token<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
        let mut cursor = node.walk();
        let found = node.children(&mut cursor).find(|child| child.kind() == kind);
        found
    }

    /// Last leaf of `node`, skipping comments.
    #[must_use]
    pub fn last_token(node: Node<'_>) -> Node<'_> {
        let mut current = node;
        loop {
            let mut cursor = current.walk();
            let last = current
                .children(&mut cursor)
                .filter(|child| !child.is_extra())
                .last();
            match last {
                Some(child) => current = child,
                None => return current,
            }
        }
    }

    /// Previous sibling that is not a comment.
    #[must_use]
    pub fn prev_token(node: Node<'_>) -> Option<Node<'_>> {
        let mut sibling = node.prev_sibling();
        while let Some(candidate) = sibling {
            if !candidate.is_extra() {
                return Some(candidate);
            }
            sibling = candidate.prev_sibling();
        }
        None
    }

    /// Parent with the grammar's `arguments` wrapper skipped, so a call
    /// argument's parent is the call itself.
    #[must_use]
    pub fn syntactic_parent(node: Node<'_>) -> Option<Node<'_>> {
        let parent = node.parent()?;
        if Self::kind(parent) == NodeKind::Arguments {
            parent.parent()
        } else {
            Some(parent)
        }
    }

    /// Nearest strict ancestor of `kind`, not looking past the program.
    #[must_use]
    pub fn ancestor(node: Node<'_>, kind: NodeKind) -> Option<Node<'_>> {
        let mut current = node.parent();
        while let Some(ancestor) = current {
            let ancestor_kind = Self::kind(ancestor);
            if ancestor_kind == kind {
                return Some(ancestor);
            }
            if ancestor_kind == NodeKind::Program {
                return None;
            }
            current = ancestor.parent();
        }
        None
    }

    /// True if only spaces and tabs precede `offset` on its line.
    #[must_use]
    pub fn starts_line(&self, offset: usize) -> bool {
        self.source
            .get(..offset)
            .map_or(true, |before| {
                before
                    .bytes()
                    .rev()
                    .find(|b| *b != b' ' && *b != b'\t')
                    .map_or(true, |b| b == b'\n')
            })
    }

    /// Leading whitespace of the line holding `offset`, up to `offset`.
    ///
    /// Only the leading run of whitespace is counted. The token is first in
    /// line when that run is all there is before it, or when it directly
    /// follows a comment that spans several lines.
    #[must_use]
    pub fn leading_whitespace(&self, offset: usize) -> LeadingWhitespace {
        let prefix = self
            .source
            .get(self.line_start(offset)..offset)
            .unwrap_or("");

        let mut spaces = 0;
        let mut tabs = 0;
        for c in prefix.chars().take_while(|c| c.is_whitespace()) {
            match c {
                ' ' => spaces += 1,
                '\t' => tabs += 1,
                _ => {}
            }
        }

        let first_in_line = spaces + tabs == prefix.chars().count()
            || self.has_multiline_leading_comment(offset);

        LeadingWhitespace {
            spaces,
            tabs,
            first_in_line,
        }
    }

    /// True if the token at `offset` directly follows a comment that spans
    /// a line break, with only spaces and tabs in between.
    #[must_use]
    pub fn has_multiline_leading_comment(&self, offset: usize) -> bool {
        let Some(before) = self.source.get(..offset) else {
            return false;
        };
        let end = before.trim_end_matches([' ', '\t']).len();
        if end == 0 || !before[..end].ends_with("*/") {
            return false;
        }

        self.root()
            .descendant_for_byte_range(end - 1, end)
            .filter(|node| Self::kind(*node) == NodeKind::Comment && node.end_byte() == end)
            .is_some_and(|comment| self.text(comment).contains('\n'))
    }
}
