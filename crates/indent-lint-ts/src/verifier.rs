//! Indentation verifier.
//!
//! One [`IndentVerifier`] walks one [`SourceTree`] depth-first and compares
//! the leading whitespace of every line-starting construct against the
//! indent its context calls for:
//!
//! - statements of the program sit at column 0
//! - statements of a block sit one unit past the construct that owns it,
//!   and the closing brace lines up with that construct
//! - `case` clauses sit `SwitchCase` units past their `switch`
//! - continuation declarators sit `VariableDeclarator` units past `var`,
//!   `let` or `const`
//! - function bodies, literal interiors, parameter lists and member chains
//!   follow their own offsets
//!
//! The verifier has no error path. A construct missing an expected part has
//! nothing to check.

use std::path::PathBuf;

use indent_lint_core::{ParameterIndent, ResolvedConfig, Severity, UnitKind, Violation};
use tree_sitter::Node;

use crate::cache::LineIndentCache;
use crate::kind::NodeKind;
use crate::reporter::Reporter;
use crate::tree::SourceTree;

/// Indentation measured in front of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct NodeIndent {
    spaces: usize,
    tabs: usize,
    /// Count of the configured unit character.
    matching: usize,
    /// Count of the other indentation character.
    other: usize,
    first_in_line: bool,
}

impl NodeIndent {
    fn differs_from(self, needed: usize) -> bool {
        self.matching != needed || self.other != 0
    }
}

fn measure(tree: &SourceTree, unit: UnitKind, node: Node<'_>) -> NodeIndent {
    if SourceTree::kind(node) == NodeKind::Program {
        return NodeIndent::default();
    }

    let ws = tree.leading_whitespace(node.start_byte());
    let (matching, other) = match unit {
        UnitKind::Space => (ws.spaces, ws.tabs),
        UnitKind::Tab => (ws.tabs, ws.spaces),
    };
    NodeIndent {
        spaces: ws.spaces,
        tabs: ws.tabs,
        matching,
        other,
        first_in_line: ws.first_in_line,
    }
}

/// Verifies the indentation of one parsed file.
#[derive(Debug)]
pub struct IndentVerifier<'t> {
    tree: &'t SourceTree,
    options: ResolvedConfig,
    cache: LineIndentCache,
    reporter: Reporter,
}

impl<'t> IndentVerifier<'t> {
    /// Creates a verifier for one pass over `tree`.
    #[must_use]
    pub fn new(
        tree: &'t SourceTree,
        options: ResolvedConfig,
        file: PathBuf,
        severity: Severity,
    ) -> Self {
        Self {
            tree,
            options,
            cache: LineIndentCache::new(),
            reporter: Reporter::new(file, severity, options.unit.kind()),
        }
    }

    /// Runs the pass and returns the violations ordered by position.
    #[must_use]
    pub fn verify(mut self) -> Vec<Violation> {
        self.visit(self.tree.root());
        self.reporter.finish()
    }

    fn visit(&mut self, node: Node<'t>) {
        let kind = SourceTree::kind(node);
        match kind {
            NodeKind::Program => {
                let statements = SourceTree::named_children(node);
                self.check_nodes(&statements, 0);
            }
            NodeKind::Block => self.block_indentation_check(node),
            NodeKind::If => self.visit_if(node),
            NodeKind::While | NodeKind::For | NodeKind::ForIn | NodeKind::Do => {
                self.block_less_nodes(node);
            }
            NodeKind::ClassDeclaration | NodeKind::ClassExpression => {
                if let Some(body) = node.child_by_field_name("body") {
                    self.block_indentation_check(body);
                }
            }
            NodeKind::ObjectLiteral | NodeKind::ArrayLiteral => self.check_literal(node),
            NodeKind::Switch => self.visit_switch(node),
            NodeKind::Case | NodeKind::Default => self.visit_case(node),
            NodeKind::VariableDeclarator => self.check_declarator(node),
            NodeKind::FunctionDeclaration | NodeKind::FunctionExpression => {
                self.check_parameters(node);
            }
            NodeKind::MemberAccess => self.check_member_chain(node),
            _ => {}
        }

        let children = {
            let mut cursor = node.walk();
            node.children(&mut cursor)
                .filter(|child| !child.is_extra())
                .collect::<Vec<_>>()
        };
        for child in children {
            self.visit(child);
        }

        if kind == NodeKind::VariableStatement {
            self.check_declaration_end(node);
        }
    }

    // --- measurement ---

    fn unit(&self) -> usize {
        self.options.unit.size()
    }

    fn levels(&self, multiplier: usize) -> usize {
        self.options.unit.times(multiplier)
    }

    fn indent(&self, node: Node<'_>) -> NodeIndent {
        measure(self.tree, self.options.unit.kind(), node)
    }

    fn starts_line(&self, node: Node<'_>) -> bool {
        self.tree.starts_line(node.start_byte())
    }

    fn declaration_keyword(&self, declaration: Node<'_>) -> &'t str {
        let mut cursor = declaration.walk();
        let first = declaration.children(&mut cursor).next();
        first.map_or("", |token| self.tree.text(token))
    }

    /// Extra indent for continuation lines of the statement owning `declarator`.
    fn declarator_offset(&self, declarator: Node<'_>) -> usize {
        let keyword = declarator
            .parent()
            .map_or("", |declaration| self.declaration_keyword(declaration));
        self.levels(self.options.variable_declarator.for_keyword(keyword))
    }

    // --- checks ---

    fn check_nodes(&mut self, nodes: &[Node<'t>], needed: usize) {
        for node in nodes {
            self.check_node_indent(*node, needed);
        }
    }

    fn check_node_indent(&mut self, node: Node<'t>, needed: usize) {
        let kind = SourceTree::kind(node);
        if !kind.is_literal() {
            let actual = self.indent(node);
            if actual.first_in_line && actual.differs_from(needed) {
                self.reporter
                    .report(self.tree, node, needed, actual.spaces, actual.tabs);
            }
        }

        if kind == NodeKind::If {
            let Some(alternative) = node.child_by_field_name("alternative") else {
                return;
            };
            if let Some(keyword) = SourceTree::child_token(alternative, "else") {
                self.check_node_indent(keyword, needed);
            }
            if let Some(branch) = SourceTree::named_children(alternative).first().copied() {
                if !self.starts_line(branch) {
                    self.check_node_indent(branch, needed);
                }
            }
        }
    }

    fn check_first_line(&mut self, node: Node<'t>, needed: usize) {
        let actual = self.indent(node);
        if actual.first_in_line && actual.differs_from(needed) {
            self.reporter
                .report(self.tree, node, needed, actual.spaces, actual.tabs);
        }
    }

    /// Checks the line holding the last token of `node`, usually a closing delimiter.
    fn check_last_line(&mut self, node: Node<'t>, needed: usize) {
        let last = SourceTree::last_token(node);
        let actual = self.indent(last);
        if actual.first_in_line && actual.differs_from(needed) {
            self.reporter
                .report(self.tree, last, needed, actual.spaces, actual.tabs);
        }
    }

    // --- blocks ---

    fn is_single_line_body(node: Node<'_>) -> bool {
        if SourceTree::kind(node) != NodeKind::ClassBody {
            return SourceTree::is_single_line(node);
        }
        let members = SourceTree::named_children(node);
        match (members.first(), members.last()) {
            (Some(first), Some(last)) => SourceTree::row(*first) == SourceTree::end_row(*last),
            _ => true,
        }
    }

    fn block_indentation_check(&mut self, node: Node<'t>) {
        if Self::is_single_line_body(node) {
            return;
        }

        let kind = SourceTree::kind(node);
        let parent = node.parent();
        if kind == NodeKind::Block
            && parent.is_some_and(|p| SourceTree::kind(p).is_function())
        {
            self.check_function_block(node);
            return;
        }

        let is_body = matches!(kind, NodeKind::Block | NodeKind::ClassBody);
        // an `else` block lines up with its `if`
        let owner = parent.map(|p| match SourceTree::kind(p) {
            NodeKind::Else => p.parent().unwrap_or(p),
            _ => p,
        });
        let indent = match owner {
            Some(p) if is_body && SourceTree::kind(p).owns_body_indent() => self.indent(p).matching,
            _ => self.indent(node).matching,
        };

        let children = match kind {
            NodeKind::If => node.child_by_field_name("consequence").into_iter().collect(),
            NodeKind::Block | NodeKind::ClassBody => SourceTree::named_children(node),
            _ => node.child_by_field_name("body").into_iter().collect::<Vec<_>>(),
        };

        if kind != NodeKind::ClassBody {
            self.check_node_indent(node, indent);
        }
        let unit = self.unit();
        self.check_nodes(&children, indent + unit);

        if kind == NodeKind::Block {
            self.check_last_line(node, indent);
        }
    }

    fn visit_if(&mut self, node: Node<'t>) {
        let Some(consequence) = node.child_by_field_name("consequence") else {
            return;
        };
        if SourceTree::kind(consequence) != NodeKind::Block
            && SourceTree::row(consequence) > SourceTree::row(node)
        {
            self.block_indentation_check(node);
        }
    }

    /// Loops whose body is a single statement without braces.
    fn block_less_nodes(&mut self, node: Node<'t>) {
        let Some(body) = node.child_by_field_name("body") else {
            return;
        };
        if SourceTree::kind(body) != NodeKind::Block {
            self.block_indentation_check(node);
        }
    }

    // --- switch ---

    fn expected_case_indent(&mut self, switch: Node<'t>) -> usize {
        let (tree, options) = (self.tree, self.options);
        self.cache.case_indent(SourceTree::row(switch), || {
            measure(tree, options.unit.kind(), switch).matching
                + options.unit.times(options.switch_case)
        })
    }

    fn visit_switch(&mut self, node: Node<'t>) {
        let switch_indent = self.indent(node).matching;
        let case_indent = self.expected_case_indent(node);
        if let Some(body) = node
            .child_by_field_name("body")
            .filter(|b| SourceTree::kind(*b) == NodeKind::SwitchBody)
        {
            let clauses = SourceTree::named_children(body);
            self.check_nodes(&clauses, case_indent);
        }
        self.check_last_line(node, switch_indent);
    }

    fn visit_case(&mut self, node: Node<'t>) {
        if SourceTree::is_single_line(node) {
            return;
        }
        let Some(switch) = SourceTree::ancestor(node, NodeKind::Switch) else {
            return;
        };
        let case_indent = self.expected_case_indent(switch);
        let statements = SourceTree::field_children(node, "body");
        let unit = self.unit();
        self.check_nodes(&statements, case_indent + unit);
    }

    // --- variable declarations ---

    fn expected_var_indent(&mut self, declaration: Node<'t>) -> usize {
        let (tree, options) = (self.tree, self.options);
        let keyword = self.declaration_keyword(declaration);
        self.cache.var_indent(SourceTree::row(declaration), || {
            measure(tree, options.unit.kind(), declaration).matching
                + options
                    .unit
                    .times(options.variable_declarator.for_keyword(keyword))
        })
    }

    fn check_declarator(&mut self, declarator: Node<'t>) {
        let Some(declaration) = declarator
            .parent()
            .filter(|p| SourceTree::kind(*p) == NodeKind::VariableStatement)
        else {
            return;
        };
        let indent = self.expected_var_indent(declaration);
        self.check_node_indent(declarator, indent);
    }

    fn declarators(declaration: Node<'_>) -> Vec<Node<'_>> {
        SourceTree::named_children(declaration)
            .into_iter()
            .filter(|child| SourceTree::kind(*child) == NodeKind::VariableDeclarator)
            .collect()
    }

    /// Checks a statement terminator that sits on its own line after the
    /// last declarator.
    fn check_declaration_end(&mut self, declaration: Node<'t>) {
        let in_loop_header = declaration
            .parent()
            .is_some_and(|p| SourceTree::kind(p).is_loop());
        if in_loop_header {
            return;
        }

        let Some(last) = Self::declarators(declaration).last().copied() else {
            return;
        };
        let last_token = SourceTree::last_token(declaration);
        if SourceTree::end_row(last_token) <= SourceTree::end_row(last) {
            return;
        }

        let needed = match SourceTree::prev_token(last) {
            // comma-first layout
            Some(comma) if comma.kind() == "," => self.indent(comma).matching,
            _ => {
                let unit = self.unit();
                self.expected_var_indent(declaration).saturating_sub(unit)
            }
        };
        self.check_last_line(declaration, needed);
    }

    fn is_first_declarator(declarator: Node<'_>) -> bool {
        declarator
            .parent()
            .and_then(|declaration| Self::declarators(declaration).first().copied())
            .is_some_and(|first| first == declarator)
    }

    /// True if `node` starts on the row of a statement declaring several
    /// variables, one of which is `declarator`.
    fn is_in_var_on_top(node: Node<'_>, declarator: Node<'_>) -> bool {
        declarator.parent().is_some_and(|declaration| {
            SourceTree::row(declaration) == SourceTree::row(node)
                && Self::declarators(declaration).len() > 1
        })
    }

    // --- array and object literals ---

    fn is_first_array_element_on_same_line(node: Node<'_>) -> bool {
        if SourceTree::kind(node) != NodeKind::ArrayLiteral {
            return false;
        }
        SourceTree::named_children(node).first().is_some_and(|first| {
            SourceTree::row(*first) == SourceTree::row(node)
                && SourceTree::kind(*first) == NodeKind::ObjectLiteral
        })
    }

    fn is_plain_assignment(node: Node<'_>) -> bool {
        node.kind() == "assignment_expression"
    }

    fn check_literal(&mut self, node: Node<'t>) {
        if SourceTree::is_single_line(node) {
            return;
        }

        let elements = SourceTree::named_children(node);
        if elements
            .first()
            .is_some_and(|first| SourceTree::row(*first) == SourceTree::row(node))
        {
            return;
        }

        let unit = self.unit();
        let parent_var = SourceTree::ancestor(node, NodeKind::VariableDeclarator);

        let mut elements_indent = if self.starts_line(node) {
            let Some(parent) = SourceTree::syntactic_parent(node) else {
                return;
            };
            let parent_kind = SourceTree::kind(parent);

            let mut effective = parent;
            if parent_kind == NodeKind::FieldDefinition {
                // field -> class_body -> class
                if let Some(class) = parent.parent().and_then(|body| body.parent()) {
                    effective = if self.starts_line(parent) {
                        class.parent().unwrap_or(class)
                    } else {
                        class
                    };
                }
            }

            let mut node_indent = self.indent(effective).matching;
            match parent_var {
                Some(var) if SourceTree::row(var) != SourceTree::row(node) => {
                    if parent_kind != NodeKind::VariableDeclarator || Self::is_first_declarator(var)
                    {
                        if parent_kind == NodeKind::VariableDeclarator
                            && SourceTree::row(var) == SourceTree::row(effective)
                        {
                            node_indent += self.declarator_offset(var);
                        } else if matches!(
                            parent_kind,
                            NodeKind::ObjectLiteral
                                | NodeKind::ArrayLiteral
                                | NodeKind::Call
                                | NodeKind::ArrowFunction
                                | NodeKind::New
                                | NodeKind::Binary
                                | NodeKind::Assignment
                        ) {
                            node_indent += unit;
                        }
                    }
                }
                Some(_) => {}
                None => {
                    let effective_kind = SourceTree::kind(effective);
                    if !Self::is_first_array_element_on_same_line(parent)
                        && !matches!(
                            effective_kind,
                            NodeKind::MemberAccess
                                | NodeKind::ExpressionStatement
                                | NodeKind::PropertyAssignment
                        )
                        && !Self::is_plain_assignment(effective)
                    {
                        node_indent += unit;
                    }
                }
            }

            self.check_first_line(node, node_indent);
            node_indent + unit
        } else {
            self.indent(node).matching + unit
        };

        if let Some(var) = parent_var {
            if Self::is_in_var_on_top(node, var) {
                elements_indent += self.declarator_offset(var);
            }
        }

        self.check_nodes(&elements, elements_indent);

        if elements
            .last()
            .is_some_and(|last| SourceTree::end_row(*last) == SourceTree::end_row(node))
        {
            return;
        }
        self.check_last_line(node, elements_indent - unit);
    }

    // --- functions ---

    /// True if `function` is the second argument of its call and the first
    /// argument spans several lines.
    fn is_arg_before_callee_multiline(function: Node<'_>, call: Node<'_>) -> bool {
        let Some(arguments) = call.child_by_field_name("arguments") else {
            return false;
        };
        let args = SourceTree::named_children(arguments);
        args.len() >= 2 && args[1] == function && !SourceTree::is_single_line(args[0])
    }

    /// True if `function` is invoked immediately by a top-level statement.
    fn is_outer_iife(function: Node<'_>) -> bool {
        let Some(mut parent) = function.parent() else {
            return false;
        };
        let mut callee = function;
        if SourceTree::kind(parent) == NodeKind::Parenthesized {
            callee = parent;
            let Some(grandparent) = parent.parent() else {
                return false;
            };
            parent = grandparent;
        }
        if SourceTree::kind(parent) != NodeKind::Call
            || parent.child_by_field_name("function") != Some(callee)
        {
            return false;
        }

        let mut statement = parent.parent();
        while let Some(node) = statement {
            let passes = match SourceTree::kind(node) {
                NodeKind::Unary => node
                    .child_by_field_name("operator")
                    .is_some_and(|op| matches!(op.kind(), "!" | "~" | "+" | "-")),
                NodeKind::Binary
                | NodeKind::Assignment
                | NodeKind::VariableDeclarator
                | NodeKind::Parenthesized => true,
                _ => false,
            };
            if !passes {
                break;
            }
            statement = node.parent();
        }

        statement.is_some_and(|s| {
            matches!(
                SourceTree::kind(s),
                NodeKind::ExpressionStatement | NodeKind::VariableStatement
            ) && s
                .parent()
                .is_some_and(|p| SourceTree::kind(p) == NodeKind::Program)
        })
    }

    fn check_function_block(&mut self, body: Node<'t>) {
        let Some(function) = body.parent() else {
            return;
        };
        let function_kind = SourceTree::kind(function);
        let mut indent = self.indent(function).matching;

        if let Some(call) = SourceTree::syntactic_parent(function)
            .filter(|p| SourceTree::kind(*p) == NodeKind::Call)
        {
            if matches!(
                function_kind,
                NodeKind::FunctionExpression | NodeKind::ArrowFunction
            ) {
                let callee_single_line = call
                    .child_by_field_name("function")
                    .is_some_and(SourceTree::is_single_line);
                if Self::is_arg_before_callee_multiline(function, call)
                    && callee_single_line
                    && !self.starts_line(function)
                {
                    indent = self.indent(call).matching;
                }
            } else if SourceTree::row(call) < SourceTree::row(body) {
                indent = self.indent(call).matching;
            }
        }

        let function_offset = match self.options.outer_iife_body {
            Some(levels) if Self::is_outer_iife(function) => self.levels(levels),
            _ => match function_kind {
                NodeKind::FunctionExpression => self.levels(self.options.function_expression.body),
                NodeKind::FunctionDeclaration => {
                    self.levels(self.options.function_declaration.body)
                }
                _ => self.unit(),
            },
        };
        indent += function_offset;

        if let Some(var) = SourceTree::ancestor(body, NodeKind::VariableDeclarator) {
            if Self::is_in_var_on_top(body, var) {
                indent += self.declarator_offset(var);
            }
        }

        let statements = SourceTree::named_children(body);
        self.check_nodes(&statements, indent);
        self.check_last_line(body, indent - function_offset);
    }

    fn check_parameters(&mut self, function: Node<'t>) {
        if SourceTree::is_single_line(function) {
            return;
        }
        let mode = match SourceTree::kind(function) {
            NodeKind::FunctionDeclaration => self.options.function_declaration.parameters,
            NodeKind::FunctionExpression => self.options.function_expression.parameters,
            _ => return,
        };
        let Some(list) = function
            .child_by_field_name("parameters")
            .filter(|l| SourceTree::kind(*l) == NodeKind::FormalParameters)
        else {
            return;
        };
        let params = SourceTree::named_children(list);

        match mode {
            ParameterIndent::Unchecked => {}
            ParameterIndent::First => {
                if let Some((first, rest)) = params.split_first() {
                    let column = self.tree.column(*first);
                    self.check_nodes(rest, column);
                }
            }
            ParameterIndent::Offset(levels) => {
                let indent = self.indent(function).matching + self.levels(levels);
                self.check_nodes(&params, indent);
            }
        }
    }

    // --- member chains ---

    fn binary_ancestor(node: Node<'_>) -> Option<Node<'_>> {
        let mut current = node.parent();
        while let Some(ancestor) = current {
            let kind = SourceTree::kind(ancestor);
            if kind.is_binary_like() {
                return Some(ancestor);
            }
            if kind == NodeKind::Program {
                return None;
            }
            current = ancestor.parent();
        }
        None
    }

    fn check_member_chain(&mut self, node: Node<'t>) {
        let Some(levels) = self.options.member_expression else {
            return;
        };
        if SourceTree::is_single_line(node)
            || SourceTree::ancestor(node, NodeKind::VariableDeclarator).is_some()
            || Self::binary_ancestor(node).is_some_and(Self::is_plain_assignment)
        {
            return;
        }

        let indent = self.indent(node).matching + self.levels(levels);
        let mut targets = Vec::with_capacity(2);
        if let Some(property) = node.child_by_field_name("property") {
            targets.push(property);
            if let Some(accessor) = SourceTree::prev_token(property)
                .filter(|t| matches!(t.kind(), "." | "?." | "optional_chain"))
            {
                targets.push(accessor);
            }
        }
        self.check_nodes(&targets, indent);
    }
}
