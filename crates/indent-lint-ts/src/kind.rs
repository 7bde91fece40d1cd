//! Closed classification of grammar node kinds.
//!
//! The verifier only distinguishes the constructs below; every other
//! tree-sitter kind is [`NodeKind::Other`].

/// Construct category of a syntax node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// `program`
    Program,
    /// `{ ... }` statement block.
    Block,
    /// `if (...) ...`
    If,
    /// `else ...` branch holder of an `if`.
    Else,
    /// `while (...) ...`
    While,
    /// `for (;;) ...`
    For,
    /// `for (... in ...)` and `for (... of ...)`.
    ForIn,
    /// `do ... while (...)`
    Do,
    /// `switch (...) { ... }`
    Switch,
    /// The braced clause list of a `switch`.
    SwitchBody,
    /// `case x:`
    Case,
    /// `default:`
    Default,
    /// `var`/`let`/`const` statement holding its declarator list.
    VariableStatement,
    /// One `name = value` declarator.
    VariableDeclarator,
    /// `function f() {}` including generators.
    FunctionDeclaration,
    /// `function () {}` in expression position, including generators.
    FunctionExpression,
    /// `() => ...`
    ArrowFunction,
    /// `class C {}`
    ClassDeclaration,
    /// `class {}` in expression position.
    ClassExpression,
    /// The braced member list of a class.
    ClassBody,
    /// A class property declaration.
    FieldDefinition,
    /// `{ a: 1 }`
    ObjectLiteral,
    /// `[1, 2]`
    ArrayLiteral,
    /// `key: value` inside an object literal.
    PropertyAssignment,
    /// `a.b` and `a?.b`
    MemberAccess,
    /// `f(...)`
    Call,
    /// `new C(...)`
    New,
    /// The parenthesized argument list of a call.
    Arguments,
    /// `a + b`, `a && b`, `a, b`
    Binary,
    /// `a = b`, `a += b`
    Assignment,
    /// `!a`, `-a`, `typeof a`
    Unary,
    /// `(a)`
    Parenthesized,
    /// A statement made of one expression.
    ExpressionStatement,
    /// The parameter list of a function.
    FormalParameters,
    /// Line or block comment.
    Comment,
    /// Anything else.
    Other,
}

impl NodeKind {
    /// Classifies a tree-sitter kind name.
    #[must_use]
    pub fn from_grammar(kind: &str) -> Self {
        match kind {
            "program" => Self::Program,
            "statement_block" => Self::Block,
            "if_statement" => Self::If,
            "else_clause" => Self::Else,
            "while_statement" => Self::While,
            "for_statement" => Self::For,
            "for_in_statement" => Self::ForIn,
            "do_statement" => Self::Do,
            "switch_statement" => Self::Switch,
            "switch_body" => Self::SwitchBody,
            "switch_case" => Self::Case,
            "switch_default" => Self::Default,
            "variable_declaration" | "lexical_declaration" => Self::VariableStatement,
            "variable_declarator" => Self::VariableDeclarator,
            "function_declaration" | "generator_function_declaration" => Self::FunctionDeclaration,
            "function_expression" | "function" | "generator_function" => Self::FunctionExpression,
            "arrow_function" => Self::ArrowFunction,
            "class_declaration" | "abstract_class_declaration" => Self::ClassDeclaration,
            "class" => Self::ClassExpression,
            "class_body" => Self::ClassBody,
            "public_field_definition" | "field_definition" => Self::FieldDefinition,
            "object" => Self::ObjectLiteral,
            "array" => Self::ArrayLiteral,
            "pair" => Self::PropertyAssignment,
            "member_expression" => Self::MemberAccess,
            "call_expression" => Self::Call,
            "new_expression" => Self::New,
            "arguments" => Self::Arguments,
            "binary_expression" | "sequence_expression" => Self::Binary,
            "assignment_expression" | "augmented_assignment_expression" => Self::Assignment,
            "unary_expression" => Self::Unary,
            "parenthesized_expression" => Self::Parenthesized,
            "expression_statement" => Self::ExpressionStatement,
            "formal_parameters" => Self::FormalParameters,
            "comment" | "html_comment" => Self::Comment,
            _ => Self::Other,
        }
    }

    /// Function-like nodes whose block body gets function-body treatment.
    #[must_use]
    pub fn is_function(self) -> bool {
        matches!(
            self,
            Self::FunctionDeclaration | Self::FunctionExpression | Self::ArrowFunction
        )
    }

    /// Class declarations and class expressions.
    #[must_use]
    pub fn is_class(self) -> bool {
        matches!(self, Self::ClassDeclaration | Self::ClassExpression)
    }

    /// Loop statements.
    #[must_use]
    pub fn is_loop(self) -> bool {
        matches!(self, Self::While | Self::For | Self::ForIn | Self::Do)
    }

    /// Binary operators, assignments included.
    #[must_use]
    pub fn is_binary_like(self) -> bool {
        matches!(self, Self::Binary | Self::Assignment)
    }

    /// Array and object literals, whose interiors are checked separately.
    #[must_use]
    pub fn is_literal(self) -> bool {
        matches!(self, Self::ObjectLiteral | Self::ArrayLiteral)
    }

    /// Statements whose body block is measured from the statement itself.
    #[must_use]
    pub fn owns_body_indent(self) -> bool {
        self.is_loop() || self.is_class() || matches!(self, Self::If | Self::Program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_declaration_keywords_together() {
        assert_eq!(
            NodeKind::from_grammar("variable_declaration"),
            NodeKind::VariableStatement
        );
        assert_eq!(
            NodeKind::from_grammar("lexical_declaration"),
            NodeKind::VariableStatement
        );
    }

    #[test]
    fn classifies_function_expression_spellings() {
        for kind in ["function_expression", "function", "generator_function"] {
            assert_eq!(NodeKind::from_grammar(kind), NodeKind::FunctionExpression);
        }
    }

    #[test]
    fn unknown_kinds_are_other() {
        assert_eq!(NodeKind::from_grammar("jsx_element"), NodeKind::Other);
        assert_eq!(NodeKind::from_grammar(";"), NodeKind::Other);
    }

    #[test]
    fn body_owners() {
        assert!(NodeKind::If.owns_body_indent());
        assert!(NodeKind::ClassExpression.owns_body_indent());
        assert!(NodeKind::Program.owns_body_indent());
        assert!(!NodeKind::Block.owns_body_indent());
        assert!(!NodeKind::Switch.owns_body_indent());
        assert!(!NodeKind::Else.owns_body_indent());
    }

    #[test]
    fn classifies_switch_body_and_parameter_list() {
        assert_eq!(NodeKind::from_grammar("switch_body"), NodeKind::SwitchBody);
        assert_eq!(
            NodeKind::from_grammar("formal_parameters"),
            NodeKind::FormalParameters
        );
    }
}
