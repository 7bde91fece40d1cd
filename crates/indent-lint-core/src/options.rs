//! Indentation options and their normalization.
//!
//! User input arrives as [`IndentOverrides`] (every field optional), either
//! built in code or read leniently from a `[rules.indent]` TOML table.
//! [`ResolvedConfig::resolve`] merges the overrides over the defaults into the
//! immutable record a verification pass reads.

use serde::{Deserialize, Serialize};

use crate::config::RuleConfig;

/// Default number of spaces per indent level.
pub const DEFAULT_INDENT_SIZE: usize = 4;

/// Default declarator offset for `var`, `let` and `const`.
pub const DEFAULT_DECLARATOR_OFFSET: usize = 1;

/// Default function body multiplier.
pub const DEFAULT_FUNCTION_BODY_OFFSET: usize = 1;

/// Character an indent unit is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    /// `' '`
    Space,
    /// `'\t'`
    Tab,
}

impl UnitKind {
    /// Returns `"space"`/`"spaces"` or `"tab"`/`"tabs"` for `count`.
    #[must_use]
    pub fn word(self, count: usize) -> &'static str {
        match (self, count) {
            (Self::Space, 1) => "space",
            (Self::Space, _) => "spaces",
            (Self::Tab, 1) => "tab",
            (Self::Tab, _) => "tabs",
        }
    }
}

/// The atomic indentation step of a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndentUnit {
    /// `n` space characters per level.
    Spaces(usize),
    /// One tab character per level.
    Tab,
}

impl IndentUnit {
    /// Number of characters in one level.
    #[must_use]
    pub fn size(self) -> usize {
        match self {
            Self::Spaces(n) => n,
            Self::Tab => 1,
        }
    }

    /// Character the unit is made of.
    #[must_use]
    pub fn kind(self) -> UnitKind {
        match self {
            Self::Spaces(_) => UnitKind::Space,
            Self::Tab => UnitKind::Tab,
        }
    }

    /// Characters for `multiplier` levels.
    #[must_use]
    pub fn times(self, multiplier: usize) -> usize {
        self.size() * multiplier
    }
}

impl Default for IndentUnit {
    fn default() -> Self {
        Self::Spaces(DEFAULT_INDENT_SIZE)
    }
}

/// How function parameters on continuation lines are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParameterIndent {
    /// Parameters are not checked.
    #[default]
    Unchecked,
    /// Parameters after the first align with the first parameter's column.
    First,
    /// Parameters sit this many levels past the function's own indent.
    Offset(usize),
}

/// Resolved parameter and body offsets for one function kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionOffsets {
    /// Parameter checking mode.
    pub parameters: ParameterIndent,
    /// Body multiplier.
    pub body: usize,
}

impl Default for FunctionOffsets {
    fn default() -> Self {
        Self {
            parameters: ParameterIndent::Unchecked,
            body: DEFAULT_FUNCTION_BODY_OFFSET,
        }
    }
}

/// Continuation-line offsets per declaration keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeclaratorOffsets {
    /// Offset for `var` statements.
    pub var: usize,
    /// Offset for `let` statements.
    pub let_: usize,
    /// Offset for `const` statements.
    pub const_: usize,
}

impl DeclaratorOffsets {
    /// Same offset for every keyword.
    #[must_use]
    pub fn uniform(offset: usize) -> Self {
        Self {
            var: offset,
            let_: offset,
            const_: offset,
        }
    }

    /// Offset for a declaration keyword; unknown keywords get the default.
    #[must_use]
    pub fn for_keyword(&self, keyword: &str) -> usize {
        match keyword {
            "var" => self.var,
            "let" => self.let_,
            "const" => self.const_,
            _ => DEFAULT_DECLARATOR_OFFSET,
        }
    }
}

impl Default for DeclaratorOffsets {
    fn default() -> Self {
        Self::uniform(DEFAULT_DECLARATOR_OFFSET)
    }
}

/// The immutable configuration of one verification pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResolvedConfig {
    /// Indent unit.
    pub unit: IndentUnit,
    /// Levels between a `switch` and its `case` clauses.
    pub switch_case: usize,
    /// Continuation offsets for multi-declarator statements.
    pub variable_declarator: DeclaratorOffsets,
    /// Body multiplier for top-level immediately-invoked functions; `None` inherits.
    pub outer_iife_body: Option<usize>,
    /// Offsets for function declarations.
    pub function_declaration: FunctionOffsets,
    /// Offsets for function expressions.
    pub function_expression: FunctionOffsets,
    /// Levels for chained member access; `None` disables the check.
    pub member_expression: Option<usize>,
}

impl ResolvedConfig {
    /// Merges `overrides` over the defaults.
    #[must_use]
    pub fn resolve(overrides: &IndentOverrides) -> Self {
        let unit = match overrides.indent {
            Some(IndentSetting::Tab) => IndentUnit::Tab,
            Some(IndentSetting::Spaces(n)) if n > 0 => IndentUnit::Spaces(n),
            Some(IndentSetting::Spaces(_)) | None => IndentUnit::default(),
        };

        let mut variable_declarator = DeclaratorOffsets::default();
        match overrides.variable_declarator {
            Some(DeclaratorSetting::All(n)) => variable_declarator = DeclaratorOffsets::uniform(n),
            Some(DeclaratorSetting::PerKeyword {
                var,
                let_,
                const_,
            }) => {
                if let Some(n) = var {
                    variable_declarator.var = n;
                }
                if let Some(n) = let_ {
                    variable_declarator.let_ = n;
                }
                if let Some(n) = const_ {
                    variable_declarator.const_ = n;
                }
            }
            None => {}
        }

        let config = Self {
            unit,
            switch_case: overrides.switch_case.unwrap_or(0),
            variable_declarator,
            outer_iife_body: overrides.outer_iife_body,
            function_declaration: overrides.function_declaration.resolve(),
            function_expression: overrides.function_expression.resolve(),
            member_expression: overrides.member_expression,
        };
        tracing::debug!(?config, "resolved indent options");
        config
    }

    /// Shorthand for the defaults with a different unit.
    #[must_use]
    pub fn with_unit(unit: IndentUnit) -> Self {
        Self {
            unit,
            ..Self::default()
        }
    }
}

/// The positional indent option: a space count or `"tab"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentSetting {
    /// Number of spaces; `0` falls back to the default.
    Spaces(usize),
    /// Tab mode.
    Tab,
}

impl std::str::FromStr for IndentSetting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("tab") {
            return Ok(Self::Tab);
        }
        s.parse::<usize>()
            .map(Self::Spaces)
            .map_err(|_| format!("expected a space count or \"tab\", got {s:?}"))
    }
}

/// `VariableDeclarator` input: one offset for all keywords or a partial map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclaratorSetting {
    /// Applies to `var`, `let` and `const`.
    All(usize),
    /// Overrides only the listed keywords.
    PerKeyword {
        /// `var` override.
        var: Option<usize>,
        /// `let` override.
        let_: Option<usize>,
        /// `const` override.
        const_: Option<usize>,
    },
}

/// `FunctionDeclaration`/`FunctionExpression` input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FunctionSetting {
    /// Parameter mode; unset means "do not check".
    pub parameters: Option<ParameterIndent>,
    /// Body multiplier; unset means 1.
    pub body: Option<usize>,
}

impl FunctionSetting {
    fn resolve(self) -> FunctionOffsets {
        FunctionOffsets {
            parameters: self.parameters.unwrap_or_default(),
            body: self.body.unwrap_or(DEFAULT_FUNCTION_BODY_OFFSET),
        }
    }
}

/// User-supplied option overrides, every field optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndentOverrides {
    /// Indent unit.
    pub indent: Option<IndentSetting>,
    /// `SwitchCase`.
    pub switch_case: Option<usize>,
    /// `VariableDeclarator`.
    pub variable_declarator: Option<DeclaratorSetting>,
    /// `outerIIFEBody`.
    pub outer_iife_body: Option<usize>,
    /// `MemberExpression`.
    pub member_expression: Option<usize>,
    /// `FunctionDeclaration`.
    pub function_declaration: FunctionSetting,
    /// `FunctionExpression`.
    pub function_expression: FunctionSetting,
}

impl IndentOverrides {
    /// Reads overrides from a `[rules.indent]` table.
    ///
    /// Values of the wrong shape are skipped with a warning so the default
    /// applies instead.
    #[must_use]
    pub fn from_rule_config(rule: &RuleConfig) -> Self {
        let options = &rule.options;
        Self {
            indent: options.get("indent").and_then(indent_setting),
            switch_case: options
                .get("SwitchCase")
                .and_then(|v| count("SwitchCase", v)),
            variable_declarator: options
                .get("VariableDeclarator")
                .and_then(declarator_setting),
            outer_iife_body: options
                .get("outerIIFEBody")
                .and_then(|v| count("outerIIFEBody", v)),
            member_expression: options
                .get("MemberExpression")
                .and_then(|v| count("MemberExpression", v)),
            function_declaration: options
                .get("FunctionDeclaration")
                .map(|v| function_setting("FunctionDeclaration", v))
                .unwrap_or_default(),
            function_expression: options
                .get("FunctionExpression")
                .map(|v| function_setting("FunctionExpression", v))
                .unwrap_or_default(),
        }
    }

    /// Sets the indent unit.
    #[must_use]
    pub fn indent(mut self, setting: IndentSetting) -> Self {
        self.indent = Some(setting);
        self
    }

    /// Sets `SwitchCase`.
    #[must_use]
    pub fn switch_case(mut self, levels: usize) -> Self {
        self.switch_case = Some(levels);
        self
    }

    /// Sets `VariableDeclarator`.
    #[must_use]
    pub fn variable_declarator(mut self, setting: DeclaratorSetting) -> Self {
        self.variable_declarator = Some(setting);
        self
    }

    /// Sets `outerIIFEBody`.
    #[must_use]
    pub fn outer_iife_body(mut self, levels: usize) -> Self {
        self.outer_iife_body = Some(levels);
        self
    }

    /// Sets `MemberExpression`.
    #[must_use]
    pub fn member_expression(mut self, levels: usize) -> Self {
        self.member_expression = Some(levels);
        self
    }

    /// Sets `FunctionDeclaration`.
    #[must_use]
    pub fn function_declaration(mut self, setting: FunctionSetting) -> Self {
        self.function_declaration = setting;
        self
    }

    /// Sets `FunctionExpression`.
    #[must_use]
    pub fn function_expression(mut self, setting: FunctionSetting) -> Self {
        self.function_expression = setting;
        self
    }
}

fn count(key: &str, value: &toml::Value) -> Option<usize> {
    match value.as_integer().map(usize::try_from) {
        Some(Ok(n)) => Some(n),
        _ => {
            tracing::warn!("ignoring {key} = {value}: expected a non-negative integer");
            None
        }
    }
}

fn indent_setting(value: &toml::Value) -> Option<IndentSetting> {
    match value {
        toml::Value::String(s) if s == "tab" => Some(IndentSetting::Tab),
        toml::Value::Integer(_) => count("indent", value).map(IndentSetting::Spaces),
        other => {
            tracing::warn!("ignoring indent = {other}: expected a space count or \"tab\"");
            None
        }
    }
}

fn declarator_setting(value: &toml::Value) -> Option<DeclaratorSetting> {
    match value {
        toml::Value::Integer(_) => count("VariableDeclarator", value).map(DeclaratorSetting::All),
        toml::Value::Table(table) => {
            let keyword = |name: &str| {
                table
                    .get(name)
                    .and_then(|v| count(&format!("VariableDeclarator.{name}"), v))
            };
            Some(DeclaratorSetting::PerKeyword {
                var: keyword("var"),
                let_: keyword("let"),
                const_: keyword("const"),
            })
        }
        other => {
            tracing::warn!("ignoring VariableDeclarator = {other}: expected an integer or a table");
            None
        }
    }
}

fn function_setting(key: &str, value: &toml::Value) -> FunctionSetting {
    let Some(table) = value.as_table() else {
        tracing::warn!("ignoring {key} = {value}: expected a table");
        return FunctionSetting::default();
    };

    let parameters = match table.get("parameters") {
        None => None,
        Some(toml::Value::String(s)) if s == "first" => Some(ParameterIndent::First),
        Some(v) if v.is_integer() => {
            count(&format!("{key}.parameters"), v).map(ParameterIndent::Offset)
        }
        Some(other) => {
            tracing::warn!("ignoring {key}.parameters = {other}: expected an integer or \"first\"");
            None
        }
    };
    let body = table
        .get("body")
        .and_then(|v| count(&format!("{key}.body"), v));

    FunctionSetting { parameters, body }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn overrides_from(toml: &str) -> IndentOverrides {
        let config = Config::parse(toml).expect("config should parse");
        let rule = config.rules.indent.unwrap_or_default();
        IndentOverrides::from_rule_config(&rule)
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = ResolvedConfig::resolve(&IndentOverrides::default());
        assert_eq!(config.unit, IndentUnit::Spaces(4));
        assert_eq!(config.switch_case, 0);
        assert_eq!(config.variable_declarator, DeclaratorOffsets::uniform(1));
        assert_eq!(config.outer_iife_body, None);
        assert_eq!(config.member_expression, None);
        assert_eq!(config.function_declaration.parameters, ParameterIndent::Unchecked);
        assert_eq!(config.function_expression.body, 1);
    }

    #[test]
    fn zero_indent_falls_back_to_default() {
        let config =
            ResolvedConfig::resolve(&IndentOverrides::default().indent(IndentSetting::Spaces(0)));
        assert_eq!(config.unit, IndentUnit::Spaces(4));
    }

    #[test]
    fn tab_unit_has_width_one() {
        let config = ResolvedConfig::resolve(&IndentOverrides::default().indent(IndentSetting::Tab));
        assert_eq!(config.unit.size(), 1);
        assert_eq!(config.unit.kind(), UnitKind::Tab);
        assert_eq!(config.unit.times(3), 3);
    }

    #[test]
    fn partial_declarator_map_keeps_other_defaults() {
        let config = ResolvedConfig::resolve(&IndentOverrides::default().variable_declarator(
            DeclaratorSetting::PerKeyword {
                var: Some(2),
                let_: None,
                const_: Some(3),
            },
        ));
        assert_eq!(config.variable_declarator.for_keyword("var"), 2);
        assert_eq!(config.variable_declarator.for_keyword("let"), 1);
        assert_eq!(config.variable_declarator.for_keyword("const"), 3);
        assert_eq!(config.variable_declarator.for_keyword("using"), 1);
    }

    #[test]
    fn indent_setting_parses_cli_values() {
        assert_eq!("tab".parse::<IndentSetting>(), Ok(IndentSetting::Tab));
        assert_eq!("2".parse::<IndentSetting>(), Ok(IndentSetting::Spaces(2)));
        assert!("two".parse::<IndentSetting>().is_err());
    }

    #[test]
    fn reads_full_rule_table() {
        let overrides = overrides_from(
            r#"
[rules.indent]
indent = 2
SwitchCase = 1
VariableDeclarator = { var = 2, let = 2, const = 3 }
outerIIFEBody = 0
MemberExpression = 1
FunctionDeclaration = { parameters = "first", body = 2 }
FunctionExpression = { parameters = 1 }
"#,
        );
        let config = ResolvedConfig::resolve(&overrides);
        assert_eq!(config.unit, IndentUnit::Spaces(2));
        assert_eq!(config.switch_case, 1);
        assert_eq!(config.variable_declarator.const_, 3);
        assert_eq!(config.outer_iife_body, Some(0));
        assert_eq!(config.member_expression, Some(1));
        assert_eq!(config.function_declaration.parameters, ParameterIndent::First);
        assert_eq!(config.function_declaration.body, 2);
        assert_eq!(config.function_expression.parameters, ParameterIndent::Offset(1));
        assert_eq!(config.function_expression.body, 1);
    }

    #[test]
    fn reads_tab_and_uniform_declarator() {
        let overrides = overrides_from(
            r#"
[rules.indent]
indent = "tab"
VariableDeclarator = 2
"#,
        );
        let config = ResolvedConfig::resolve(&overrides);
        assert_eq!(config.unit, IndentUnit::Tab);
        assert_eq!(config.variable_declarator, DeclaratorOffsets::uniform(2));
    }

    #[test]
    fn malformed_values_fall_back_to_defaults() {
        let overrides = overrides_from(
            r#"
[rules.indent]
indent = "wide"
SwitchCase = -1
MemberExpression = "yes"
FunctionExpression = { parameters = "off", body = "big" }
FunctionDeclaration = 3
"#,
        );
        assert_eq!(overrides.indent, None);
        assert_eq!(overrides.switch_case, None);
        assert_eq!(overrides.member_expression, None);
        assert_eq!(overrides.function_expression, FunctionSetting::default());
        assert_eq!(overrides.function_declaration, FunctionSetting::default());
        assert_eq!(
            ResolvedConfig::resolve(&overrides),
            ResolvedConfig::default()
        );
    }
}
