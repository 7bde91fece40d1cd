//! Init command implementation.

use anyhow::{bail, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# indent-lint configuration

[analyzer]
# Root directory to analyze (default: current directory)
# root = "./src"

# Glob patterns to exclude from analysis
exclude = [
    "**/node_modules/**",
    "**/dist/**",
]

# File extensions to check
# extensions = ["ts", "mts", "cts", "tsx", "js", "jsx", "mjs", "cjs"]

# Respect .gitignore files
respect_gitignore = true

# Abort on files with syntax errors instead of skipping them
# fail_on_parse_error = false

[rules.indent]
enabled = true
# severity = "warning"

# Spaces per level, or "tab"
indent = 4

# Levels between `switch` and its `case` clauses
SwitchCase = 0

# Continuation declarators, as one value or per keyword
VariableDeclarator = 1
# VariableDeclarator = { var = 2, let = 2, const = 3 }

# Body levels of a top-level immediately-invoked function
# outerIIFEBody = 0

# Levels for chained `.member` lines (unset: not checked)
# MemberExpression = 1

# FunctionDeclaration = { parameters = "first", body = 1 }
# FunctionExpression = { parameters = 2, body = 1 }
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    let config_path = Path::new("indent-lint.toml");
    write_config(config_path, force)?;

    println!("Created indent-lint.toml");
    println!("\nNext steps:");
    println!("  1. Edit indent-lint.toml to match your style");
    println!("  2. Run: indent-lint check");

    Ok(())
}

fn write_config(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(config_path, DEFAULT_CONFIG)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use indent_lint_core::{Config, IndentUnit, ResolvedConfig};
    use tempfile::TempDir;

    #[test]
    fn default_config_resolves_to_defaults() {
        let config = Config::parse(DEFAULT_CONFIG).unwrap();
        assert!(config.is_enabled());
        assert_eq!(config.resolved_options(), ResolvedConfig::default());
        assert_eq!(config.resolved_options().unit, IndentUnit::Spaces(4));
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("indent-lint.toml");
        std::fs::write(&path, "# mine\n").unwrap();

        assert!(write_config(&path, false).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# mine\n");

        write_config(&path, true).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG);
    }
}
