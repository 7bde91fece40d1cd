//! Check command implementation.

use anyhow::{Context, Result};
use indent_lint_core::{Config, IndentSetting, ResolvedConfig};
use indent_lint_ts::{Analyzer, IndentEngine};
use std::path::Path;

use crate::config_resolver::ConfigSource;
use crate::OutputFormat;

/// Flags of the check command.
pub struct CheckArgs {
    pub format: OutputFormat,
    pub exclude: Vec<String>,
    pub indent: Option<IndentSetting>,
    pub fail_on_parse_error: bool,
}

/// Runs the check command.
pub fn run(path: &Path, args: CheckArgs, source: &ConfigSource) -> Result<()> {
    let config = load_config(source)?;
    let engine = engine_for(&config, args.indent);

    let mut builder = Analyzer::builder()
        .root(path)
        .engine(engine)
        .config(config)
        .excludes(args.exclude);
    if args.fail_on_parse_error {
        builder = builder.fail_on_parse_error(true);
    }

    let analyzer = builder.build().context("Failed to build analyzer")?;

    tracing::info!(
        "Checking indentation under {} ({:?})",
        analyzer.root().display(),
        engine.options().unit
    );

    let result = analyzer.analyze().context("Analysis failed")?;

    super::output::print(&result, args.format, analyzer.root())?;

    // Exit with error code if there are errors
    if result.has_errors() {
        std::process::exit(1);
    }

    Ok(())
}

fn load_config(source: &ConfigSource) -> Result<Config> {
    match source {
        ConfigSource::Default => Ok(Config::default()),
        other => {
            let p = other.path().context("resolved config has no path")?;
            if source.is_global() {
                tracing::info!("Using global config: {}", p.display());
            }
            Config::from_file(p).with_context(|| format!("Failed to load config: {}", p.display()))
        }
    }
}

/// Engine for `config`, with the `--indent` flag taking precedence.
fn engine_for(config: &Config, indent: Option<IndentSetting>) -> IndentEngine {
    let mut overrides = config.indent_overrides();
    if let Some(setting) = indent {
        overrides = overrides.indent(setting);
    }
    IndentEngine::new(ResolvedConfig::resolve(&overrides), config.severity())
}
