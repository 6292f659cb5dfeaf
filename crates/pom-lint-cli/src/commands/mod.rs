//! Subcommand implementations.

pub mod check;
pub mod discover;
pub mod fix;
pub mod init;
pub mod list_rules;
pub mod output;

use anyhow::Result;
use pom_lint_core::{CheckerBox, EngineError, Walker};
use std::path::{Path, PathBuf};

/// Flags shared by `check` and `fix`.
#[derive(Debug, Default)]
pub struct RunOptions {
    /// Comma-separated checker names or codes.
    pub checkers: Option<String>,
    /// Extra discovery exclude patterns.
    pub exclude: Vec<String>,
    /// Recommended BOM version override.
    pub bom_version: Option<String>,
}

/// A configured walker together with the descriptors it should visit.
pub struct Prepared {
    /// Walker over the project root.
    pub walker: Walker,
    /// Discovered descriptors, sorted.
    pub descriptors: Vec<PathBuf>,
}

/// Resolves config, discovers descriptors and builds the walker.
pub fn prepare(path: &Path, options: RunOptions, config_path: Option<&Path>) -> Result<Prepared> {
    let config = crate::config_resolver::resolve(path, config_path).load()?;

    let mut exclude = config.walker.exclude.clone();
    exclude.extend(options.exclude);
    let descriptors = discover::descriptors(path, &exclude)?;
    let ignored = discover::ignore_file(path)?;

    let checkers = select(pom_lint_rules::registry(&config), options.checkers.as_deref());

    let walker = Walker::builder()
        .root(path)
        .checkers(checkers)
        .ignore_modules(ignored)
        .recommended_version(options.bom_version)
        .config(config)
        .build()
        .unwrap_or_else(|err| fail(err));

    Ok(Prepared {
        walker,
        descriptors,
    })
}

/// Keeps the checkers named in a comma-separated filter, by name or code.
#[must_use]
pub fn select(checkers: Vec<CheckerBox>, filter: Option<&str>) -> Vec<CheckerBox> {
    let Some(filter) = filter else {
        return checkers;
    };
    let wanted: Vec<&str> = filter
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    for name in &wanted {
        if !checkers.iter().any(|c| c.name() == *name || c.code() == *name) {
            tracing::warn!("Unknown checker: {}", name);
        }
    }

    checkers
        .into_iter()
        .filter(|c| wanted.contains(&c.name()) || wanted.contains(&c.code()))
        .collect()
}

/// Renders an engine failure as a diagnostic and exits with status 2.
pub fn fail(err: EngineError) -> ! {
    eprintln!("{:?}", miette::Report::new(err));
    std::process::exit(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pom_lint_core::{Config, StaticCatalog};
    use std::sync::Arc;

    fn builtins() -> Vec<CheckerBox> {
        let catalog = Arc::new(StaticCatalog::default());
        pom_lint_rules::registry_with_catalog(&Config::default(), catalog)
    }

    #[test]
    fn no_filter_keeps_everything() {
        assert_eq!(select(builtins(), None).len(), builtins().len());
    }

    #[test]
    fn filter_accepts_names_and_codes() {
        let names: Vec<&str> = select(builtins(), Some("duplicate-property, PL004"))
            .iter()
            .map(|c| c.name())
            .collect();
        assert_eq!(names, vec!["duplicate-property", "unused-property"]);
    }

    #[test]
    fn unknown_names_select_nothing() {
        assert!(select(builtins(), Some("no-such-checker")).is_empty());
    }
}
