//! Explicit registry of the built-in checkers.
//!
//! Checkers are constructed once, in a fixed order, and handed to the
//! walker by value. Options come from `[checkers.<name>]` tables:
//!
//! ```toml
//! [checkers.catalog-version]
//! exempt_groups = ["org.example.internal"]
//!
//! [checkers.style-lint]
//! command = "checkstyle"
//! args = ["--exclude-regexp", "generated"]
//! config_location = "quickstarts-checkstyle.xml"
//! includes = ["**/*.java"]
//! ```

use crate::{
    catalog_version, style_lint, CatalogVersion, CommandStyleLint, DuplicateDependencies,
    DuplicateProperties, StyleLint, UnusedProperties,
};
use pom_lint_core::{CatalogClient, CatalogSource, CheckerBox, Config};
use std::sync::Arc;

/// Builds every built-in checker, loading the catalog from the configured location.
#[must_use]
pub fn registry(config: &Config) -> Vec<CheckerBox> {
    let catalog: Arc<dyn CatalogSource> = Arc::new(CatalogClient::from_config(&config.catalog));
    registry_with_catalog(config, catalog)
}

/// Builds every built-in checker over an explicit catalog source.
#[must_use]
pub fn registry_with_catalog(config: &Config, catalog: Arc<dyn CatalogSource>) -> Vec<CheckerBox> {
    let mut catalog_version = CatalogVersion::new(catalog);
    if let Some(options) = config.checker(catalog_version::NAME) {
        for group in options.get_str_array("exempt_groups") {
            catalog_version = catalog_version.exempt_group(group);
        }
    }

    vec![
        Box::new(DuplicateDependencies::new()),
        Box::new(DuplicateProperties::new()),
        Box::new(catalog_version),
        Box::new(UnusedProperties::new()),
        Box::new(style_lint_from(config)),
    ]
}

/// Returns all built-in checkers with default configuration.
#[must_use]
pub fn all_checkers() -> Vec<CheckerBox> {
    registry(&Config::default())
}

fn style_lint_from(config: &Config) -> StyleLint {
    let Some(options) = config.checker(style_lint::NAME) else {
        return StyleLint::unconfigured();
    };
    let mut checker = match options.get_str("command") {
        Some(command) => StyleLint::new(Arc::new(
            CommandStyleLint::new(command).args(options.get_str_array("args")),
        )),
        None => StyleLint::unconfigured(),
    };
    if let Some(location) = options.get_str("config_location") {
        checker = checker.config_location(location);
    }
    let includes = options.get_str_array("includes");
    if !includes.is_empty() {
        checker = checker.includes(includes);
    }
    checker
}
