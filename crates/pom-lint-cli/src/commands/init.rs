//! Init command implementation.

use anyhow::{bail, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# pom-lint configuration

[walker]
# Module directory names that are never walked (also read from .pom-lint-ignore)
ignored_modules = []

# Glob patterns, relative to the project root, excluded from discovery
exclude = ["**/target/**"]

# parallelism = 4

[catalog]
# URL or file path of the BOM catalog (YAML)
location = "https://raw.github.com/jboss-jdf/jdf-stack/1.0.0.Final/stacks.yaml"
# refresh_seconds = 3600

# Rules applied to every groupId without its own table
[defaults]
ignored_checkers = []
ignored_unused_properties = []

# [groups."org.jboss.as.quickstarts"]
# ignored_checkers = ["style-lint"]
# ignored_unused_properties = ["jboss.home"]

[checkers.duplicate-dependency]
enabled = true

[checkers.catalog-version]
enabled = true
# severity = "warning"
# exempt_groups = ["org.example.internal"]

# [checkers.style-lint]
# command = "checkstyle"
# config_location = "checkstyle.xml"
# includes = ["**/*.java"]
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    let config_path = Path::new("pom-lint.toml");

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(config_path, DEFAULT_CONFIG)?;

    println!("Created pom-lint.toml");
    println!("\nNext steps:");
    println!("  1. Edit pom-lint.toml to configure checkers and groups");
    println!("  2. Run: pom-lint check");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pom_lint_core::Config;

    #[test]
    fn default_config_parses() {
        let config = Config::parse(DEFAULT_CONFIG).expect("template should parse");
        assert!(config.is_checker_enabled("catalog-version"));
        assert_eq!(config.walker.exclude, vec!["**/target/**".to_string()]);
        assert!(config.walker.ignored_modules.is_empty());
    }
}
