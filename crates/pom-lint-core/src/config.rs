//! Configuration types for pom-lint.

use crate::catalog::{RefreshPolicy, DEFAULT_CATALOG_URL};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration for pom-lint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Walker configuration.
    #[serde(default)]
    pub walker: WalkerConfig,

    /// Catalog location and cache policy.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Per-checker configurations, keyed by checker name.
    #[serde(default)]
    pub checkers: HashMap<String, CheckerConfig>,

    /// Rules applied to groups without an entry in `groups`.
    #[serde(default)]
    pub defaults: GroupRules,

    /// Per-group rules, keyed by groupId.
    #[serde(default)]
    pub groups: HashMap<String, GroupRules>,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Checks if a checker is enabled.
    #[must_use]
    pub fn is_checker_enabled(&self, checker_name: &str) -> bool {
        self.checkers
            .get(checker_name)
            .map_or(true, |c| c.enabled.unwrap_or(true))
    }

    /// Gets the severity override for a checker.
    #[must_use]
    pub fn checker_severity(&self, checker_name: &str) -> Option<crate::Severity> {
        self.checkers.get(checker_name).and_then(|c| c.severity)
    }

    /// Gets the configuration of a checker, if any.
    #[must_use]
    pub fn checker(&self, checker_name: &str) -> Option<&CheckerConfig> {
        self.checkers.get(checker_name)
    }

    /// Returns the rules for a group, falling back to `defaults`.
    #[must_use]
    pub fn rules_for(&self, group_id: Option<&str>) -> &GroupRules {
        group_id
            .and_then(|g| self.groups.get(g))
            .unwrap_or(&self.defaults)
    }
}

/// Walker-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WalkerConfig {
    /// Module directory names that are never walked.
    #[serde(default)]
    pub ignored_modules: Vec<String>,

    /// Glob patterns excluded from descriptor discovery.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Maximum number of descriptors parsed in parallel.
    #[serde(default)]
    pub parallelism: Option<usize>,
}

/// Catalog configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// URL, `file://` URL or path of the catalog YAML.
    #[serde(default = "default_catalog_location")]
    pub location: String,

    /// Reload period in seconds; absent means never reload.
    #[serde(default)]
    pub refresh_seconds: Option<u64>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            location: default_catalog_location(),
            refresh_seconds: None,
        }
    }
}

impl CatalogConfig {
    /// Cache policy described by this configuration.
    #[must_use]
    pub fn refresh_policy(&self) -> RefreshPolicy {
        self.refresh_seconds
            .map_or(RefreshPolicy::Never, |s| RefreshPolicy::Every(Duration::from_secs(s)))
    }
}

fn default_catalog_location() -> String {
    DEFAULT_CATALOG_URL.to_string()
}

/// Per-checker configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckerConfig {
    /// Whether this checker is enabled.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Severity override for this checker.
    #[serde(default)]
    pub severity: Option<crate::Severity>,

    /// Checker-specific options as key-value pairs.
    #[serde(flatten)]
    pub options: HashMap<String, toml::Value>,
}

impl CheckerConfig {
    /// Gets a string option.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(|v| v.as_str())
    }

    /// Gets a string array option.
    #[must_use]
    pub fn get_str_array(&self, key: &str) -> Vec<String> {
        self.options
            .get(key)
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Rules for one group of descriptors (keyed by groupId).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRules {
    /// Checker names that must not run for this group.
    #[serde(default)]
    pub ignored_checkers: Vec<String>,

    /// Property names never reported as unused.
    #[serde(default)]
    pub ignored_unused_properties: Vec<String>,

    /// Glob patterns excluded from style linting.
    #[serde(default)]
    pub excludes: Vec<String>,

    /// Extra exclude patterns per checker name.
    #[serde(default)]
    pub checker_excludes: HashMap<String, Vec<String>>,

    /// License header file handed to the style linter.
    #[serde(default)]
    pub header_location: Option<String>,
}

impl GroupRules {
    /// Whether the named checker is suppressed for this group.
    #[must_use]
    pub fn is_checker_ignored(&self, checker_name: &str) -> bool {
        self.ignored_checkers.iter().any(|c| c == checker_name)
    }

    /// Whether a property is exempt from the unused-property check.
    #[must_use]
    pub fn is_property_ignored(&self, property: &str) -> bool {
        self.ignored_unused_properties.iter().any(|p| p == property)
    }

    /// Extra exclude patterns for the named checker.
    #[must_use]
    pub fn checker_specific_excludes(&self, checker_name: &str) -> &[String] {
        self.checker_excludes
            .get(checker_name)
            .map_or(&[], Vec::as_slice)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.checkers.is_empty());
        assert_eq!(config.catalog.location, DEFAULT_CATALOG_URL);
        assert_eq!(config.catalog.refresh_policy(), RefreshPolicy::Never);
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[walker]
ignored_modules = ["legacy-quickstart"]
parallelism = 4

[catalog]
location = "file:///srv/stacks.yaml"
refresh_seconds = 60

[checkers.duplicate-property]
enabled = false

[checkers.style-lint]
severity = "warning"
command = "checkstyle"
args = ["-c", "checkstyle.xml"]

[defaults]
ignored_unused_properties = ["jboss.home"]

[groups."org.jboss.quickstarts.eap"]
ignored_checkers = ["unused-property"]
excludes = ["**/target/**"]
header_location = "header.txt"

[groups."org.jboss.quickstarts.eap".checker_excludes]
style-lint = ["**/*.xml"]
"#;

        let config = Config::parse(toml).expect("Failed to parse");
        assert_eq!(config.walker.ignored_modules, vec!["legacy-quickstart"]);
        assert_eq!(config.walker.parallelism, Some(4));
        assert_eq!(
            config.catalog.refresh_policy(),
            RefreshPolicy::Every(Duration::from_secs(60))
        );
        assert!(!config.is_checker_enabled("duplicate-property"));
        assert!(config.is_checker_enabled("unused-property"));
        assert_eq!(
            config.checker_severity("style-lint"),
            Some(crate::Severity::Warning)
        );

        let style = config.checker("style-lint").expect("style-lint config");
        assert_eq!(style.get_str("command"), Some("checkstyle"));
        assert_eq!(style.get_str_array("args"), vec!["-c", "checkstyle.xml"]);

        let eap = config.rules_for(Some("org.jboss.quickstarts.eap"));
        assert!(eap.is_checker_ignored("unused-property"));
        assert!(!eap.is_checker_ignored("duplicate-dependency"));
        assert_eq!(eap.checker_specific_excludes("style-lint"), ["**/*.xml"]);
        assert!(eap.checker_specific_excludes("other").is_empty());
    }

    #[test]
    fn test_unknown_group_falls_back_to_defaults() {
        let config = Config::parse(
            r#"
[defaults]
ignored_unused_properties = ["jboss.home"]
"#,
        )
        .expect("Failed to parse");
        assert!(config.rules_for(Some("org.other")).is_property_ignored("jboss.home"));
        assert!(config.rules_for(None).is_property_ignored("jboss.home"));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            Config::parse("[walker"),
            Err(ConfigError::Parse { .. })
        ));
    }
}
