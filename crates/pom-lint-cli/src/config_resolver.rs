//! Locating and loading `pom-lint.toml`.
//!
//! First match wins:
//!
//! 1. `--config <file>`
//! 2. `pom-lint.toml`, then `.pom-lint.toml`, in the project root
//! 3. `config.toml` in `$POM_LINT_CONFIG_DIR`, or in `~/.pom-lint/` when unset
//! 4. built-in defaults

use anyhow::{Context, Result};
use pom_lint_core::Config;
use std::path::{Path, PathBuf};

/// Project-level config file names, checked in order.
pub const PROJECT_CONFIG_NAMES: &[&str] = &["pom-lint.toml", ".pom-lint.toml"];

const GLOBAL_CONFIG_NAME: &str = "config.toml";

const CONFIG_DIR_ENV: &str = "POM_LINT_CONFIG_DIR";

/// Where the configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Given with `--config`.
    Explicit(PathBuf),
    /// Found in the project root.
    Project(PathBuf),
    /// Found in the user-wide config directory.
    Global(PathBuf),
    /// Nothing found.
    Default,
}

impl ConfigSource {
    /// Returns the config file path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Reads and parses the config, or returns defaults.
    pub fn load(&self) -> Result<Config> {
        let Some(path) = self.path() else {
            tracing::debug!("No config file found, using defaults");
            return Ok(Config::default());
        };
        if matches!(self, Self::Global(_)) {
            tracing::info!("Using global config: {}", path.display());
        }
        Config::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))
    }
}

/// Resolves the config for a project root.
#[must_use]
pub fn resolve(project_dir: &Path, explicit: Option<&Path>) -> ConfigSource {
    resolve_in(project_dir, explicit, global_config_dir())
}

fn resolve_in(
    project_dir: &Path,
    explicit: Option<&Path>,
    global_dir: Option<PathBuf>,
) -> ConfigSource {
    if let Some(path) = explicit {
        return ConfigSource::Explicit(path.to_path_buf());
    }

    if let Some(found) = PROJECT_CONFIG_NAMES
        .iter()
        .map(|name| project_dir.join(name))
        .find(|candidate| candidate.is_file())
    {
        tracing::debug!("Found project config: {}", found.display());
        return ConfigSource::Project(found);
    }

    global_dir
        .map(|dir| dir.join(GLOBAL_CONFIG_NAME))
        .filter(|candidate| candidate.is_file())
        .map_or(ConfigSource::Default, |found| {
            tracing::debug!("Found global config: {}", found.display());
            ConfigSource::Global(found)
        })
}

fn global_config_dir() -> Option<PathBuf> {
    match std::env::var_os(CONFIG_DIR_ENV) {
        Some(dir) => Some(PathBuf::from(dir)),
        None => home::home_dir().map(|home| home.join(".pom-lint")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn dir_with(files: &[&str]) -> TempDir {
        let dir = TempDir::new().expect("tempdir");
        for name in files {
            fs::write(dir.path().join(name), "").expect("write config");
        }
        dir
    }

    #[test]
    fn explicit_path_is_trusted_as_given() {
        let project = dir_with(&["pom-lint.toml"]);
        let explicit = Path::new("/nowhere/custom.toml");
        assert_eq!(
            resolve_in(project.path(), Some(explicit), None),
            ConfigSource::Explicit(explicit.to_path_buf())
        );
    }

    #[test]
    fn plain_name_preferred_over_dotfile() {
        let project = dir_with(&["pom-lint.toml", ".pom-lint.toml"]);
        assert_eq!(
            resolve_in(project.path(), None, None),
            ConfigSource::Project(project.path().join("pom-lint.toml"))
        );

        let dotted = dir_with(&[".pom-lint.toml"]);
        assert_eq!(
            resolve_in(dotted.path(), None, None),
            ConfigSource::Project(dotted.path().join(".pom-lint.toml"))
        );
    }

    #[test]
    fn global_used_only_without_project_config() {
        let global = dir_with(&["config.toml"]);
        let bare = dir_with(&[]);
        assert_eq!(
            resolve_in(bare.path(), None, Some(global.path().to_path_buf())),
            ConfigSource::Global(global.path().join("config.toml"))
        );

        let project = dir_with(&["pom-lint.toml"]);
        assert!(matches!(
            resolve_in(project.path(), None, Some(global.path().to_path_buf())),
            ConfigSource::Project(_)
        ));
    }

    #[test]
    fn defaults_when_nothing_found() {
        let project = dir_with(&[]);
        let empty_global = dir_with(&[]);
        assert_eq!(
            resolve_in(project.path(), None, Some(empty_global.path().to_path_buf())),
            ConfigSource::Default
        );
        assert!(ConfigSource::Default.path().is_none());
    }

    #[test]
    fn load_reads_project_file() {
        let project = TempDir::new().expect("tempdir");
        fs::write(
            project.path().join("pom-lint.toml"),
            "[walker]\nignored_modules = [\"template\"]\n",
        )
        .expect("write config");

        let config = resolve_in(project.path(), None, None)
            .load()
            .expect("config should load");
        assert_eq!(config.walker.ignored_modules, vec!["template".to_string()]);
    }

    #[test]
    fn load_reports_missing_explicit_file() {
        let source = ConfigSource::Explicit(PathBuf::from("/nowhere/pom-lint.toml"));
        let err = source.load().expect_err("missing file should fail");
        assert!(err.to_string().contains("/nowhere/pom-lint.toml"));
    }
}
