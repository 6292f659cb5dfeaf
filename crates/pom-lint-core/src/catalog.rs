//! Read-only access to the catalog of sanctioned BOMs.
//!
//! The catalog is a YAML document listing `availableBoms` (coordinates plus
//! a recommended version) and `availableRuntimes`. [`CatalogClient`] loads it
//! lazily from a URL or a local path and caches it according to its
//! [`RefreshPolicy`]; the default keeps the first successful load for the
//! lifetime of the process.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Default catalog location.
pub const DEFAULT_CATALOG_URL: &str =
    "https://raw.github.com/jboss-jdf/jdf-stack/1.0.0.Final/stacks.yaml";

/// Errors raised while loading the catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogLoadError {
    /// Reading a local catalog failed.
    #[error("failed to read catalog {}: {source}", path.display())]
    Io {
        /// Catalog path.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Fetching a remote catalog failed.
    #[error("failed to fetch catalog {url}: {message}")]
    Http {
        /// Catalog URL.
        url: String,
        /// Transport error message.
        message: String,
    },

    /// The catalog is not valid YAML or has an unexpected shape.
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// A sanctioned BOM: coordinates and the version projects should use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    /// Catalog identifier.
    #[serde(default)]
    pub id: Option<String>,
    /// groupId.
    pub group_id: String,
    /// artifactId.
    pub artifact_id: String,
    /// Recommended version.
    pub recommended_version: String,
    /// Other published versions.
    #[serde(default)]
    pub available_versions: Vec<String>,
}

/// A runtime listed in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeDescription {
    /// Catalog identifier.
    #[serde(default)]
    pub id: Option<String>,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Runtime version.
    #[serde(default)]
    pub version: Option<String>,
    /// Runtime type (e.g. `EAP`, `AS`).
    #[serde(default, rename = "type")]
    pub runtime_type: Option<String>,
    /// Download URL.
    #[serde(default)]
    pub url: Option<String>,
}

/// The loaded catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    /// Sanctioned BOMs in catalog order.
    #[serde(default)]
    pub available_boms: Vec<CatalogEntry>,
    /// Runtimes in catalog order.
    #[serde(default)]
    pub available_runtimes: Vec<RuntimeDescription>,
}

impl Catalog {
    /// Parses a catalog from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogLoadError::Parse`] on malformed input.
    pub fn from_yaml(content: &str) -> Result<Self, CatalogLoadError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Sanctioned BOMs in catalog order.
    #[must_use]
    pub fn available_entries(&self) -> &[CatalogEntry] {
        &self.available_boms
    }

    /// Runtimes in catalog order.
    #[must_use]
    pub fn available_runtimes(&self) -> &[RuntimeDescription] {
        &self.available_runtimes
    }

    /// Finds the first entry with exactly matching coordinates.
    #[must_use]
    pub fn find(&self, group_id: &str, artifact_id: &str) -> Option<&CatalogEntry> {
        self.available_boms
            .iter()
            .find(|e| e.group_id == group_id && e.artifact_id == artifact_id)
    }
}

/// Provides the catalog to checkers.
pub trait CatalogSource: Send + Sync {
    /// Returns the catalog, loading it on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded.
    fn catalog(&self) -> Result<Arc<Catalog>, CatalogLoadError>;
}

/// A catalog held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog(Arc<Catalog>);

impl StaticCatalog {
    /// Wraps an already loaded catalog.
    #[must_use]
    pub fn new(catalog: Catalog) -> Self {
        Self(Arc::new(catalog))
    }
}

impl CatalogSource for StaticCatalog {
    fn catalog(&self) -> Result<Arc<Catalog>, CatalogLoadError> {
        Ok(Arc::clone(&self.0))
    }
}

/// When a cached catalog is considered stale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RefreshPolicy {
    /// Never reload after the first successful load.
    #[default]
    Never,
    /// Reload once the cached copy is older than the period.
    Every(Duration),
}

impl RefreshPolicy {
    fn is_stale(self, loaded_at: Instant) -> bool {
        match self {
            Self::Never => false,
            Self::Every(period) => loaded_at.elapsed() >= period,
        }
    }
}

/// Where to load the catalog from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogLocation {
    /// `http://` or `https://` URL.
    Url(String),
    /// Local file, given as a path or a `file://` URL.
    Path(PathBuf),
}

impl CatalogLocation {
    /// Interprets a location string.
    #[must_use]
    pub fn parse(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            Self::Url(location.to_string())
        } else {
            let path = location.strip_prefix("file://").unwrap_or(location);
            Self::Path(PathBuf::from(path))
        }
    }
}

#[derive(Debug)]
struct Cached {
    loaded_at: Instant,
    catalog: Arc<Catalog>,
}

/// Lazily loading, caching catalog client.
#[derive(Debug)]
pub struct CatalogClient {
    location: CatalogLocation,
    refresh: RefreshPolicy,
    cache: Mutex<Option<Cached>>,
}

impl CatalogClient {
    /// Creates a client; nothing is loaded until first use.
    #[must_use]
    pub fn new(location: CatalogLocation) -> Self {
        Self {
            location,
            refresh: RefreshPolicy::default(),
            cache: Mutex::new(None),
        }
    }

    /// Creates a client from configuration.
    #[must_use]
    pub fn from_config(config: &crate::config::CatalogConfig) -> Self {
        Self::new(CatalogLocation::parse(&config.location)).refresh(config.refresh_policy())
    }

    /// Sets the refresh policy.
    #[must_use]
    pub fn refresh(mut self, refresh: RefreshPolicy) -> Self {
        self.refresh = refresh;
        self
    }

    /// Returns the catalog location.
    #[must_use]
    pub fn location(&self) -> &CatalogLocation {
        &self.location
    }

    /// Convenience accessor for the sanctioned BOMs.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded.
    pub fn available_entries(&self) -> Result<Vec<CatalogEntry>, CatalogLoadError> {
        Ok(self.catalog()?.available_entries().to_vec())
    }

    /// Convenience accessor for the runtimes.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded.
    pub fn available_runtimes(&self) -> Result<Vec<RuntimeDescription>, CatalogLoadError> {
        Ok(self.catalog()?.available_runtimes().to_vec())
    }

    fn load(&self) -> Result<Catalog, CatalogLoadError> {
        let content = match &self.location {
            CatalogLocation::Url(url) => {
                debug!("Fetching catalog from {url}");
                let response = ureq::get(url.as_str())
                    .call()
                    .map_err(|e| CatalogLoadError::Http {
                        url: url.clone(),
                        message: e.to_string(),
                    })?;
                response
                    .into_body()
                    .read_to_string()
                    .map_err(|e| CatalogLoadError::Http {
                        url: url.clone(),
                        message: e.to_string(),
                    })?
            }
            CatalogLocation::Path(path) => {
                debug!("Reading catalog from {}", path.display());
                std::fs::read_to_string(path).map_err(|source| CatalogLoadError::Io {
                    path: path.clone(),
                    source,
                })?
            }
        };
        Catalog::from_yaml(&content)
    }
}

impl CatalogSource for CatalogClient {
    fn catalog(&self) -> Result<Arc<Catalog>, CatalogLoadError> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(cached) = cache.as_ref() {
            if !self.refresh.is_stale(cached.loaded_at) {
                return Ok(Arc::clone(&cached.catalog));
            }
        }

        let catalog = Arc::new(self.load()?);
        info!(
            "Loaded catalog with {} BOM(s) and {} runtime(s)",
            catalog.available_boms.len(),
            catalog.available_runtimes.len()
        );
        *cache = Some(Cached {
            loaded_at: Instant::now(),
            catalog: Arc::clone(&catalog),
        });
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STACKS: &str = r"
availableBoms:
  - id: jboss-javaee6-with-tools
    groupId: org.jboss.bom
    artifactId: jboss-javaee-6.0-with-tools
    recommendedVersion: 1.0.4.Final
    availableVersions: [1.0.0.Final, 1.0.4.Final]
  - id: duplicate
    groupId: org.jboss.bom
    artifactId: jboss-javaee-6.0-with-tools
    recommendedVersion: 9.9.9
availableRuntimes:
  - id: jboss-as711runtime
    name: JBoss AS 7.1.1.Final
    version: 7.1.1.Final
    type: AS
";

    #[test]
    fn test_parse_catalog() {
        let catalog = Catalog::from_yaml(STACKS).expect("catalog parses");
        assert_eq!(catalog.available_entries().len(), 2);
        assert_eq!(catalog.available_runtimes()[0].runtime_type.as_deref(), Some("AS"));
    }

    #[test]
    fn test_first_match_wins() {
        let catalog = Catalog::from_yaml(STACKS).expect("catalog parses");
        let entry = catalog
            .find("org.jboss.bom", "jboss-javaee-6.0-with-tools")
            .expect("entry exists");
        assert_eq!(entry.recommended_version, "1.0.4.Final");
        assert!(catalog.find("org.jboss.bom", "other").is_none());
    }

    #[test]
    fn test_location_parse() {
        assert_eq!(
            CatalogLocation::parse("https://example.org/stacks.yaml"),
            CatalogLocation::Url("https://example.org/stacks.yaml".to_string())
        );
        assert_eq!(
            CatalogLocation::parse("file:///tmp/stacks.yaml"),
            CatalogLocation::Path(PathBuf::from("/tmp/stacks.yaml"))
        );
        assert_eq!(
            CatalogLocation::parse("stacks.yaml"),
            CatalogLocation::Path(PathBuf::from("stacks.yaml"))
        );
    }

    #[test]
    fn test_client_caches_first_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("stacks.yaml");
        std::fs::write(&path, STACKS).expect("write catalog");

        let client = CatalogClient::new(CatalogLocation::Path(path.clone()));
        let first = client.catalog().expect("first load");
        std::fs::remove_file(&path).expect("remove catalog");
        let second = client.catalog().expect("served from cache");
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_client_reloads_when_stale() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("stacks.yaml");
        std::fs::write(&path, STACKS).expect("write catalog");

        let client = CatalogClient::new(CatalogLocation::Path(path.clone()))
            .refresh(RefreshPolicy::Every(Duration::ZERO));
        client.catalog().expect("first load");
        std::fs::remove_file(&path).expect("remove catalog");
        assert!(matches!(client.catalog(), Err(CatalogLoadError::Io { .. })));
    }

    #[test]
    fn test_missing_catalog_is_an_error() {
        let client = CatalogClient::new(CatalogLocation::Path(PathBuf::from(
            "/nonexistent/stacks.yaml",
        )));
        assert!(client.available_entries().is_err());
    }
}
