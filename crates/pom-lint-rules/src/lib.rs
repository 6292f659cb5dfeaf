//! # pom-lint-rules
//!
//! Built-in checkers and fixers for pom-lint.
//!
//! ## Available Checkers
//!
//! | Code | Name | Scope | Fix | Description |
//! |------|------|-------|-----|-------------|
//! | PL001 | `duplicate-dependency` | document | yes | Forbids repeated dependency declarations |
//! | PL002 | `duplicate-property` | document | yes | Forbids repeated property declarations |
//! | PL003 | `catalog-version` | document | yes | Pins managed dependencies to the catalog |
//! | PL004 | `unused-property` | project | yes | Forbids properties nothing references |
//! | PL005 | `style-lint` | project | no | Delegates to an external style linter |
//!
//! ## Usage
//!
//! ```ignore
//! use pom_lint_core::{Config, Walker};
//!
//! let config = Config::default();
//! let walker = Walker::builder()
//!     .root("./quickstarts")
//!     .checkers(pom_lint_rules::registry(&config))
//!     .config(config)
//!     .build()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod catalog_version;
pub mod duplicate_dependencies;
pub mod duplicate_properties;
mod registry;
pub mod style_lint;
pub mod unused_properties;

#[cfg(test)]
mod test_support;

pub use catalog_version::CatalogVersion;
pub use duplicate_dependencies::DuplicateDependencies;
pub use duplicate_properties::DuplicateProperties;
pub use registry::{all_checkers, registry, registry_with_catalog};
pub use style_lint::{
    CommandStyleLint, StyleFinding, StyleLint, StyleLintError, StyleLintExecutor,
    StyleLintRequest,
};
pub use unused_properties::UnusedProperties;

/// Re-export core types for convenience.
pub use pom_lint_core::{Checker, Fixer, Severity, Violation};
