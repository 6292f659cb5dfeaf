//! # pom-lint-core
//!
//! Core engine for linting and fixing Maven `pom.xml` descriptors across a
//! multi-module source tree.
//!
//! This crate provides:
//!
//! - [`Document`], a position-tracked element tree where every node knows
//!   its source line
//! - [`Checker`] and [`Fixer`] traits for pluggable checks
//! - [`Walker`] for orchestrating checks and fixes over ordered descriptors
//! - [`PropertyUsageIndex`] for cross-descriptor property analysis
//! - [`Interpolator`] for `${...}` placeholder resolution
//! - [`CatalogClient`] for the sanctioned BOM catalog
//!
//! ## Example
//!
//! ```ignore
//! use pom_lint_core::Walker;
//!
//! let walker = Walker::builder()
//!     .root("./quickstarts")
//!     .checker(MyChecker::new())
//!     .build()?;
//!
//! let result = walker.check(&paths)?;
//! for violation in result.iter() {
//!     println!("{violation}");
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod catalog;
pub mod config;
mod checker;
mod context;
mod document;
mod edit;
mod interpolate;
mod model;
mod types;
mod usage;
mod walker;

pub use catalog::{
    Catalog, CatalogClient, CatalogEntry, CatalogLoadError, CatalogSource, StaticCatalog,
};
pub use checker::{CheckError, CheckScope, Checker, CheckerBox, Fixer, ProjectFindings};
pub use config::{Config, GroupRules};
pub use context::{Descriptor, DocumentContext, PassContext, ProjectContext};
pub use document::{Content, Document, DocumentError, Node, ParseError};
pub use edit::{EditError, TextEdit};
pub use interpolate::{InterpolationError, Interpolator, ValueSource};
pub use model::{DependencyDeclaration, DescriptorModel, Parent, Property};
pub use types::{CheckerNote, FixReport, LintResult, Location, Severity, Suggestion, Violation};
pub use usage::{used_property, DeclarationSite, PropertyUsageIndex};
pub use walker::{EngineError, Stage, Walker, WalkerBuilder};
