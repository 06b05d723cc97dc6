//! OSE Catalog: reference pattern source
//!
//! A YAML catalog of architecture patterns with applicability rules, ranked
//! against the live confidence store.

pub mod catalog;
pub mod source;

pub use catalog::{Applicability, CatalogEntry, CatalogError, PatternCatalog};
pub use source::CatalogPatternSource;
