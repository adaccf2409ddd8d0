//! Catalog Store: canonical parts, colors and set templates.
//!
//! Reference data only. Records arrive from an external provider through
//! [`InMemoryCatalog::refresh`] and are never mutated by ledger operations.

pub mod model;
pub mod provider;
pub mod store;

pub use model::{CanonicalColor, CanonicalPart, CatalogSnapshot, Rgb, SetTemplate};
pub use provider::CatalogProvider;
pub use store::{InMemoryCatalog, RefreshSummary};
