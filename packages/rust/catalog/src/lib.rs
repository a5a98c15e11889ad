//! Catalog storage, reconciliation, and search for Polidoc.
//!
//! The crate is organized around the [`Catalog`] store (libSQL) and the
//! [`CatalogService`] bundle that the CLI drives:
//!
//! - [`store`] — entries, file registry, content pages
//! - [`loader`] — diff-preview and atomic bulk replacement
//! - [`search`] — faceted FTS5 search
//! - [`facets`] — cached facet snapshots
//! - [`objstore`] — uploaded-workbook blob storage
//! - [`audit`] — append-only mutation log
//! - [`service`] — the bundle tying it all together

mod migrations;

pub mod audit;
pub mod facets;
pub mod loader;
pub mod objstore;
pub mod search;
pub mod service;
pub mod store;

#[cfg(test)]
pub(crate) mod testutil;

pub use audit::AuditEvent;
pub use facets::{FacetCount, FacetSnapshot, LanguageFacet};
pub use loader::{CatalogDiff, diff_entries};
pub use objstore::{LocalObjectStore, ObjectStore, attachment_key, spreadsheet_key};
pub use search::{SearchHit, SearchRequest, SearchResults, SearchScope, SearchSort};
pub use service::{CatalogService, ImportReport};
pub use store::{Catalog, CatalogInfo, EntryDetail, EntryFile, FileRecord};
