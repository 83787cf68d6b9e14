//! Torrent catalog - the read-only store of torrent metadata being searched.
//!
//! The catalog exposes a `torrents` table and a `categories` table. Queries
//! arrive fully built from [`crate::query`]; the store only executes them.

mod sqlite;
mod types;

pub use sqlite::{SqliteCatalog, CATALOG_SCHEMA};
pub use types::*;

use crate::query::SqlParam;

/// Trait for torrent catalog storage.
pub trait CatalogStore: Send + Sync {
    /// Execute a `count(*)` query.
    fn count(&self, sql: &str, params: &[SqlParam]) -> Result<u64, CatalogError>;

    /// Execute a row query projecting the seven `torrents` columns in order.
    fn fetch(&self, sql: &str, params: &[SqlParam]) -> Result<Vec<TorrentRecord>, CatalogError>;

    /// Load the category id to name mapping.
    fn categories(&self) -> Result<CategoryTable, CatalogError>;
}
