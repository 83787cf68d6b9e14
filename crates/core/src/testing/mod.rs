//! Testing utilities: a mock catalog store and catalog fixtures.
//!
//! # Example
//!
//! ```rust,ignore
//! use nyaq_core::testing::fixtures;
//!
//! let catalog = fixtures::seeded_catalog(
//!     &[fixtures::record(1, "[Sub] Show - 01 [1080p]")],
//!     &[(0x10, "Anime")],
//! )?;
//! ```

mod mock_catalog;

pub use mock_catalog::{ExecutedQuery, MockCatalog};

/// Test fixtures and helper functions.
pub mod fixtures {
    use rusqlite::{params, Connection};

    use crate::catalog::{CatalogError, SqliteCatalog, TorrentRecord, CATALOG_SCHEMA};

    /// Base publication time of fixture records (2022-11-04 00:00 UTC).
    pub const BASE_TIME: i64 = 1_667_520_000;

    /// Create a test record with reasonable defaults. `id` becomes the
    /// one-byte info hash and orders the publication time.
    pub fn record(id: u8, title: &str) -> TorrentRecord {
        TorrentRecord {
            info_hash: vec![id],
            title: title.to_string(),
            category: 0x12,
            size: 1024 * 1024 * 700, // 700 MiB
            time: BASE_TIME + i64::from(id) * 60,
            trusted: false,
            remake: false,
        }
    }

    /// Create an in-memory SQLite catalog holding `records` and `categories`.
    pub fn seeded_catalog(
        records: &[TorrentRecord],
        categories: &[(i64, &str)],
    ) -> Result<SqliteCatalog, CatalogError> {
        let db_err = |e: rusqlite::Error| CatalogError::Database(e.to_string());

        let conn = Connection::open_in_memory().map_err(db_err)?;
        conn.execute_batch(CATALOG_SCHEMA).map_err(db_err)?;

        for (id, name) in categories {
            conn.execute(
                "INSERT INTO categories (id, name) VALUES (?, ?)",
                params![id, name],
            )
            .map_err(db_err)?;
        }

        for record in records {
            conn.execute(
                "INSERT INTO torrents (infohash, title, category, size, time, trusted, remake)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
                params![
                    record.info_hash,
                    record.title,
                    record.category,
                    i64::try_from(record.size).unwrap_or(i64::MAX),
                    record.time,
                    record.trusted,
                    record.remake,
                ],
            )
            .map_err(db_err)?;
        }

        SqliteCatalog::from_connection(conn)
    }
}
