//! SQLite-backed torrent catalog implementation.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use regex::{Regex, RegexBuilder};
use rusqlite::functions::FunctionFlags;
use rusqlite::types::{ToSql, ToSqlOutput};
use rusqlite::{params_from_iter, Connection, OpenFlags};
use tracing::{debug, info};

use super::{CatalogError, CatalogStore, CategoryTable, TorrentRecord};
use crate::query::SqlParam;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Schema of a catalog file. Only used to create in-memory catalogs; real
/// catalogs are opened read-only.
pub const CATALOG_SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS categories (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS torrents (
        infohash BLOB PRIMARY KEY,
        title TEXT NOT NULL,
        category INTEGER NOT NULL,
        size INTEGER NOT NULL,
        time INTEGER NOT NULL,
        trusted BOOLEAN NOT NULL DEFAULT 0,
        remake BOOLEAN NOT NULL DEFAULT 0
    );

    CREATE INDEX IF NOT EXISTS idx_torrents_time ON torrents(time);
    CREATE INDEX IF NOT EXISTS idx_torrents_size ON torrents(size);
"#;

/// SQLite-backed torrent catalog.
pub struct SqliteCatalog {
    conn: Mutex<Connection>,
}

impl SqliteCatalog {
    /// Open an existing catalog file read-only.
    pub fn open(path: &Path) -> Result<Self, CatalogError> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| CatalogError::Database(format!("{}: {}", path.display(), e)))?;
        info!(path = %path.display(), "Opened catalog");
        Self::from_connection(conn)
    }

    /// Create an empty in-memory catalog with the schema applied (useful for testing).
    pub fn in_memory() -> Result<Self, CatalogError> {
        let conn =
            Connection::open_in_memory().map_err(|e| CatalogError::Database(e.to_string()))?;
        conn.execute_batch(CATALOG_SCHEMA)
            .map_err(|e| CatalogError::Database(e.to_string()))?;
        Self::from_connection(conn)
    }

    /// Wrap an open connection, registering the `regexp` function on it.
    pub fn from_connection(conn: Connection) -> Result<Self, CatalogError> {
        register_regexp(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, CatalogError> {
        self.conn
            .lock()
            .map_err(|_| CatalogError::Internal("catalog connection lock poisoned".to_string()))
    }

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<TorrentRecord> {
        let size: i64 = row.get(3)?;
        Ok(TorrentRecord {
            info_hash: row.get(0)?,
            title: row.get(1)?,
            category: row.get(2)?,
            size: u64::try_from(size).unwrap_or(0),
            time: row.get(4)?,
            trusted: row.get(5)?,
            remake: row.get(6)?,
        })
    }
}

impl CatalogStore for SqliteCatalog {
    fn count(&self, sql: &str, params: &[SqlParam]) -> Result<u64, CatalogError> {
        let conn = self.lock()?;
        debug!(sql, ?params, "Executing count query");

        let mut stmt = conn
            .prepare_cached(sql)
            .map_err(|e| CatalogError::Database(e.to_string()))?;
        let total: i64 = stmt
            .query_row(params_from_iter(params.iter()), |row| row.get(0))
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        Ok(u64::try_from(total).unwrap_or(0))
    }

    fn fetch(&self, sql: &str, params: &[SqlParam]) -> Result<Vec<TorrentRecord>, CatalogError> {
        let conn = self.lock()?;
        debug!(sql, ?params, "Executing row query");

        let mut stmt = conn
            .prepare_cached(sql)
            .map_err(|e| CatalogError::Database(e.to_string()))?;
        let rows = stmt
            .query_map(params_from_iter(params.iter()), Self::row_to_record)
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row.map_err(|e| CatalogError::Database(e.to_string()))?);
        }
        Ok(records)
    }

    fn categories(&self) -> Result<CategoryTable, CatalogError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT id, name FROM categories")
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        let mut names = Vec::new();
        for row in rows {
            names.push(row.map_err(|e| CatalogError::Database(e.to_string()))?);
        }
        Ok(names.into_iter().collect())
    }
}

impl ToSql for SqlParam {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            SqlParam::Text(s) => s.to_sql(),
            SqlParam::Int(i) => i.to_sql(),
            SqlParam::Bool(b) => b.to_sql(),
        }
    }
}

/// `regexp(pattern, text)`: case-insensitive search of `text` for `pattern`.
///
/// The compiled pattern is kept as auxiliary data on the statement, so it is
/// compiled once per execution rather than once per row.
fn register_regexp(conn: &Connection) -> Result<(), CatalogError> {
    conn.create_scalar_function(
        "regexp",
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let pattern: Arc<Regex> =
                ctx.get_or_create_aux(0, |value| -> Result<Regex, BoxError> {
                    Ok(RegexBuilder::new(value.as_str()?)
                        .case_insensitive(true)
                        .build()?)
                })?;
            let text: Option<String> = ctx.get(1)?;
            Ok(text.is_some_and(|text| pattern.is_match(&text)))
        },
    )
    .map_err(|e| CatalogError::Database(e.to_string()))
}
