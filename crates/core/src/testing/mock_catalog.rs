//! Mock catalog store for testing.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::catalog::{CatalogError, CatalogStore, CategoryTable, TorrentRecord};
use crate::query::SqlParam;

/// A recorded statement execution for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutedQuery {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

/// Mock implementation of the CatalogStore trait.
///
/// Provides controllable behavior for testing:
/// - Return a configurable count and row set
/// - Record every executed statement with its parameters
/// - Simulate store failures
///
/// Row queries are answered from the configured rows, windowed by the
/// trailing `LIMIT ? OFFSET ?` parameters, so paging behaves like a real
/// store with a stable order.
///
/// # Example
///
/// ```rust,ignore
/// use nyaq_core::testing::{MockCatalog, fixtures};
///
/// let catalog = MockCatalog::new();
/// catalog.set_rows(vec![fixtures::record(1, "[Sub] Show - 01")]);
///
/// let session = SearchSession::new(Configuration::default(), Arc::new(catalog.clone()))?;
/// session.page(Some("show"), 1)?;
/// assert_eq!(catalog.executed().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockCatalog {
    /// Value returned by count queries.
    count: Arc<Mutex<u64>>,
    /// Rows served to row queries.
    rows: Arc<Mutex<Vec<TorrentRecord>>>,
    categories: Arc<Mutex<CategoryTable>>,
    /// Recorded executions.
    executed: Arc<Mutex<Vec<ExecutedQuery>>>,
    /// If set, the next call will fail with this message.
    next_error: Arc<Mutex<Option<String>>>,
    /// If set, the next row query will fail with this message.
    next_fetch_error: Arc<Mutex<Option<String>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockCatalog {
    /// Create a new mock catalog with no rows and no categories.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_count(&self, count: u64) {
        *lock(&self.count) = count;
    }

    pub fn set_rows(&self, rows: Vec<TorrentRecord>) {
        *lock(&self.rows) = rows;
    }

    pub fn set_categories(&self, categories: Vec<(i64, String)>) {
        *lock(&self.categories) = categories.into_iter().collect();
    }

    /// Configure the next call to fail with a database error.
    pub fn fail_next(&self, message: &str) {
        *lock(&self.next_error) = Some(message.to_string());
    }

    /// Configure the next row query to fail, leaving counts untouched.
    pub fn fail_next_fetch(&self, message: &str) {
        *lock(&self.next_fetch_error) = Some(message.to_string());
    }

    /// Get recorded executions, oldest first.
    pub fn executed(&self) -> Vec<ExecutedQuery> {
        lock(&self.executed).clone()
    }

    pub fn clear_executed(&self) {
        lock(&self.executed).clear();
    }

    fn check_error(&self) -> Result<(), CatalogError> {
        match lock(&self.next_error).take() {
            Some(message) => Err(CatalogError::Database(message)),
            None => Ok(()),
        }
    }

    fn record(&self, sql: &str, params: &[SqlParam]) {
        lock(&self.executed).push(ExecutedQuery {
            sql: sql.to_string(),
            params: params.to_vec(),
        });
    }
}

fn window(params: &[SqlParam]) -> Option<(usize, usize)> {
    match params {
        [.., SqlParam::Int(limit), SqlParam::Int(offset)] => Some((
            usize::try_from(*limit).ok()?,
            usize::try_from(*offset).ok()?,
        )),
        _ => None,
    }
}

impl CatalogStore for MockCatalog {
    fn count(&self, sql: &str, params: &[SqlParam]) -> Result<u64, CatalogError> {
        self.check_error()?;
        self.record(sql, params);
        Ok(*lock(&self.count))
    }

    fn fetch(&self, sql: &str, params: &[SqlParam]) -> Result<Vec<TorrentRecord>, CatalogError> {
        self.check_error()?;
        if let Some(message) = lock(&self.next_fetch_error).take() {
            return Err(CatalogError::Database(message));
        }
        self.record(sql, params);

        let rows = lock(&self.rows);
        let rows = match window(params) {
            Some((limit, offset)) if sql.ends_with("LIMIT ? OFFSET ?") => {
                rows.iter().skip(offset).take(limit).cloned().collect()
            }
            _ => rows.clone(),
        };
        Ok(rows)
    }

    fn categories(&self) -> Result<CategoryTable, CatalogError> {
        self.check_error()?;
        Ok(lock(&self.categories).clone())
    }
}
