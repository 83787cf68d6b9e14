//! Types for paginated search.

use serde::Serialize;
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::query::QueryError;

/// Remediation shown next to keyword and store errors.
pub const SEARCH_HINT: &str =
    "Try setting base.regexp or base.word to no, or write \\x20 instead of a space.";

/// Result of a count search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SearchCount {
    /// Matching rows.
    pub total: u64,
    /// Effective page size of the matching row query.
    pub page_size: u32,
}

impl SearchCount {
    /// Number of pages needed to show every match.
    pub fn pages(&self) -> u64 {
        self.total.div_ceil(u64::from(self.page_size.max(1)))
    }
}

/// Errors for search operations.
#[derive(Debug, Clone, Error)]
pub enum SearchError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("Invalid page number: {0} (pages start at 1)")]
    InvalidPage(u32),

    #[error("Catalog query failed: {0}")]
    Store(#[from] CatalogError),
}

impl SearchError {
    /// What the user can change to make the search succeed, if anything.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            SearchError::Query(QueryError::InvalidKeyword(_)) | SearchError::Store(_) => {
                Some(SEARCH_HINT)
            }
            _ => None,
        }
    }
}
