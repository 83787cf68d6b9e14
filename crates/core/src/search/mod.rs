//! Search session: configuration, category table and query cache bound to
//! one catalog, with paginated execution.
//!
//! A search is a `count` followed by any number of `page` calls for the same
//! keywords. Both go through the query cache; paging never mutates a cached
//! query, it derives a fresh parameter list with the page's offset.

mod types;

pub use types::*;

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::catalog::{CatalogStore, CategoryTable, TorrentRecord};
use crate::config::{save_config, ConfigError, Configuration};
use crate::query::{build_query, BuiltQuery, QueryCache};

/// One search session over a catalog.
///
/// Changing the configuration requires `&mut self` and clears the query
/// cache before returning, so every later build sees the new options.
pub struct SearchSession {
    config: Configuration,
    categories: CategoryTable,
    cache: QueryCache,
    store: Arc<dyn CatalogStore>,
}

impl SearchSession {
    /// Create a session, loading the category table from the store.
    pub fn new(config: Configuration, store: Arc<dyn CatalogStore>) -> Result<Self, SearchError> {
        let categories = store.categories()?;
        info!(
            categories = categories.len(),
            config = %config.fingerprint(),
            "Search session ready"
        );
        Ok(Self {
            config,
            categories,
            cache: QueryCache::new(),
            store,
        })
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn categories(&self) -> &CategoryTable {
        &self.categories
    }

    /// Number of cached query builds.
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Count matches for `keywords` and report the page size to use.
    pub fn count(&self, keywords: Option<&str>) -> Result<SearchCount, SearchError> {
        let query = self.cached(keywords, true)?;
        let total = self.store.count(query.sql(), query.params())?;
        debug!(?keywords, total, page_size = query.limit(), "Counted matches");
        Ok(SearchCount {
            total,
            page_size: query.limit(),
        })
    }

    /// Fetch one page of matches. Pages start at 1.
    pub fn page(&self, keywords: Option<&str>, page: u32) -> Result<Vec<TorrentRecord>, SearchError> {
        if page < 1 {
            return Err(SearchError::InvalidPage(page));
        }
        let query = self.cached(keywords, false)?;
        let offset = u64::from(page - 1) * u64::from(query.limit());
        let params = query.params_for_offset(offset);
        debug!(?keywords, page, offset, "Fetching page");
        Ok(self.store.fetch(query.sql(), &params)?)
    }

    /// Apply in-memory option edits.
    pub fn apply_edits<I, K, V>(&mut self, edits: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in edits {
            let name = name.into();
            let value = value.into();
            debug!(option = %name, value = %value, "Editing option");
            self.config.set(name, value);
        }
        self.cache.invalidate_all();
        info!(config = %self.config.fingerprint(), "Configuration edited");
    }

    /// Replace the configuration wholesale, e.g. after re-reading its files.
    pub fn reload(&mut self, config: Configuration) {
        self.config = config;
        self.cache.invalidate_all();
        info!(config = %self.config.fingerprint(), "Configuration reloaded");
    }

    /// Persist the current configuration to `path`.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        save_config(&self.config, path)?;
        self.cache.invalidate_all();
        info!(
            path = %path.display(),
            config = %self.config.fingerprint(),
            "Configuration saved"
        );
        Ok(())
    }

    fn cached(&self, keywords: Option<&str>, count: bool) -> Result<Arc<BuiltQuery>, SearchError> {
        let query = self
            .cache
            .get_or_build(keywords, count, || build_query(keywords, &self.config, count))?;
        Ok(query)
    }
}
