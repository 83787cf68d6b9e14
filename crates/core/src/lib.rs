//! Keyword and filter search over a local torrent metadata catalog.
//!
//! Configuration plus an optional keyword string becomes a parameterized
//! query ([`query`]), memoized per search and executed page by page against
//! a read-only catalog ([`catalog`]) by a [`SearchSession`].

pub mod catalog;
pub mod config;
pub mod query;
pub mod search;
pub mod testing;

pub use catalog::{CatalogError, CatalogStore, CategoryTable, SqliteCatalog, TorrentRecord};
pub use config::{
    load_config_from_str, save_config, validate_config, ConfigDiagnostic, ConfigError,
    ConfigSource, Configuration, OptionKind, OptionSpec, CONFIG_NAME, OPTION_TABLE,
};
pub use query::{build_query, parse_size, BuiltQuery, QueryCache, QueryError, SqlParam};
pub use search::{SearchCount, SearchError, SearchSession};
