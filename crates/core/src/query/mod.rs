//! Query construction: keywords and configuration in, parameterized SQL out.
//!
//! Builds are pure functions of their inputs and are memoized per
//! (keywords, count-mode) pair in a [`QueryCache`].

mod builder;
mod cache;
mod size;
mod types;

pub use builder::{
    build_query, effective_limit, parse_order, OrderDirection, OrderField, SearchOptions,
};
pub use cache::{CacheKey, QueryCache, QUERY_CACHE_CAPACITY};
pub use size::{parse_size, parse_size_or, DEFAULT_MAX_SIZE, DEFAULT_MIN_SIZE};
pub use types::*;
