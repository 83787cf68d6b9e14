//! Translates keywords plus configuration into a parameterized catalog query.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::config::Configuration;

use super::size::{parse_size_or, DEFAULT_MAX_SIZE, DEFAULT_MIN_SIZE};
use super::types::{BuiltQuery, QueryError, SqlParam};

const SELECT_COUNT: &str = "SELECT count(*) FROM torrents";
const SELECT_ROWS: &str =
    "SELECT infohash, title, category, size, time, trusted, remake FROM torrents";

/// A token the catalog's `\w` class matches in full (Unicode-aware).
static WORD_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\w+$").expect("word token pattern is valid"));

/// Highest coarse category; anything outside 0..=15 disables the filter.
const MAX_CATEGORY: i64 = 15;

const MIN_LIMIT: i64 = 1;
const MAX_LIMIT: i64 = 80;
/// Page size used when the configured limit is out of range.
const FALLBACK_LIMIT: u32 = 40;

/// Options consulted by the builder, resolved with their fallbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    pub whole: bool,
    pub regexp: bool,
    pub word: bool,
    pub nonword: bool,
    pub category: i64,
    pub size: String,
    pub recent: i64,
    pub trusted: Option<bool>,
    pub remake: Option<bool>,
    pub order: String,
    pub limit: i64,
}

impl SearchOptions {
    pub fn resolve(config: &Configuration) -> Self {
        Self {
            whole: config.get("whole", false),
            regexp: config.get("regexp", false),
            word: config.get("word", false),
            nonword: config.get("nonword", true),
            category: config.get("category", -1),
            size: config.get("size", String::new()),
            recent: config.get("recent", -1),
            trusted: config.get("trusted", None),
            remake: config.get("remake", None),
            order: config.get("order", String::new()),
            limit: config.get("limit", -1),
        }
    }
}

/// Sortable column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderField {
    Title,
    Size,
    Time,
}

impl OrderField {
    pub fn column(self) -> &'static str {
        match self {
            OrderField::Title => "title",
            OrderField::Size => "size",
            OrderField::Time => "time",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    Asc,
    Desc,
}

impl OrderDirection {
    pub fn keyword(self) -> &'static str {
        match self {
            OrderDirection::Asc => "asc",
            OrderDirection::Desc => "desc",
        }
    }
}

/// Parse `field:direction`. Unknown parts fall back to `time` and `desc`.
pub fn parse_order(order: &str) -> (OrderField, OrderDirection) {
    let order = order.to_lowercase();
    let (field, direction) = order.split_once(':').unwrap_or(("", ""));
    let field = match field {
        "title" => OrderField::Title,
        "size" => OrderField::Size,
        _ => OrderField::Time,
    };
    let direction = match direction {
        "asc" => OrderDirection::Asc,
        _ => OrderDirection::Desc,
    };
    (field, direction)
}

/// Page size actually used: the configured limit if within 1..=80, else 40.
pub fn effective_limit(limit: i64) -> u32 {
    if (MIN_LIMIT..=MAX_LIMIT).contains(&limit) {
        limit as u32
    } else {
        FALLBACK_LIMIT
    }
}

/// Build the query for `keywords` under `config`.
///
/// Count queries project `count(*)` and carry no LIMIT/OFFSET. Row queries
/// end with `LIMIT ? OFFSET ?` bound to the effective limit and 0.
pub fn build_query(
    keywords: Option<&str>,
    config: &Configuration,
    count: bool,
) -> Result<BuiltQuery, QueryError> {
    let options = SearchOptions::resolve(config);
    let mut clauses: Vec<String> = Vec::new();
    let mut params: Vec<SqlParam> = Vec::new();

    if let Some(keywords) = keywords {
        let tokens: Vec<&str> = if options.whole {
            vec![keywords]
        } else {
            keywords.split_whitespace().collect()
        };
        for token in tokens {
            let (clause, param) = keyword_clause(token, &options)?;
            clauses.push(clause.to_string());
            params.push(param);
        }
    }

    if (0..=MAX_CATEGORY).contains(&options.category) {
        clauses.push("category >> 4 == ?".to_string());
        params.push(SqlParam::Int(options.category));
    }

    if let Some((min_size, max_size)) = size_bounds(&options.size) {
        clauses.push("size >= ?".to_string());
        params.push(SqlParam::from_u64(min_size));
        clauses.push("size <= ?".to_string());
        params.push(SqlParam::from_u64(max_size));
    }

    // The cutoff is evaluated by the store on every execution, so a cached
    // query never carries a stale "now".
    if options.recent >= 1 {
        clauses.push(format!(
            "time >= CAST(strftime('%s', 'now', '-{} days') AS INTEGER)",
            options.recent
        ));
    }

    if let Some(trusted) = options.trusted {
        clauses.push("trusted == ?".to_string());
        params.push(SqlParam::Bool(trusted));
    }
    if let Some(remake) = options.remake {
        clauses.push("remake == ?".to_string());
        params.push(SqlParam::Bool(remake));
    }

    let mut sql = String::from(if count { SELECT_COUNT } else { SELECT_ROWS });
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }

    let (field, direction) = parse_order(&options.order);
    sql.push_str(&format!(" ORDER BY {} {}", field.column(), direction.keyword()));

    let limit = effective_limit(options.limit);
    if !count {
        sql.push_str(" LIMIT ? OFFSET ?");
        params.push(SqlParam::Int(i64::from(limit)));
        params.push(SqlParam::Int(0));
    }

    debug!(sql = %sql, params = params.len(), limit, count, "Built catalog query");

    Ok(BuiltQuery {
        sql,
        params,
        limit,
        count,
    })
}

fn keyword_clause(
    token: &str,
    options: &SearchOptions,
) -> Result<(&'static str, SqlParam), QueryError> {
    if options.regexp {
        return Ok(("regexp(?, title)", SqlParam::from(token)));
    }
    if options.word {
        if !is_word(token) {
            return Err(QueryError::InvalidKeyword(token.to_string()));
        }
        return Ok(("regexp(?, title)", SqlParam::Text(format!(r"\b{}\b", token))));
    }
    if options.nonword && !token.chars().any(|c| c.is_ascii_alphabetic()) {
        return Ok(("instr(title, ?)", SqlParam::from(token)));
    }
    Ok(("instr(lower(title), ?)", SqlParam::Text(token.to_lowercase())))
}

/// Same character class as `\w` in the catalog's regexp function.
fn is_word(token: &str) -> bool {
    WORD_TOKEN.is_match(token)
}

/// `min:max` bounds, or `None` (no size filter) without a separator.
fn size_bounds(size: &str) -> Option<(u64, u64)> {
    let Some((min, max)) = size.split_once(':') else {
        if !size.is_empty() {
            warn!(size, "Size option is not min:max, size filter disabled");
        }
        return None;
    };
    Some((
        parse_size_or(min, DEFAULT_MIN_SIZE),
        parse_size_or(max, DEFAULT_MAX_SIZE),
    ))
}
