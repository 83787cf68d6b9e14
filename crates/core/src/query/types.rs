//! Types for query construction.

use serde::Serialize;
use thiserror::Error;

/// A positional parameter bound to a `?` placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SqlParam {
    Text(String),
    Int(i64),
    Bool(bool),
}

impl SqlParam {
    /// Byte counts above `i64::MAX` saturate.
    pub fn from_u64(value: u64) -> Self {
        SqlParam::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<&str> for SqlParam {
    fn from(value: &str) -> Self {
        SqlParam::Text(value.to_string())
    }
}

impl From<String> for SqlParam {
    fn from(value: String) -> Self {
        SqlParam::Text(value)
    }
}

impl From<i64> for SqlParam {
    fn from(value: i64) -> Self {
        SqlParam::Int(value)
    }
}

impl From<bool> for SqlParam {
    fn from(value: bool) -> Self {
        SqlParam::Bool(value)
    }
}

/// An immutable, parameterized query.
///
/// Row queries end with `LIMIT ? OFFSET ?`; the last two parameters are a
/// template slot whose offset is always 0. Use [`BuiltQuery::params_for_offset`]
/// to get the parameters for a particular page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltQuery {
    pub(crate) sql: String,
    pub(crate) params: Vec<SqlParam>,
    pub(crate) limit: u32,
    pub(crate) count: bool,
}

impl BuiltQuery {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[SqlParam] {
        &self.params
    }

    /// Validated page size.
    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn is_count(&self) -> bool {
        self.count
    }

    /// A fresh parameter list with the offset slot set to `offset`.
    /// Count queries have no offset slot and are returned unchanged.
    pub fn params_for_offset(&self, offset: u64) -> Vec<SqlParam> {
        let mut params = self.params.clone();
        if !self.count {
            if let Some(slot) = params.last_mut() {
                *slot = SqlParam::from_u64(offset);
            }
        }
        params
    }
}

/// Errors for query construction.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("Keyword {0:?} contains non-word characters and cannot be matched as a word")]
    InvalidKeyword(String),

    #[error("Invalid size format: {0:?}")]
    InvalidSizeFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_query() -> BuiltQuery {
        BuiltQuery {
            sql: "SELECT * FROM torrents ORDER BY time desc LIMIT ? OFFSET ?".to_string(),
            params: vec!["x".into(), SqlParam::Int(30), SqlParam::Int(0)],
            limit: 30,
            count: false,
        }
    }

    #[test]
    fn test_params_for_offset_leaves_template_untouched() {
        let query = page_query();
        let params = query.params_for_offset(60);
        assert_eq!(params, vec!["x".into(), SqlParam::Int(30), SqlParam::Int(60)]);
        assert_eq!(query.params()[2], SqlParam::Int(0));
    }

    #[test]
    fn test_params_for_offset_on_count_query() {
        let query = BuiltQuery {
            sql: "SELECT count(*) FROM torrents ORDER BY time desc".to_string(),
            params: vec![SqlParam::Bool(true)],
            limit: 30,
            count: true,
        };
        assert_eq!(query.params_for_offset(90), vec![SqlParam::Bool(true)]);
    }

    #[test]
    fn test_from_u64_saturates() {
        assert_eq!(SqlParam::from_u64(5), SqlParam::Int(5));
        assert_eq!(SqlParam::from_u64(u64::MAX), SqlParam::Int(i64::MAX));
    }

    #[test]
    fn test_sql_param_serialization() {
        let params = vec![SqlParam::from("abc"), SqlParam::Int(3), SqlParam::Bool(false)];
        assert_eq!(serde_json::to_string(&params).unwrap(), r#"["abc",3,false]"#);
    }
}
