//! Types for the torrent metadata catalog.

use std::collections::BTreeMap;
use std::fmt::Write;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use thiserror::Error;

/// One row of the `torrents` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TorrentRecord {
    /// Raw info hash; serialized as lowercase hex.
    #[serde(serialize_with = "serialize_hex")]
    pub info_hash: Vec<u8>,
    pub title: String,
    /// Full category id; the high nibble is the coarse category.
    pub category: i64,
    /// Total size in bytes.
    pub size: u64,
    /// Publication time, unix seconds UTC.
    pub time: i64,
    pub trusted: bool,
    pub remake: bool,
}

impl TorrentRecord {
    /// Info hash as lowercase hex.
    pub fn info_hash_hex(&self) -> String {
        hex(&self.info_hash)
    }

    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.time, 0)
    }

    /// Coarse category (high 4 bits of `category`).
    pub fn category_nibble(&self) -> i64 {
        self.category >> 4
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .fold(String::with_capacity(bytes.len() * 2), |mut out, b| {
            let _ = write!(out, "{:02x}", b);
            out
        })
}

fn serialize_hex<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex(bytes))
}

/// Category id to display name, loaded once per session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryTable {
    names: BTreeMap<i64, String>,
}

impl CategoryTable {
    pub fn new(names: BTreeMap<i64, String>) -> Self {
        Self { names }
    }

    pub fn name(&self, id: i64) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, &str)> {
        self.names.iter().map(|(id, name)| (*id, name.as_str()))
    }
}

impl FromIterator<(i64, String)> for CategoryTable {
    fn from_iter<T: IntoIterator<Item = (i64, String)>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Errors for catalog operations.
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> TorrentRecord {
        TorrentRecord {
            info_hash: vec![0x00, 0xab, 0x10, 0xff],
            title: "[Group] Show - 01 [1080p]".to_string(),
            category: 0x12,
            size: 1024 * 1024 * 700,
            time: 1_667_520_000,
            trusted: true,
            remake: false,
        }
    }

    #[test]
    fn test_info_hash_hex() {
        assert_eq!(record().info_hash_hex(), "00ab10ff");
    }

    #[test]
    fn test_category_nibble() {
        assert_eq!(record().category_nibble(), 1);
    }

    #[test]
    fn test_published_at() {
        let published = record().published_at().unwrap();
        assert_eq!(published.format("%Y-%m-%d").to_string(), "2022-11-04");
    }

    #[test]
    fn test_record_serialization() {
        let json = serde_json::to_value(record()).unwrap();
        assert_eq!(json["info_hash"], "00ab10ff");
        assert_eq!(json["category"], 0x12);
        assert_eq!(json["trusted"], true);
    }

    #[test]
    fn test_category_table_lookup() {
        let table: CategoryTable = vec![(0x10, "Anime".to_string()), (0x12, "Anime - English".to_string())]
            .into_iter()
            .collect();
        assert_eq!(table.len(), 2);
        assert_eq!(table.name(0x12), Some("Anime - English"));
        assert_eq!(table.name(0x99), None);
        assert_eq!(table.iter().next(), Some((0x10, "Anime")));
    }
}
