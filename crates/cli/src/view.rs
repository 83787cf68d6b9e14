//! Text and JSON renderings of catalog records.

use serde::Serialize;

use nyaq_core::{CategoryTable, SearchCount, TorrentRecord};

const SIZE_UNITS: [char; 5] = ['B', 'K', 'M', 'G', 'T'];

/// `1536` -> `1.50K`. Units are powers of 1024, capped at T.
pub fn readable_size(size: u64) -> String {
    let mut value = size as f64;
    let mut index = 0;
    while value >= 1024.0 && index < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        index += 1;
    }
    format!("{:.2}{}", value, SIZE_UNITS[index])
}

/// Publication date as `YYYY-MM-DD` (UTC).
pub fn readable_date(record: &TorrentRecord) -> String {
    record
        .published_at()
        .map(|t| t.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

/// One line of a result list.
pub fn summary_line(index: usize, record: &TorrentRecord) -> String {
    format!(
        "{:>3}. {}  [{}, {}]",
        index,
        record.title,
        readable_size(record.size),
        readable_date(record)
    )
}

/// Full detail view of a record.
pub fn detail(record: &TorrentRecord, categories: &CategoryTable) -> String {
    let category = categories
        .name(record.category)
        .map(str::to_string)
        .unwrap_or_else(|| format!("unknown ({})", record.category));
    format!(
        "Title:    {}\nHash:     {}\nCategory: {}\nSize:     {}\nDate:     {}\nTrusted:  {}\nRemake:   {}",
        record.title,
        record.info_hash_hex(),
        category,
        readable_size(record.size),
        readable_date(record),
        yes_no(record.trusted),
        yes_no(record.remake),
    )
}

/// "Page 2 of 4 (95 results)".
pub fn page_status(page: u32, count: &SearchCount) -> String {
    format!(
        "Page {} of {} ({} result{})",
        page,
        count.pages(),
        count.total,
        if count.total == 1 { "" } else { "s" }
    )
}

#[derive(Serialize)]
struct RecordView<'a> {
    #[serde(flatten)]
    record: &'a TorrentRecord,
    category_name: Option<&'a str>,
    date: String,
}

/// A record as a single JSON line.
pub fn json_line(record: &TorrentRecord, categories: &CategoryTable) -> serde_json::Result<String> {
    serde_json::to_string(&RecordView {
        record,
        category_name: categories.name(record.category),
        date: readable_date(record),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nyaq_core::testing::fixtures;

    #[test]
    fn test_readable_size() {
        assert_eq!(readable_size(0), "0.00B");
        assert_eq!(readable_size(1023), "1023.00B");
        assert_eq!(readable_size(1536), "1.50K");
        assert_eq!(readable_size(700 * 1024 * 1024), "700.00M");
        assert_eq!(readable_size(20 << 30), "20.00G");
        assert_eq!(readable_size(3 << 50), "3072.00T");
    }

    #[test]
    fn test_summary_line() {
        let record = fixtures::record(1, "[Sub] Show - 01");
        assert_eq!(
            summary_line(4, &record),
            "  4. [Sub] Show - 01  [700.00M, 2022-11-04]"
        );
    }

    #[test]
    fn test_detail_uses_category_name() {
        let mut record = fixtures::record(0xab, "Show");
        record.trusted = true;
        let categories: CategoryTable = vec![(0x12, "Anime - English".to_string())]
            .into_iter()
            .collect();

        let text = detail(&record, &categories);
        assert!(text.contains("Hash:     ab"));
        assert!(text.contains("Category: Anime - English"));
        assert!(text.contains("Trusted:  yes"));
        assert!(text.contains("Remake:   no"));

        let text = detail(&record, &CategoryTable::default());
        assert!(text.contains("Category: unknown (18)"));
    }

    #[test]
    fn test_page_status() {
        let count = SearchCount {
            total: 95,
            page_size: 30,
        };
        assert_eq!(page_status(2, &count), "Page 2 of 4 (95 results)");
        let one = SearchCount {
            total: 1,
            page_size: 30,
        };
        assert_eq!(page_status(1, &one), "Page 1 of 1 (1 result)");
    }

    #[test]
    fn test_json_line() {
        let record = fixtures::record(2, "Show");
        let categories: CategoryTable = vec![(0x12, "Anime".to_string())].into_iter().collect();
        let line = json_line(&record, &categories).unwrap();
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["info_hash"], "02");
        assert_eq!(value["category_name"], "Anime");
        assert_eq!(value["date"], "2022-11-04");
    }
}
