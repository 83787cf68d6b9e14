//! Human-readable byte sizes such as `20G` or `512k`.

use tracing::debug;

use super::QueryError;

/// Lower size bound used when the configured minimum is unreadable.
pub const DEFAULT_MIN_SIZE: u64 = 0;

/// Upper size bound used when the configured maximum is unreadable (16 GiB).
pub const DEFAULT_MAX_SIZE: u64 = 1 << 34;

/// Parse `<digits><unit>` where unit is one of b, k, m, g, t (any case).
/// Units are powers of 1024.
pub fn parse_size(text: &str) -> Result<u64, QueryError> {
    let invalid = || QueryError::InvalidSizeFormat(text.to_string());

    let lower = text.to_ascii_lowercase();
    let unit = lower.chars().last().ok_or_else(invalid)?;
    let digits = &lower[..lower.len() - unit.len_utf8()];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let shift = match unit {
        'b' => 0,
        'k' => 10,
        'm' => 20,
        'g' => 30,
        't' => 40,
        _ => return Err(invalid()),
    };
    let number: u64 = digits.parse().map_err(|_| invalid())?;
    number.checked_mul(1u64 << shift).ok_or_else(invalid)
}

/// Parse a size, substituting `default` when the text is malformed.
pub fn parse_size_or(text: &str, default: u64) -> u64 {
    parse_size(text).unwrap_or_else(|e| {
        debug!(error = %e, default, "Size falls back to default");
        default
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_units() {
        assert_eq!(parse_size("0B").unwrap(), 0);
        assert_eq!(parse_size("512b").unwrap(), 512);
        assert_eq!(parse_size("3k").unwrap(), 3 * 1024);
        assert_eq!(parse_size("7M").unwrap(), 7 << 20);
        assert_eq!(parse_size("20G").unwrap(), 20 * (1 << 30));
        assert_eq!(parse_size("2t").unwrap(), 2 << 40);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for text in ["", "G", "bad", "20", "20GB", "-1G", "1.5G", " 20G", "20x", "２G"] {
            assert!(
                matches!(parse_size(text), Err(QueryError::InvalidSizeFormat(_))),
                "{text:?}"
            );
        }
    }

    #[test]
    fn test_parse_rejects_overflow() {
        assert!(parse_size("99999999999999999999b").is_err());
        assert!(parse_size("16777216t").is_err());
    }

    #[test]
    fn test_parse_or_falls_back() {
        assert_eq!(parse_size_or("bad", DEFAULT_MAX_SIZE), 1 << 34);
        assert_eq!(parse_size_or("", 5), 5);
        assert_eq!(parse_size_or("1k", 5), 1024);
    }

    #[test]
    fn test_monotonic_in_number_and_unit() {
        let units = ["b", "k", "m", "g", "t"];
        for unit in units {
            let mut previous = None;
            for n in [0u64, 1, 2, 10, 999] {
                let size = parse_size(&format!("{n}{unit}")).unwrap();
                if let Some(prev) = previous {
                    assert!(size > prev);
                }
                previous = Some(size);
            }
        }
        let sizes: Vec<u64> = units
            .iter()
            .map(|u| parse_size(&format!("3{u}")).unwrap())
            .collect();
        assert!(sizes.windows(2).all(|w| w[0] < w[1]));
    }
}
