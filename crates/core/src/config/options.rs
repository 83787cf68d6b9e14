//! The recognised-option table and typed coercion of raw option values.

use thiserror::Error;

/// Literal value meaning "leave this filter disabled".
pub const UNSET: &str = "unset";

/// The type an option's raw string is expected to coerce to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Bool,
    /// Tri-state: unset, false or true.
    OptionalBool,
    /// Integer, where "unset" disables the option.
    Int,
    Text,
}

impl OptionKind {
    /// Check whether `raw` is a legal value for this kind.
    pub fn check(self, raw: &str) -> Result<(), CoercionError> {
        match self {
            OptionKind::Bool => bool::coerce(raw).map(|_| ()),
            OptionKind::OptionalBool if is_unset(raw) => Ok(()),
            OptionKind::OptionalBool => bool::coerce(raw).map(|_| ()),
            OptionKind::Int if is_unset(raw) => Ok(()),
            OptionKind::Int => i64::coerce(raw).map(|_| ()),
            OptionKind::Text => Ok(()),
        }
    }
}

fn is_unset(raw: &str) -> bool {
    raw.trim().eq_ignore_ascii_case(UNSET)
}

/// One entry of the recognised-option table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionSpec {
    pub name: &'static str,
    pub kind: OptionKind,
    /// Value placed in the built-in default layer.
    pub default: &'static str,
    pub description: &'static str,
}

/// Every option the search understands, in display order.
pub const OPTION_TABLE: &[OptionSpec] = &[
    OptionSpec {
        name: "database",
        kind: OptionKind::Text,
        default: "~/.nyaq.db",
        description: "Path of the catalog database",
    },
    OptionSpec {
        name: "category",
        kind: OptionKind::Int,
        default: UNSET,
        description: "Coarse category 0-15 (high nibble of the stored category)",
    },
    OptionSpec {
        name: "whole",
        kind: OptionKind::Bool,
        default: "no",
        description: "Treat the whole phrase as a single keyword",
    },
    OptionSpec {
        name: "regexp",
        kind: OptionKind::Bool,
        default: "no",
        description: "Match keywords as case-insensitive regular expressions",
    },
    OptionSpec {
        name: "word",
        kind: OptionKind::Bool,
        default: "no",
        description: "Match keywords as whole words",
    },
    OptionSpec {
        name: "size",
        kind: OptionKind::Text,
        default: "0B:20G",
        description: "Size range as min:max with units B, K, M, G or T",
    },
    OptionSpec {
        name: "recent",
        kind: OptionKind::Int,
        default: UNSET,
        description: "Only torrents published within this many days",
    },
    OptionSpec {
        name: "trusted",
        kind: OptionKind::OptionalBool,
        default: UNSET,
        description: "Filter on the trusted flag",
    },
    OptionSpec {
        name: "remake",
        kind: OptionKind::OptionalBool,
        default: UNSET,
        description: "Filter on the remake flag",
    },
    OptionSpec {
        name: "order",
        kind: OptionKind::Text,
        default: "time:desc",
        description: "Sort order as field:direction (title/size/time, asc/desc)",
    },
    OptionSpec {
        name: "limit",
        kind: OptionKind::Int,
        default: "30",
        description: "Results per page, 1-80",
    },
    OptionSpec {
        name: "nonword",
        kind: OptionKind::Bool,
        default: "yes",
        description: "Match keywords without letters case-sensitively",
    },
];

/// Look up an option in the table.
pub fn find_option(name: &str) -> Option<&'static OptionSpec> {
    OPTION_TABLE.iter().find(|spec| spec.name == name)
}

/// A raw option value could not be read as the requested type.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("cannot read {value:?} as {expected}")]
pub struct CoercionError {
    pub value: String,
    pub expected: &'static str,
}

impl CoercionError {
    fn new(value: &str, expected: &'static str) -> Self {
        Self {
            value: value.to_string(),
            expected,
        }
    }
}

/// Types an option value can be coerced to.
pub trait OptionType: Sized {
    fn coerce(raw: &str) -> Result<Self, CoercionError>;
}

impl OptionType for bool {
    fn coerce(raw: &str) -> Result<Self, CoercionError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "yes" | "true" | "on" => Ok(true),
            "0" | "no" | "false" | "off" => Ok(false),
            _ => Err(CoercionError::new(raw, "a boolean")),
        }
    }
}

impl OptionType for i64 {
    fn coerce(raw: &str) -> Result<Self, CoercionError> {
        raw.trim()
            .parse()
            .map_err(|_| CoercionError::new(raw, "an integer"))
    }
}

impl OptionType for f64 {
    fn coerce(raw: &str) -> Result<Self, CoercionError> {
        raw.trim()
            .parse()
            .map_err(|_| CoercionError::new(raw, "a number"))
    }
}

impl OptionType for String {
    fn coerce(raw: &str) -> Result<Self, CoercionError> {
        Ok(raw.to_string())
    }
}

/// Tri-state options: anything that does not coerce to `T` (including
/// "unset") resolves to the caller's default, normally `None`.
impl<T: OptionType> OptionType for Option<T> {
    fn coerce(raw: &str) -> Result<Self, CoercionError> {
        T::coerce(raw).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_coercion_accepts_ini_spellings() {
        for raw in ["1", "yes", "TRUE", " on "] {
            assert_eq!(bool::coerce(raw), Ok(true), "{raw}");
        }
        for raw in ["0", "No", "false", "OFF"] {
            assert_eq!(bool::coerce(raw), Ok(false), "{raw}");
        }
        assert!(bool::coerce("maybe").is_err());
    }

    #[test]
    fn test_int_coercion() {
        assert_eq!(i64::coerce(" 42 "), Ok(42));
        assert_eq!(i64::coerce("-1"), Ok(-1));
        let err = i64::coerce("unset").unwrap_err();
        assert_eq!(err.value, "unset");
        assert_eq!(err.expected, "an integer");
    }

    #[test]
    fn test_float_coercion() {
        assert_eq!(f64::coerce("1.5"), Ok(1.5));
        assert!(f64::coerce("one").is_err());
    }

    #[test]
    fn test_optional_bool_unset_fails_coercion() {
        assert_eq!(Option::<bool>::coerce("yes"), Ok(Some(true)));
        assert!(Option::<bool>::coerce("unset").is_err());
    }

    #[test]
    fn test_kind_check_accepts_unset_for_disableable_options() {
        assert!(OptionKind::Int.check("unset").is_ok());
        assert!(OptionKind::OptionalBool.check("UNSET").is_ok());
        assert!(OptionKind::Bool.check("unset").is_err());
        assert!(OptionKind::Int.check("ten").is_err());
        assert!(OptionKind::Text.check("anything").is_ok());
    }

    #[test]
    fn test_table_defaults_are_valid_for_their_kind() {
        for spec in OPTION_TABLE {
            assert!(spec.kind.check(spec.default).is_ok(), "{}", spec.name);
        }
    }

    #[test]
    fn test_find_option() {
        assert_eq!(find_option("limit").map(|s| s.default), Some("30"));
        assert!(find_option("hotword").is_none());
    }
}
