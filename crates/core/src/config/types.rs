use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use super::options::{OptionType, OPTION_TABLE, UNSET};

/// Default location of the catalog database.
const DEFAULT_DATABASE: &str = "~/.nyaq.db";

/// Resolved search configuration: option name to raw string value.
///
/// Values are kept as strings and coerced on read, so a malformed value
/// degrades to the accessor's default instead of failing a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(default)]
    base: BTreeMap<String, String>,
}

impl Default for Configuration {
    /// The built-in default layer: every option in the table at its default.
    fn default() -> Self {
        Self {
            base: OPTION_TABLE
                .iter()
                .map(|spec| (spec.name.to_string(), spec.default.to_string()))
                .collect(),
        }
    }
}

/// `unset` and blank values disable an option on purpose.
fn is_unset(raw: &str) -> bool {
    let raw = raw.trim();
    raw.is_empty() || raw.eq_ignore_ascii_case(UNSET)
}

impl Configuration {
    /// A configuration with no options set at all.
    pub fn empty() -> Self {
        Self {
            base: BTreeMap::new(),
        }
    }

    pub(crate) fn from_options(base: BTreeMap<String, String>) -> Self {
        Self { base }
    }

    /// Raw value of an option, if present.
    pub fn get_raw(&self, name: &str) -> Option<&str> {
        self.base.get(name).map(String::as_str)
    }

    /// Typed option lookup.
    ///
    /// Returns `default` when the option is absent or its value does not
    /// coerce to `T`.
    pub fn get<T: OptionType>(&self, name: &str, default: T) -> T {
        let Some(raw) = self.base.get(name) else {
            return default;
        };
        match T::coerce(raw) {
            Ok(value) => value,
            Err(e) if is_unset(raw) => {
                debug!(option = name, error = %e, "Option unset, using default");
                default
            }
            Err(e) => {
                warn!(option = name, error = %e, "Option falls back to default");
                default
            }
        }
    }

    /// Set an option, returning the previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.base.insert(name.into(), value.into())
    }

    /// All options in name order.
    pub fn options(&self) -> impl Iterator<Item = (&str, &str)> {
        self.base.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Catalog database path with a leading `~` expanded to the home directory.
    pub fn database_path(&self) -> PathBuf {
        let raw = self.get("database", DEFAULT_DATABASE.to_string());
        expand_home(&raw)
    }

    /// Short digest identifying the option set, for logs.
    pub fn fingerprint(&self) -> String {
        let json = serde_json::to_string(&self.base).unwrap_or_default();
        let digest = format!("{:x}", Sha256::digest(json.as_bytes()));
        digest[..16].to_string()
    }
}

fn expand_home(raw: &str) -> PathBuf {
    let rest = match raw.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_start_matches('/'),
        _ => return PathBuf::from(raw),
    };
    match home::home_dir() {
        Some(home) if rest.is_empty() => home,
        Some(home) => home.join(rest),
        None => PathBuf::from(raw),
    }
}
