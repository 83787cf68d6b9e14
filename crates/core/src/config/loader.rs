use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::{types::Configuration, ConfigError};

/// File name of the global and local configuration layers.
pub const CONFIG_NAME: &str = ".nyaqrc";

/// Prefix of environment overrides, e.g. `NYAQ_BASE_LIMIT=50`.
const ENV_PREFIX: &str = "NYAQ_";

/// Layered configuration source: built-in defaults, then each file in
/// order, then environment variables. Later layers win.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    paths: Vec<PathBuf>,
}

impl ConfigSource {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }

    /// `~/.nyaqrc` followed by `./.nyaqrc`.
    pub fn standard() -> Self {
        let mut paths = Vec::new();
        if let Some(home) = home::home_dir() {
            paths.push(home.join(CONFIG_NAME));
        }
        paths.push(PathBuf::from(CONFIG_NAME));
        Self { paths }
    }

    /// Append further file layers after the existing ones.
    pub fn with_extra(mut self, extra: impl IntoIterator<Item = PathBuf>) -> Self {
        self.paths.extend(extra);
        self
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Merge every layer into a configuration. Missing files are skipped.
    pub fn load(&self) -> Result<Configuration, ConfigError> {
        let mut figment = defaults();
        for path in &self.paths {
            debug!(path = %path.display(), exists = path.exists(), "Configuration layer");
            figment = figment.merge(Toml::file(path));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("_"));
        extract(figment)
    }
}

/// Load configuration from a TOML string on top of the defaults (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Configuration, ConfigError> {
    extract(defaults().merge(Toml::string(toml_str)))
}

/// Write the configuration as a `[base]` TOML table.
pub fn save_config(config: &Configuration, path: &Path) -> Result<(), ConfigError> {
    let write_error = |message: String| ConfigError::WriteError {
        path: path.display().to_string(),
        message,
    };

    let text = toml::to_string(config).map_err(|e| write_error(e.to_string()))?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| write_error(e.to_string()))?;
    }
    fs::write(path, text).map_err(|e| write_error(e.to_string()))
}

fn defaults() -> Figment {
    Figment::from(Serialized::defaults(Configuration::default()))
}

/// Files may hold booleans and numbers; they are flattened to strings so
/// coercion happens in one place.
#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    base: BTreeMap<String, toml::Value>,
}

fn extract(figment: Figment) -> Result<Configuration, ConfigError> {
    let raw: RawConfig = figment
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    let mut options = BTreeMap::new();
    for (name, value) in raw.base {
        let text = match value {
            toml::Value::String(s) => s,
            toml::Value::Integer(i) => i.to_string(),
            toml::Value::Float(f) => f.to_string(),
            toml::Value::Boolean(b) => b.to_string(),
            other => {
                warn!(option = %name, value = %other, "Ignoring non-scalar option value");
                continue;
            }
        };
        options.insert(name, text);
    }
    Ok(Configuration::from_options(options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_load_config_from_str_overrides_defaults() {
        let toml = r#"
[base]
limit = 50
whole = true
size = "1G:4G"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.get_raw("limit"), Some("50"));
        assert_eq!(config.get_raw("whole"), Some("true"));
        assert_eq!(config.get_raw("size"), Some("1G:4G"));
        // untouched options keep their defaults
        assert_eq!(config.get_raw("order"), Some("time:desc"));
    }

    #[test]
    fn test_load_config_from_str_invalid_toml() {
        let result = load_config_from_str("[base\nlimit = ");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_config_from_str_ignores_other_sections() {
        let toml = r#"
[other]
limit = 10
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.get_raw("limit"), Some("30"));
    }

    #[test]
    fn test_missing_files_are_skipped() {
        let source = ConfigSource::new(vec![PathBuf::from("/nonexistent/.nyaqrc")]);
        let config = source.load().unwrap();
        assert_eq!(config.get_raw("size"), Some("0B:20G"));
    }

    #[test]
    fn test_later_layers_win() {
        let mut global = NamedTempFile::new().unwrap();
        writeln!(global, "[base]\nlimit = 10\norder = \"size:asc\"").unwrap();
        let mut local = NamedTempFile::new().unwrap();
        writeln!(local, "[base]\nlimit = 20").unwrap();

        let source = ConfigSource::new(vec![global.path().to_path_buf()])
            .with_extra([local.path().to_path_buf()]);
        assert_eq!(source.paths().len(), 2);

        let config = source.load().unwrap();
        assert_eq!(config.get_raw("limit"), Some("20"));
        assert_eq!(config.get_raw("order"), Some("size:asc"));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(CONFIG_NAME);

        let mut config = Configuration::default();
        config.set("limit", "25");
        config.set("trusted", "yes");
        save_config(&config, &path).unwrap();

        let reloaded = ConfigSource::new(vec![path]).load().unwrap();
        assert_eq!(reloaded.get_raw("limit"), Some("25"));
        assert_eq!(reloaded.get("trusted", None::<bool>), Some(true));
    }

    #[test]
    fn test_save_to_directory_fails() {
        let dir = TempDir::new().unwrap();
        let result = save_config(&Configuration::default(), dir.path());
        assert!(matches!(result, Err(ConfigError::WriteError { .. })));
    }
}
