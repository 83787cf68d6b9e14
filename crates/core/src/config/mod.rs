mod loader;
mod options;
mod types;
mod validate;

pub use loader::{load_config_from_str, save_config, ConfigSource, CONFIG_NAME};
pub use options::{find_option, CoercionError, OptionKind, OptionSpec, OptionType, OPTION_TABLE, UNSET};
pub use types::*;
pub use validate::{validate_config, ConfigDiagnostic};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Failed to write configuration to {path}: {message}")]
    WriteError { path: String, message: String },
}
