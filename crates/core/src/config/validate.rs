use std::fmt;

use super::options::find_option;
use super::types::Configuration;

/// A problem found in a configuration. Never fatal: unknown options are
/// ignored and bad values fall back to defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigDiagnostic {
    UnknownOption {
        name: String,
    },
    InvalidValue {
        name: String,
        value: String,
        expected: &'static str,
    },
}

impl fmt::Display for ConfigDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigDiagnostic::UnknownOption { name } => {
                write!(f, "base.{} is not a recognised option", name)
            }
            ConfigDiagnostic::InvalidValue {
                name,
                value,
                expected,
            } => write!(
                f,
                "base.{} = {:?} is not {}; the default will be used",
                name, value, expected
            ),
        }
    }
}

/// Validate configuration
/// Currently reports:
/// - Options missing from the option table
/// - Values that do not coerce to the option's declared kind
pub fn validate_config(config: &Configuration) -> Vec<ConfigDiagnostic> {
    let mut diagnostics = Vec::new();
    for (name, value) in config.options() {
        match find_option(name) {
            None => diagnostics.push(ConfigDiagnostic::UnknownOption {
                name: name.to_string(),
            }),
            Some(spec) => {
                if let Err(e) = spec.kind.check(value) {
                    diagnostics.push(ConfigDiagnostic::InvalidValue {
                        name: name.to_string(),
                        value: value.to_string(),
                        expected: e.expected,
                    });
                }
            }
        }
    }
    diagnostics
}
