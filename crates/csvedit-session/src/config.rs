use std::env;

use anyhow::{bail, Context};
use csvedit_core::Dialect;
use csvedit_history::stack::DEFAULT_CAPACITY;

/// Name used for exports when the table did not come from a named file
pub const DEFAULT_FILE_NAME: &str = "edited.csv";

/// Session configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Maximum number of undo levels
    pub history_capacity: usize,
    /// Export name when no file name is known
    pub default_file_name: String,
    /// Delimiter and quote character for reading and writing
    pub dialect: Dialect,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_CAPACITY,
            default_file_name: DEFAULT_FILE_NAME.to_string(),
            dialect: Dialect::default(),
        }
    }
}

impl SessionConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup; unset keys keep
    /// their defaults
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("CSVEDIT_HISTORY_CAPACITY") {
            config.history_capacity = raw
                .trim()
                .parse()
                .with_context(|| format!("invalid CSVEDIT_HISTORY_CAPACITY: {raw:?}"))?;
        }

        if let Some(name) = lookup("CSVEDIT_DEFAULT_FILE_NAME") {
            let name = name.trim();
            if name.is_empty() {
                bail!("CSVEDIT_DEFAULT_FILE_NAME must not be empty");
            }
            config.default_file_name = name.to_string();
        }

        if let Some(raw) = lookup("CSVEDIT_DELIMITER") {
            let delimiter = match raw.as_str() {
                "\\t" | "tab" => '\t',
                _ => {
                    let mut chars = raw.chars();
                    match (chars.next(), chars.next()) {
                        (Some(c), None) => c,
                        _ => bail!("CSVEDIT_DELIMITER must be a single character, got {raw:?}"),
                    }
                }
            };
            config.dialect = config
                .dialect
                .with_delimiter(delimiter)
                .context("invalid CSVEDIT_DELIMITER")?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = SessionConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, SessionConfig::default());
        assert_eq!(config.default_file_name, "edited.csv");
        assert_eq!(config.dialect.delimiter(), ',');
    }

    #[test]
    fn test_overrides() {
        let config = SessionConfig::from_lookup(lookup(&[
            ("CSVEDIT_HISTORY_CAPACITY", "16"),
            ("CSVEDIT_DEFAULT_FILE_NAME", "out.tsv"),
            ("CSVEDIT_DELIMITER", "tab"),
        ]))
        .unwrap();

        assert_eq!(config.history_capacity, 16);
        assert_eq!(config.default_file_name, "out.tsv");
        assert_eq!(config.dialect.delimiter(), '\t');
    }

    #[test]
    fn test_invalid_values() {
        assert!(SessionConfig::from_lookup(lookup(&[("CSVEDIT_HISTORY_CAPACITY", "many")])).is_err());
        assert!(SessionConfig::from_lookup(lookup(&[("CSVEDIT_DEFAULT_FILE_NAME", "  ")])).is_err());
        assert!(SessionConfig::from_lookup(lookup(&[("CSVEDIT_DELIMITER", ";;")])).is_err());
        assert!(SessionConfig::from_lookup(lookup(&[("CSVEDIT_DELIMITER", "\"")])).is_err());
        assert!(SessionConfig::from_lookup(lookup(&[("CSVEDIT_DELIMITER", "§")])).is_err());
    }
}
