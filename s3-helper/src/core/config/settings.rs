use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;
use tracing::debug;

use super::env_interpolation::interpolate_env_vars;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Missing required setting: {0}")]
    MissingKey(String),
    #[error("Invalid value {value:?} for setting {key}: {reason}")]
    InvalidValue { key: String, value: String, reason: String },
    #[error("Setting {key} references unset environment variables: {}", vars.join(", "))]
    MissingEnvVar { key: String, vars: Vec<String> },
}

/// Immutable key/value settings read from a properties file.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    values: HashMap<String, String>,
}

impl Settings {
    /// Load settings from a properties file.
    ///
    /// # Format
    /// * One `key=value` or `key: value` entry per line, split at the first separator.
    /// * Lines starting with `#` or `!` are comments.
    /// * Surrounding quotes on values are removed, `${VAR}` and `${VAR:-default}` are expanded.
    /// * A repeated key keeps its last value.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;

        let settings = Self::parse(&content)?;
        debug!(path = %path.display(), entries = settings.values.len(), "Loaded settings file");
        Ok(settings)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut values = HashMap::new();

        for line in content.lines() {
            let line = line.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }

            let (key, value) = match line.find(['=', ':']) {
                Some(idx) => (line[..idx].trim(), line[idx + 1..].trim()),
                None => (line, ""),
            };
            let value = strip_quotes(value);
            let value = interpolate_env_vars(value)
                .map_err(|vars| ConfigError::MissingEnvVar { key: key.to_string(), vars })?;

            values.insert(key.to_string(), value);
        }

        Ok(Self { values })
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self { values: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }

    /// Value stored under `key`. A missing key is an error, never an empty default.
    pub fn get(&self, key: &str) -> Result<&str, ConfigError> {
        self.values.get(key).map(String::as_str).ok_or_else(|| ConfigError::MissingKey(key.to_string()))
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.values.get(key).map(String::as_str).unwrap_or(default)
    }

    /// Parse the value under `key`, `None` when the key is absent.
    pub fn get_parsed<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.values
            .get(key)
            .map(|value| {
                value.parse::<T>().map_err(|e| ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.clone(),
                    reason: e.to_string(),
                })
            })
            .transpose()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
