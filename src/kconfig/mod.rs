//! Typed parsing of Kconfig `.config` settings files.

mod error;
mod value;

use std::path::Path;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;

pub use error::KconfigError;
pub use value::ConfigValue;

use value::{coerce_value, CoerceError};

static ASSIGNMENT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z0-9_]+)=(.*)$").unwrap());

/// Build configuration of one image, read from its `.config` file.
///
/// Entries keep the order in which their names first appeared; a name that
/// is assigned twice holds the later value.
///
/// ## Example
///
/// ```
/// use suit_build::kconfig::{BuildConfiguration, ConfigValue};
///
/// let config = BuildConfiguration::parse("CONFIG_SOC=\"nrf54h20\"\nCONFIG_SUIT=y\n")?;
/// assert_eq!(config.get_str("CONFIG_SOC"), Some("nrf54h20"));
/// assert_eq!(config.get_bool("CONFIG_SUIT"), Some(true));
/// # Ok::<(), suit_build::kconfig::KconfigError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BuildConfiguration {
    entries: IndexMap<String, ConfigValue>,
}

impl BuildConfiguration {
    /// Reads and parses a settings file.
    ///
    /// A missing file is reported as [`KconfigError::FileNotFound`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, KconfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                KconfigError::FileNotFound {
                    path: path.to_path_buf(),
                    source: e,
                }
            } else {
                KconfigError::ReadError {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;

        let config = Self::parse(&contents)?;
        tracing::debug!(path = %path.display(), entries = config.len(), "loaded settings file");
        Ok(config)
    }

    /// Parses settings file contents.
    ///
    /// Lines that are not `NAME=VALUE` assignments (comments, blanks, stray
    /// text) are skipped without error.
    pub fn parse(contents: &str) -> Result<Self, KconfigError> {
        let mut entries = IndexMap::new();

        for (index, line) in contents.lines().enumerate() {
            let Some(caps) = ASSIGNMENT_PATTERN.captures(line) else {
                tracing::trace!(line = index + 1, "skipping non-assignment line");
                continue;
            };

            let name = &caps[1];
            let raw = &caps[2];
            let value = coerce_value(raw).map_err(|e| match e {
                CoerceError::InvalidHex => KconfigError::InvalidHex {
                    key: name.to_string(),
                    value: raw.to_string(),
                    line: index + 1,
                },
            })?;

            entries.insert(name.to_string(), value);
        }

        Ok(Self { entries })
    }

    pub fn get(&self, name: &str) -> Option<&ConfigValue> {
        self.entries.get(name)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(ConfigValue::as_bool)
    }

    pub fn get_int(&self, name: &str) -> Option<i128> {
        self.get(name).and_then(ConfigValue::as_int)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ConfigValue::as_str)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}
