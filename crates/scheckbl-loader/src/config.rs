//! Dataset source configuration.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use scheckbl_core::types::{normalize_identifier, CasePolicy, DatasetKey};

pub const DEFAULT_BASE_PATH: &str = "data";

/// Error type for loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Options recognized by `DirectorySource`.
///
/// ```json
/// {
///   "base_path": "/srv/blocklists",
///   "case_sensitive": true,
///   "cache_enabled": true,
///   "case_overrides": { "urls/nsfw": false }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Root directory holding one sub-directory per blocklist type
    pub base_path: PathBuf,
    /// Default case policy for every category
    pub case_sensitive: bool,
    /// Keep resolved datasets between calls
    pub cache_enabled: bool,
    /// Per-category policy, keyed by `type/category`
    pub case_overrides: BTreeMap<String, bool>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from(DEFAULT_BASE_PATH),
            case_sensitive: true,
            cache_enabled: false,
            case_overrides: BTreeMap::new(),
        }
    }
}

impl SourceConfig {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            ..Self::default()
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// The fixed case policy of the category named by `key`.
    pub fn case_policy(&self, key: &DatasetKey) -> CasePolicy {
        let wanted = key.category_path();
        let case_sensitive = self
            .case_overrides
            .iter()
            .find(|(path, _)| normalize_override_key(path) == wanted)
            .map(|(_, &value)| value)
            .unwrap_or(self.case_sensitive);
        CasePolicy::from_case_sensitive(case_sensitive)
    }
}

fn normalize_override_key(path: &str) -> String {
    match path.split_once('/') {
        Some((type_name, category)) => format!(
            "{}/{}",
            normalize_identifier(type_name),
            normalize_identifier(category)
        ),
        None => normalize_identifier(path),
    }
}
