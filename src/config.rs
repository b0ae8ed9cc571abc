//! Settings file support.
//!
//! A settings file is a TOML document carrying the options that tend to be
//! stable for one monitored resource:
//!
//! ```toml
//! exclude = ["meta.generated", "/html/body/div[3]"]
//! ignore = ["**.timestamp", "items[*].id"]
//! sign_tokens = ["2024-", "req-"]
//! max_depth = 256
//! ```

use crate::diff::{DiffConfig, DEFAULT_MAX_DEPTH};
use crate::error::PagediffError;
use crate::filter::ExclusionSet;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Exact locations (or text tokens) already acknowledged
    pub exclude: Vec<String>,
    /// Location patterns to leave out of every report
    pub ignore: Vec<String>,
    /// Substrings marking volatile JSON scalars
    pub sign_tokens: Vec<String>,
    pub max_depth: Option<usize>,
}

impl Settings {
    /// Reads and validates a settings file.
    pub fn load(path: &Path) -> Result<Self, PagediffError> {
        let content = fs::read_to_string(path).map_err(|e| PagediffError::ConfigError {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;
        Self::from_toml(&content).map_err(|e| PagediffError::ConfigError {
            message: format!("{}: {}", path.display(), e),
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Merges another set of settings on top of this one.
    ///
    /// Lists are concatenated; a depth limit in `other` wins.
    pub fn merge(mut self, other: Settings) -> Self {
        self.exclude.extend(other.exclude);
        self.ignore.extend(other.ignore);
        self.sign_tokens.extend(other.sign_tokens);
        if other.max_depth.is_some() {
            self.max_depth = other.max_depth;
        }
        self
    }

    pub fn into_diff_config(self) -> DiffConfig {
        let mut exclusions: ExclusionSet = self.exclude.into_iter().collect();
        for pattern in &self.ignore {
            exclusions.add_pattern(pattern);
        }

        DiffConfig {
            exclusions,
            sign_tokens: self.sign_tokens,
            max_depth: self.max_depth.unwrap_or(DEFAULT_MAX_DEPTH),
        }
    }
}
