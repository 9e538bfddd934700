//! Extractor configuration.
//!
//! Loads `.phpantom-types.toml` from a directory or any of its parents.
//! Every field has a default, so an empty file (or no file) is valid.
//!
//! ```toml
//! strict_dialects = true
//! validate_primary_doc_type = true
//! memoize_docblocks = false
//! known_types = ["App\\Models\\User", "Psr\\Log\\LoggerInterface"]
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// File name searched for by [`ExtractorConfig::load_from`].
pub const CONFIG_FILE_NAME: &str = ".phpantom-types.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Read `@psalm-*` and `@phpstan-*` tags.
    pub strict_dialects: bool,
    /// Run the primary `@param` / `@var` type through the strict
    /// validator too; when it passes it becomes the strict type unless a
    /// dialect tag overrides it.
    pub validate_primary_doc_type: bool,
    /// Share doc-block parses between symbols with identical comments.
    pub memoize_docblocks: bool,
    /// Class names (without leading `\`) rendered fully qualified by the
    /// normalizer.
    pub known_types: Vec<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            strict_dialects: true,
            validate_primary_doc_type: true,
            memoize_docblocks: false,
            known_types: Vec::new(),
        }
    }
}

impl ExtractorConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Load config from a specific path.
    pub fn load_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Search `start_dir` and its ancestors for `.phpantom-types.toml`.
    ///
    /// Returns the config together with the file it came from, or `None`
    /// when no file exists up to the filesystem root.
    pub fn load_from(start_dir: &Path) -> Result<Option<(Self, PathBuf)>, ConfigError> {
        let mut current = Some(start_dir);

        while let Some(dir) = current {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.is_file() {
                let config = Self::load_path(&config_path)?;
                tracing::debug!(path = %config_path.display(), "loaded extractor config");
                return Ok(Some((config, config_path)));
            }
            current = dir.parent();
        }

        Ok(None)
    }
}
