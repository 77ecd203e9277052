//! Loader configuration.
//!
//! [`LoaderOptions`] carries the knobs that affect lookups. [`LoaderConfig`]
//! adds the list of source locators and can be read from YAML:
//!
//! ```yaml
//! sources:
//!   - osfs://./templates
//!   - tgz:///opt/shared/templates.tar.gz
//! encoding: utf-8
//! use_syspath: false
//! ```

use crate::encoding::Encoding;
use crate::error::{LoaderError, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Options that shape how templates are read and reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct LoaderOptions {
    /// Codec used to decode template files.
    #[serde(default)]
    pub encoding: Encoding,

    /// Prefer a native path, then a URL, over the template name as the
    /// display path.
    #[serde(default)]
    pub use_syspath: bool,
}

impl LoaderOptions {
    /// Default options: UTF-8, template names as display paths.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the decoding codec.
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Choose whether display paths prefer native paths and URLs.
    pub fn with_syspath(mut self, use_syspath: bool) -> Self {
        self.use_syspath = use_syspath;
        self
    }
}

/// A complete loader definition: where to look and how to read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LoaderConfig {
    /// Locators in priority order (first match wins).
    #[serde(default)]
    pub sources: Vec<String>,

    #[serde(flatten)]
    pub options: LoaderOptions,
}

impl LoaderConfig {
    /// Parse a configuration from YAML text.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| LoaderError::ConfigParseError {
            path: "<inline>".into(),
            message: e.to_string(),
        })
    }
}

/// Load a configuration file.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the YAML is invalid.
pub fn load_config_file(path: &Path) -> Result<LoaderConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            LoaderError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            LoaderError::Io(e)
        }
    })?;
    serde_yaml::from_str(&content).map_err(|e| LoaderError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
