//! fsloader - Template source loading over pluggable filesystems.
//!
//! fsloader resolves template names against an ordered chain of filesystem
//! backends (disk directories, archives, embedded trees, in-memory trees,
//! HTTP servers) and hands a templating engine the source text, a display
//! path, and a staleness check for its cache.
//!
//! # Modules
//!
//! - [`config`] - Loader options and YAML configuration
//! - [`encoding`] - Text codecs for template contents
//! - [`error`] - Error types and result aliases
//! - [`fs`] - The filesystem capability trait and its backends
//! - [`loader`] - Template resolution across the search chain
//!
//! # Example
//!
//! ```
//! use fsloader::fs::MemoryFs;
//! use fsloader::{FsLoader, FsSource, LoaderOptions};
//!
//! let project = MemoryFs::with_files([("page.tpl", "project page")]).unwrap();
//! let shared = MemoryFs::with_files([("page.tpl", "shared page"), ("base.tpl", "base")]).unwrap();
//!
//! let loader = FsLoader::new(
//!     [FsSource::from(project), FsSource::from(shared)],
//!     LoaderOptions::default(),
//! )
//! .unwrap();
//!
//! assert_eq!(loader.get_source("page.tpl").unwrap().source, "project page");
//! assert_eq!(loader.get_source("base.tpl").unwrap().source, "base");
//! assert!(loader.get_source("missing.tpl").unwrap_err().is_template_not_found());
//! ```

pub mod config;
pub mod encoding;
pub mod error;
pub mod fs;
pub mod loader;

pub use config::{load_config_file, LoaderConfig, LoaderOptions};
pub use encoding::Encoding;
pub use error::{LoaderError, Result};
pub use fs::{open_fs, Filesystem};
pub use loader::{FsLoader, FsSource, ResolvedSource, Staleness, TemplateLoader};

/// Crate version, stamped at build time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
