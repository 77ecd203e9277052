//! Template source resolution over a chain of filesystems.
//!
//! [`FsLoader`] is the piece a templating engine talks to. It is built from
//! an ordered list of sources (locator strings or already-open filesystems)
//! and answers two questions:
//!
//! - [`FsLoader::get_source`]: the text of a template, the path to show for
//!   it, and a [`Staleness`] check for the engine's cache
//! - [`FsLoader::list_templates`]: every template name across all sources
//!
//! # Resolution Order
//!
//! Sources are searched in the order given; the first one holding the
//! template wins and later sources are not consulted.
//!
//! # Example
//!
//! ```
//! use fsloader::fs::MemoryFs;
//! use fsloader::{FsLoader, LoaderOptions};
//!
//! let templates = MemoryFs::with_files([("top.tpl", "B"), ("dir/nested.tpl", "A")]).unwrap();
//! let loader = FsLoader::single(templates, LoaderOptions::default()).unwrap();
//!
//! let resolved = loader.get_source("dir/nested.tpl").unwrap();
//! assert_eq!(resolved.source, "A");
//! assert!(!resolved.uptodate.is_stale());
//! assert_eq!(loader.list_templates().unwrap(), vec!["dir/nested.tpl", "top.tpl"]);
//! ```

use crate::config::{LoaderConfig, LoaderOptions};
use crate::error::{LoaderError, Result};
use crate::fs::{
    normalize, open_fs, relpath, EmbeddedFs, Filesystem, HttpFs, MemoryFs, MultiFs, OsFs, TarFs,
};
use std::collections::BTreeSet;
use std::io::Read;
use std::sync::Arc;
use std::time::SystemTime;

/// One entry of the search chain, before it is opened.
#[derive(Debug, Clone)]
pub enum FsSource {
    /// A locator such as `osfs://./templates`, opened with [`open_fs`].
    Locator(String),
    /// A filesystem that is already open.
    Handle(Arc<dyn Filesystem>),
}

impl FsSource {
    /// Wrap an open filesystem.
    pub fn handle(fs: impl Filesystem + 'static) -> Self {
        Self::Handle(Arc::new(fs))
    }
}

impl From<&str> for FsSource {
    fn from(locator: &str) -> Self {
        Self::Locator(locator.to_string())
    }
}

impl From<String> for FsSource {
    fn from(locator: String) -> Self {
        Self::Locator(locator)
    }
}

impl From<Arc<dyn Filesystem>> for FsSource {
    fn from(fs: Arc<dyn Filesystem>) -> Self {
        Self::Handle(fs)
    }
}

impl From<OsFs> for FsSource {
    fn from(fs: OsFs) -> Self {
        Self::handle(fs)
    }
}

impl From<MemoryFs> for FsSource {
    fn from(fs: MemoryFs) -> Self {
        Self::handle(fs)
    }
}

impl From<EmbeddedFs> for FsSource {
    fn from(fs: EmbeddedFs) -> Self {
        Self::handle(fs)
    }
}

impl From<TarFs> for FsSource {
    fn from(fs: TarFs) -> Self {
        Self::handle(fs)
    }
}

impl From<HttpFs> for FsSource {
    fn from(fs: HttpFs) -> Self {
        Self::handle(fs)
    }
}

/// Point-in-time freshness check for a resolved template.
///
/// Holds the backend that served the template and the modification time seen
/// when it was read. [`Staleness::is_stale`] can be called any number of times.
#[derive(Debug, Clone)]
pub struct Staleness {
    fs: Arc<dyn Filesystem>,
    path: String,
    captured: Option<SystemTime>,
}

impl Staleness {
    /// Whether the template changed since it was resolved.
    ///
    /// Backends without modification times always report stale, as does a
    /// template that can no longer be queried.
    pub fn is_stale(&self) -> bool {
        let Some(captured) = self.captured else {
            return true;
        };

        match self.fs.modified(&self.path) {
            Ok(current) => current > captured,
            Err(e) => {
                tracing::debug!("Treating {} as stale: {}", self.path, e);
                true
            }
        }
    }

    /// The modification time captured at resolution, if the backend had one.
    pub fn captured(&self) -> Option<SystemTime> {
        self.captured
    }

    /// Backend-relative path of the template.
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// A successfully resolved template.
#[derive(Debug, Clone)]
pub struct ResolvedSource {
    /// Decoded template text.
    pub source: String,
    /// Path for display: the template name, or a native path or URL when
    /// `use_syspath` is set and the backend provides one.
    pub path: String,
    /// Reload check for cached parses of this template.
    pub uptodate: Staleness,
}

/// The interface a templating engine binds to.
pub trait TemplateLoader {
    /// Resolve a template, failing with [`LoaderError::TemplateNotFound`] on a miss.
    fn get_source(&self, name: &str) -> Result<ResolvedSource>;

    /// Every template name, sorted and without duplicates.
    fn list_templates(&self) -> Result<Vec<String>>;
}

/// Loads templates from an ordered chain of filesystems.
#[derive(Debug, Clone)]
pub struct FsLoader {
    fs: MultiFs,
    options: LoaderOptions,
}

impl FsLoader {
    /// Build a loader from sources in priority order.
    ///
    /// Locators are opened immediately; any that cannot be opened fail the
    /// whole construction with the backend's error.
    pub fn new<I, S>(sources: I, options: LoaderOptions) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<FsSource>,
    {
        let mut fs = MultiFs::new();

        for (index, source) in sources.into_iter().enumerate() {
            match source.into() {
                FsSource::Locator(locator) => {
                    let opened = open_fs(&locator)?;
                    fs.add_fs(locator, opened);
                }
                FsSource::Handle(handle) => {
                    fs.add_fs(format!("handle-{}", index), handle);
                }
            }
        }

        Ok(Self { fs, options })
    }

    /// Build a loader over a single source.
    pub fn single(source: impl Into<FsSource>, options: LoaderOptions) -> Result<Self> {
        Self::new([source.into()], options)
    }

    /// Build a loader from configuration.
    pub fn from_config(config: &LoaderConfig) -> Result<Self> {
        Self::new(config.sources.iter().map(String::as_str), config.options)
    }

    /// Resolve a template by name.
    ///
    /// Returns the first match in source order. Names that escape the root
    /// with `..` are never found.
    pub fn get_source(&self, name: &str) -> Result<ResolvedSource> {
        let Some(key) = normalize(name).filter(|k| !k.is_empty()) else {
            tracing::debug!("Rejecting template name {:?}", name);
            return Err(Self::not_found(name));
        };

        let Some((backend, fs)) = self.fs.which(&key)? else {
            tracing::debug!("Template {} not found in {} source(s)", name, self.fs.len());
            return Err(Self::not_found(name));
        };

        let captured = match fs.modified(&key) {
            Ok(modified) => Some(modified),
            Err(LoaderError::MissingMetadata { .. }) => None,
            Err(e) => return Err(e),
        };

        let source = self.read_source(fs.as_ref(), &key)?;
        let path = self.display_path(fs.as_ref(), name, &key);

        tracing::debug!("Resolved {} from '{}'", name, backend);

        Ok(ResolvedSource {
            source,
            path,
            uptodate: Staleness {
                fs: Arc::clone(fs),
                path: key,
                captured,
            },
        })
    }

    /// Every template across all sources, sorted and de-duplicated.
    ///
    /// Sources that cannot enumerate their files (HTTP) contribute nothing.
    pub fn list_templates(&self) -> Result<Vec<String>> {
        let found: BTreeSet<String> = self
            .fs
            .walk_files()?
            .iter()
            .map(|file| relpath(file))
            .collect();
        Ok(found.into_iter().collect())
    }

    /// Check if any source holds a template.
    pub fn has_template(&self, name: &str) -> Result<bool> {
        match normalize(name).filter(|k| !k.is_empty()) {
            Some(key) => self.fs.is_file(&key),
            None => Ok(false),
        }
    }

    /// Source names in priority order.
    pub fn backend_names(&self) -> Vec<&str> {
        self.fs.names()
    }

    /// The options this loader reads with.
    pub fn options(&self) -> &LoaderOptions {
        &self.options
    }

    /// The composed search chain.
    pub fn filesystem(&self) -> &MultiFs {
        &self.fs
    }

    fn read_source(&self, fs: &dyn Filesystem, key: &str) -> Result<String> {
        let bytes = {
            let mut reader = fs.open_read(key)?;
            let mut bytes = Vec::new();
            reader.read_to_end(&mut bytes)?;
            bytes
        };

        let encoding = self.options.encoding;
        encoding.decode(&bytes).ok_or_else(|| LoaderError::Decode {
            path: key.to_string(),
            encoding,
        })
    }

    fn display_path(&self, fs: &dyn Filesystem, name: &str, key: &str) -> String {
        if self.options.use_syspath {
            if let Some(syspath) = fs.syspath(key) {
                return syspath.to_string_lossy().into_owned();
            }
            if let Some(url) = fs.url(key) {
                return url;
            }
        }
        name.to_string()
    }

    fn not_found(name: &str) -> LoaderError {
        LoaderError::TemplateNotFound {
            name: name.to_string(),
        }
    }
}

impl TemplateLoader for FsLoader {
    fn get_source(&self, name: &str) -> Result<ResolvedSource> {
        FsLoader::get_source(self, name)
    }

    fn list_templates(&self) -> Result<Vec<String>> {
        FsLoader::list_templates(self)
    }
}
