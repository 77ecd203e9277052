//! Filesystem backends for template lookup.
//!
//! Every storage medium the loader can search implements [`Filesystem`]:
//! - [`OsFs`] - a directory on disk
//! - [`MemoryFs`] - a writable in-memory tree
//! - [`EmbeddedFs`] - a directory embedded at compile time
//! - [`TarFs`] - a tar or tar.gz archive
//! - [`HttpFs`] - a read-only tree served over HTTP
//!
//! [`MultiFs`] composes several of them into one ordered search chain, and
//! [`open_fs`] turns a locator string such as `osfs://./templates` or
//! `tgz:///srv/templates.tar.gz` into a backend.
//!
//! # Paths
//!
//! Paths passed to a backend are relative to its root and use `/` as the
//! separator. A leading `/` is accepted and ignored. Paths that climb above
//! the root with `..` never name a file.

pub mod archive;
pub mod embedded;
pub mod http;
pub mod memory;
pub mod multi;
pub mod opener;
pub mod os;

pub use archive::TarFs;
pub use embedded::EmbeddedFs;
pub use http::HttpFs;
pub use memory::MemoryFs;
pub use multi::MultiFs;
pub use opener::open_fs;
pub use os::OsFs;

use crate::error::Result;
use std::fmt;
use std::io::Read;
use std::path::PathBuf;
use std::time::SystemTime;

/// Capabilities the loader needs from a storage backend.
///
/// Implementations must be shareable across threads; the loader holds them
/// as `Arc<dyn Filesystem>` for its whole lifetime.
pub trait Filesystem: Send + Sync + fmt::Debug {
    /// Whether `path` names an existing regular file.
    ///
    /// A path that does not exist is `Ok(false)`. Any other failure to find
    /// out (permissions, an unreachable server) is an error.
    fn is_file(&self, path: &str) -> Result<bool>;

    /// Open `path` for reading. The reader is dropped by the caller once read.
    fn open_read(&self, path: &str) -> Result<Box<dyn Read + '_>>;

    /// Last modification time of `path`.
    ///
    /// Backends that keep no such metadata return
    /// [`LoaderError::MissingMetadata`](crate::LoaderError::MissingMetadata).
    fn modified(&self, path: &str) -> Result<SystemTime>;

    /// Native filesystem path for `path`, if the backend is disk-backed.
    fn syspath(&self, _path: &str) -> Option<PathBuf> {
        None
    }

    /// Locator URL for `path`, if the backend can express one.
    fn url(&self, _path: &str) -> Option<String> {
        None
    }

    /// Every regular file in the backend, as absolute-in-backend paths
    /// (`/dir/file.tpl`), in no particular order.
    fn walk_files(&self) -> Result<Vec<String>>;

    /// Short human-readable description used in logs and errors.
    fn describe(&self) -> String {
        format!("{:?}", self)
    }
}

/// Normalize a backend path to its relative form (`dir/file.tpl`).
///
/// Empty and `.` segments are dropped and `..` removes the previous segment.
/// Returns `None` if the path climbs above the root.
pub fn normalize(path: &str) -> Option<String> {
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            other => parts.push(other),
        }
    }
    Some(parts.join("/"))
}

/// Convert an absolute-in-backend path to one relative to the backend root.
pub fn relpath(path: &str) -> String {
    path.trim_start_matches('/').to_string()
}

/// Absolute-in-backend form of a normalized relative path.
pub(crate) fn abspath(relative: &str) -> String {
    format!("/{}", relative)
}
