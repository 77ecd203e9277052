//! Ordered composition of several filesystems.

use crate::error::{LoaderError, Result};
use crate::fs::Filesystem;
use std::collections::BTreeSet;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;

/// A search chain of named filesystems.
///
/// Members are consulted in the order they were added; the first one that
/// holds a path answers for it. `MultiFs` is itself a [`Filesystem`], so a
/// chain can be used anywhere a single backend can.
#[derive(Debug, Clone, Default)]
pub struct MultiFs {
    members: Vec<(String, Arc<dyn Filesystem>)>,
}

impl MultiFs {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a filesystem at the lowest priority.
    pub fn add_fs(&mut self, name: impl Into<String>, fs: Arc<dyn Filesystem>) {
        let name = name.into();
        tracing::debug!("Adding {} to search chain as '{}'", fs.describe(), name);
        self.members.push((name, fs));
    }

    /// Look up a member by name.
    pub fn get_fs(&self, name: &str) -> Option<&Arc<dyn Filesystem>> {
        self.members
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, fs)| fs)
    }

    /// The first member holding `path` as a file, with its name.
    ///
    /// A member that fails to answer stops the search with its error rather
    /// than being passed over.
    pub fn which(&self, path: &str) -> Result<Option<(&str, &Arc<dyn Filesystem>)>> {
        for (name, fs) in &self.members {
            tracing::trace!("Probing '{}' for {}", name, path);
            if fs.is_file(path)? {
                return Ok(Some((name.as_str(), fs)));
            }
        }
        Ok(None)
    }

    /// Member names in priority order.
    pub fn names(&self) -> Vec<&str> {
        self.members.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Iterate members in priority order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn Filesystem>)> {
        self.members.iter().map(|(n, fs)| (n.as_str(), fs))
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the chain has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    fn require(&self, path: &str) -> Result<&Arc<dyn Filesystem>> {
        self.which(path)?
            .map(|(_, fs)| fs)
            .ok_or_else(|| LoaderError::ResourceNotFound {
                path: path.to_string(),
            })
    }
}

impl Filesystem for MultiFs {
    fn is_file(&self, path: &str) -> Result<bool> {
        Ok(self.which(path)?.is_some())
    }

    fn open_read(&self, path: &str) -> Result<Box<dyn Read + '_>> {
        self.require(path)?.open_read(path)
    }

    fn modified(&self, path: &str) -> Result<SystemTime> {
        self.require(path)?.modified(path)
    }

    fn syspath(&self, path: &str) -> Option<PathBuf> {
        self.which(path)
            .ok()
            .flatten()
            .and_then(|(_, fs)| fs.syspath(path))
    }

    fn url(&self, path: &str) -> Option<String> {
        self.which(path)
            .ok()
            .flatten()
            .and_then(|(_, fs)| fs.url(path))
    }

    /// Union of every member's files. Members that cannot be walked are skipped.
    fn walk_files(&self) -> Result<Vec<String>> {
        let mut found = BTreeSet::new();
        for (name, fs) in &self.members {
            match fs.walk_files() {
                Ok(files) => found.extend(files),
                Err(LoaderError::Unsupported { operation, backend }) => {
                    tracing::warn!(
                        "Skipping '{}' while listing: {} cannot {}",
                        name,
                        backend,
                        operation
                    );
                }
                Err(e) => return Err(e),
            }
        }
        Ok(found.into_iter().collect())
    }

    fn describe(&self) -> String {
        format!("MultiFs[{}]", self.names().join(", "))
    }
}
