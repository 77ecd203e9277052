//! In-memory filesystem.

use crate::encoding::Encoding;
use crate::error::{LoaderError, Result};
use crate::fs::{abspath, normalize, Filesystem};
use std::collections::BTreeMap;
use std::io::{Cursor, Read};
use std::sync::{Arc, RwLock};
use std::time::{Duration, SystemTime};

#[derive(Debug, Clone)]
struct MemoryFile {
    data: Vec<u8>,
    modified: SystemTime,
}

#[derive(Debug, Default)]
struct MemoryState {
    files: BTreeMap<String, MemoryFile>,
    last_stamp: Option<SystemTime>,
}

impl MemoryState {
    /// An existing file that `key` would shadow or be nested under.
    fn conflict(&self, key: &str) -> Option<String> {
        let ancestor = key
            .match_indices('/')
            .map(|(i, _)| &key[..i])
            .find(|dir| self.files.contains_key(*dir));
        if let Some(dir) = ancestor {
            return Some(dir.to_string());
        }

        let prefix = format!("{}/", key);
        self.files
            .range(prefix.clone()..)
            .next()
            .map(|(existing, _)| existing)
            .filter(|existing| existing.starts_with(&prefix))
            .cloned()
    }

    /// Stamp for a write; never equal to or older than the previous stamp.
    fn next_stamp(&mut self) -> SystemTime {
        let now = SystemTime::now();
        let stamp = match self.last_stamp {
            Some(last) if now <= last => last + Duration::from_micros(1),
            _ => now,
        };
        self.last_stamp = Some(stamp);
        stamp
    }
}

/// A writable filesystem held entirely in memory.
///
/// Directories exist implicitly as prefixes of file paths. Cloning shares the
/// underlying tree, so a clone handed to a loader sees later writes.
///
/// # Example
///
/// ```
/// use fsloader::fs::{Filesystem, MemoryFs};
///
/// let fs = MemoryFs::new();
/// fs.write("dir/nested.tpl", b"hello").unwrap();
/// assert!(fs.is_file("dir/nested.tpl").unwrap());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryFs {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryFs {
    /// Create an empty in-memory filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a filesystem pre-populated with `(path, contents)` pairs.
    pub fn with_files<I, P, C>(files: I) -> Result<Self>
    where
        I: IntoIterator<Item = (P, C)>,
        P: AsRef<str>,
        C: AsRef<[u8]>,
    {
        let fs = Self::new();
        for (path, contents) in files {
            fs.write(path.as_ref(), contents.as_ref())?;
        }
        Ok(fs)
    }

    /// Write raw bytes, replacing any existing file and stamping a new
    /// modification time.
    ///
    /// Fails with [`LoaderError::PathConflict`] if `path` is already a
    /// directory or lies under an existing file.
    pub fn write(&self, path: &str, contents: &[u8]) -> Result<()> {
        let key = Self::key(path)?;
        let mut state = self.write_state()?;
        if let Some(existing) = state.conflict(&key) {
            return Err(LoaderError::PathConflict { path: key, existing });
        }
        let modified = state.next_stamp();
        state.files.insert(
            key,
            MemoryFile {
                data: contents.to_vec(),
                modified,
            },
        );
        Ok(())
    }

    /// Encode `text` with `encoding` and write it.
    pub fn write_text(&self, path: &str, text: &str, encoding: Encoding) -> Result<()> {
        let bytes = encoding.encode(text).ok_or_else(|| LoaderError::Encode {
            path: path.to_string(),
            encoding,
        })?;
        self.write(path, &bytes)
    }

    /// Remove a file. Returns whether it existed.
    pub fn remove(&self, path: &str) -> Result<bool> {
        let key = Self::key(path)?;
        Ok(self.write_state()?.files.remove(&key).is_some())
    }

    /// Override the modification time of an existing file.
    pub fn set_modified(&self, path: &str, modified: SystemTime) -> Result<()> {
        let key = Self::key(path)?;
        let mut state = self.write_state()?;
        match state.files.get_mut(&key) {
            Some(file) => {
                file.modified = modified;
                Ok(())
            }
            None => Err(LoaderError::ResourceNotFound {
                path: path.to_string(),
            }),
        }
    }

    fn key(path: &str) -> Result<String> {
        normalize(path)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| LoaderError::ResourceNotFound {
                path: path.to_string(),
            })
    }

    fn write_state(&self) -> Result<std::sync::RwLockWriteGuard<'_, MemoryState>> {
        self.state
            .write()
            .map_err(|_| anyhow::anyhow!("memory filesystem lock poisoned").into())
    }

    fn lookup(&self, path: &str) -> Result<MemoryFile> {
        let key = Self::key(path)?;
        let state = self
            .state
            .read()
            .map_err(|_| anyhow::anyhow!("memory filesystem lock poisoned"))?;
        state
            .files
            .get(&key)
            .cloned()
            .ok_or_else(|| LoaderError::ResourceNotFound {
                path: path.to_string(),
            })
    }
}

impl Filesystem for MemoryFs {
    fn is_file(&self, path: &str) -> Result<bool> {
        let Some(key) = normalize(path) else {
            return Ok(false);
        };
        let state = self
            .state
            .read()
            .map_err(|_| anyhow::anyhow!("memory filesystem lock poisoned"))?;
        Ok(state.files.contains_key(&key))
    }

    fn open_read(&self, path: &str) -> Result<Box<dyn Read + '_>> {
        let file = self.lookup(path)?;
        Ok(Box::new(Cursor::new(file.data)))
    }

    fn modified(&self, path: &str) -> Result<SystemTime> {
        Ok(self.lookup(path)?.modified)
    }

    fn walk_files(&self) -> Result<Vec<String>> {
        let state = self
            .state
            .read()
            .map_err(|_| anyhow::anyhow!("memory filesystem lock poisoned"))?;
        Ok(state.files.keys().map(|k| abspath(k)).collect())
    }

    fn describe(&self) -> String {
        "MemoryFs".to_string()
    }
}
