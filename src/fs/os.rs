//! Disk-backed filesystem rooted at a directory.

use crate::error::{LoaderError, Result};
use crate::fs::{abspath, normalize, Filesystem};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// A directory on the local disk.
///
/// All paths are resolved under the root; the backend reports native paths
/// through [`Filesystem::syspath`] and `file://` URLs through [`Filesystem::url`].
#[derive(Debug, Clone)]
pub struct OsFs {
    root: PathBuf,
}

impl OsFs {
    /// Open a directory. Fails if `root` does not exist or is not a directory.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let locator = root.display().to_string();

        if !root.is_dir() {
            return Err(LoaderError::Open {
                locator,
                message: "root is not an existing directory".to_string(),
            });
        }

        let root = std::path::absolute(root).map_err(|e| LoaderError::Open {
            locator,
            message: e.to_string(),
        })?;

        Ok(Self { root })
    }

    /// The directory this filesystem is rooted at.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let key = normalize(path)?;
        if key.is_empty() {
            Some(self.root.clone())
        } else {
            Some(self.root.join(key))
        }
    }

    fn walk_recursive(&self, dir: &Path, found: &mut Vec<String>) -> Result<()> {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            let file_type = entry.file_type()?;

            // Symlinked directories are not descended.
            if file_type.is_dir() {
                self.walk_recursive(&path, found)?;
            } else if path.is_file() {
                if let Ok(relative) = path.strip_prefix(&self.root) {
                    let parts: Vec<String> = relative
                        .components()
                        .map(|c| c.as_os_str().to_string_lossy().into_owned())
                        .collect();
                    found.push(abspath(&parts.join("/")));
                }
            }
        }

        Ok(())
    }
}

impl Filesystem for OsFs {
    fn is_file(&self, path: &str) -> Result<bool> {
        let Some(full) = self.resolve(path) else {
            return Ok(false);
        };

        match fs::metadata(&full) {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
                ) =>
            {
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn open_read(&self, path: &str) -> Result<Box<dyn Read + '_>> {
        let full = self
            .resolve(path)
            .ok_or_else(|| LoaderError::ResourceNotFound {
                path: path.to_string(),
            })?;

        match fs::File::open(&full) {
            Ok(file) => Ok(Box::new(file)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(LoaderError::ResourceNotFound {
                path: path.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    fn modified(&self, path: &str) -> Result<SystemTime> {
        let full = self
            .resolve(path)
            .ok_or_else(|| LoaderError::ResourceNotFound {
                path: path.to_string(),
            })?;

        let metadata = fs::metadata(&full).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                LoaderError::ResourceNotFound {
                    path: path.to_string(),
                }
            } else {
                e.into()
            }
        })?;

        metadata.modified().map_err(|_| LoaderError::MissingMetadata {
            path: path.to_string(),
        })
    }

    fn syspath(&self, path: &str) -> Option<PathBuf> {
        self.resolve(path)
    }

    fn url(&self, path: &str) -> Option<String> {
        self.resolve(path)
            .map(|p| format!("file://{}", p.display()))
    }

    fn walk_files(&self) -> Result<Vec<String>> {
        let mut found = Vec::new();
        self.walk_recursive(&self.root, &mut found)?;
        Ok(found)
    }

    fn describe(&self) -> String {
        format!("OsFs({})", self.root.display())
    }
}
