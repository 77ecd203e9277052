//! Templates embedded into the binary at compile time.

use crate::error::{LoaderError, Result};
use crate::fs::{abspath, normalize, Filesystem};
use include_dir::{Dir, File};
use std::io::Read;
use std::time::SystemTime;

/// A read-only filesystem over a directory captured with [`include_dir::include_dir!`].
///
/// Embedded files carry no modification time, so templates served from here
/// are always reported stale.
///
/// ```ignore
/// use fsloader::fs::EmbeddedFs;
/// use include_dir::{include_dir, Dir};
///
/// static TEMPLATES: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/templates");
/// let fs = EmbeddedFs::new(&TEMPLATES);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct EmbeddedFs {
    dir: &'static Dir<'static>,
}

impl EmbeddedFs {
    /// Wrap an embedded directory.
    pub fn new(dir: &'static Dir<'static>) -> Self {
        Self { dir }
    }

    fn file(&self, path: &str) -> Option<&'static File<'static>> {
        let key = normalize(path)?;
        if key.is_empty() {
            return None;
        }
        self.dir.get_file(key)
    }

    fn collect(dir: &Dir<'static>, found: &mut Vec<String>) {
        for file in dir.files() {
            let parts: Vec<String> = file
                .path()
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            found.push(abspath(&parts.join("/")));
        }
        for sub in dir.dirs() {
            Self::collect(sub, found);
        }
    }
}

impl Filesystem for EmbeddedFs {
    fn is_file(&self, path: &str) -> Result<bool> {
        Ok(self.file(path).is_some())
    }

    fn open_read(&self, path: &str) -> Result<Box<dyn Read + '_>> {
        let file = self.file(path).ok_or_else(|| LoaderError::ResourceNotFound {
            path: path.to_string(),
        })?;
        Ok(Box::new(file.contents()))
    }

    fn modified(&self, path: &str) -> Result<SystemTime> {
        if self.file(path).is_none() {
            return Err(LoaderError::ResourceNotFound {
                path: path.to_string(),
            });
        }
        Err(LoaderError::MissingMetadata {
            path: path.to_string(),
        })
    }

    fn walk_files(&self) -> Result<Vec<String>> {
        let mut found = Vec::new();
        Self::collect(self.dir, &mut found);
        Ok(found)
    }

    fn describe(&self) -> String {
        format!("EmbeddedFs({})", self.dir.path().display())
    }
}
