//! Tar archive filesystem.
//!
//! The archive is read once when opened and served from memory afterwards,
//! so modification times reflect the archive entries, not later changes to
//! the archive file.

use crate::error::{LoaderError, Result};
use crate::fs::{abspath, normalize, Filesystem};
use flate2::read::GzDecoder;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone)]
struct ArchiveEntry {
    data: Vec<u8>,
    mtime: u64,
}

/// A read-only filesystem over the regular files of a tar archive.
#[derive(Debug, Clone)]
pub struct TarFs {
    archive: PathBuf,
    entries: BTreeMap<String, ArchiveEntry>,
}

impl TarFs {
    /// Open an archive, detecting gzip compression from the file extension
    /// (`.gz`, `.tgz`).
    pub fn open(archive: impl AsRef<Path>) -> Result<Self> {
        let archive = archive.as_ref();
        let gzip = archive
            .extension()
            .map(|e| e == "gz" || e == "tgz")
            .unwrap_or(false);
        Self::open_with(archive, gzip)
    }

    /// Open an archive with explicit compression.
    pub fn open_with(archive: impl AsRef<Path>, gzip: bool) -> Result<Self> {
        let archive = archive.as_ref();
        let open_error = |message: String| LoaderError::Open {
            locator: archive.display().to_string(),
            message,
        };

        let file = File::open(archive).map_err(|e| open_error(e.to_string()))?;
        let entries = if gzip {
            Self::read_entries(GzDecoder::new(file))
        } else {
            Self::read_entries(file)
        }
        .map_err(|e| open_error(e.to_string()))?;

        tracing::debug!(
            "Loaded {} entries from archive {}",
            entries.len(),
            archive.display()
        );

        Ok(Self {
            archive: archive.to_path_buf(),
            entries,
        })
    }

    /// Path of the archive file.
    pub fn archive(&self) -> &Path {
        &self.archive
    }

    fn read_entries<R: Read>(reader: R) -> std::io::Result<BTreeMap<String, ArchiveEntry>> {
        let mut archive = tar::Archive::new(reader);
        let mut entries = BTreeMap::new();

        for entry in archive.entries()? {
            let mut entry = entry?;
            if !entry.header().entry_type().is_file() {
                continue;
            }

            let raw_path = entry.path()?.to_string_lossy().into_owned();
            let Some(key) = normalize(&raw_path).filter(|k| !k.is_empty()) else {
                continue;
            };

            let mtime = entry.header().mtime()?;
            let mut data = Vec::new();
            entry.read_to_end(&mut data)?;
            entries.insert(key, ArchiveEntry { data, mtime });
        }

        Ok(entries)
    }

    fn entry(&self, path: &str) -> Result<&ArchiveEntry> {
        normalize(path)
            .and_then(|key| self.entries.get(&key))
            .ok_or_else(|| LoaderError::ResourceNotFound {
                path: path.to_string(),
            })
    }
}

impl Filesystem for TarFs {
    fn is_file(&self, path: &str) -> Result<bool> {
        Ok(self.entry(path).is_ok())
    }

    fn open_read(&self, path: &str) -> Result<Box<dyn Read + '_>> {
        let entry = self.entry(path)?;
        Ok(Box::new(Cursor::new(entry.data.as_slice())))
    }

    fn modified(&self, path: &str) -> Result<SystemTime> {
        let entry = self.entry(path)?;
        // Header mtimes past what SystemTime can hold are treated as absent.
        UNIX_EPOCH
            .checked_add(Duration::from_secs(entry.mtime))
            .ok_or_else(|| LoaderError::MissingMetadata {
                path: path.to_string(),
            })
    }

    fn url(&self, path: &str) -> Option<String> {
        let key = normalize(path)?;
        Some(format!("tar://{}!/{}", self.archive.display(), key))
    }

    fn walk_files(&self) -> Result<Vec<String>> {
        Ok(self.entries.keys().map(|k| abspath(k)).collect())
    }

    fn describe(&self) -> String {
        format!("TarFs({})", self.archive.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::TempDir;

    fn append<W: Write>(builder: &mut tar::Builder<W>, path: &str, body: &[u8], mtime: u64) {
        let mut header = tar::Header::new_gnu();
        header.set_size(body.len() as u64);
        header.set_mode(0o644);
        header.set_mtime(mtime);
        header.set_cksum();
        builder.append_data(&mut header, path, body).unwrap();
    }

    fn write_tar(path: &Path) {
        let file = File::create(path).unwrap();
        let mut builder = tar::Builder::new(file);
        append(&mut builder, "dir/nested.tpl", b"A", 1_000);
        append(&mut builder, "top.tpl", b"B", 2_000);
        builder.finish().unwrap();
    }

    fn write_tgz(path: &Path) {
        let file = File::create(path).unwrap();
        let encoder = GzEncoder::new(file, Compression::default());
        let mut builder = tar::Builder::new(encoder);
        append(&mut builder, "top.tpl", b"gz", 3_000);
        builder.into_inner().unwrap().finish().unwrap();
    }

    #[test]
    fn reads_plain_tar() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("templates.tar");
        write_tar(&path);

        let fs = TarFs::open(&path).unwrap();
        assert!(fs.is_file("dir/nested.tpl").unwrap());
        assert!(!fs.is_file("dir").unwrap());

        let mut text = String::new();
        fs.open_read("top.tpl")
            .unwrap()
            .read_to_string(&mut text)
            .unwrap();
        assert_eq!(text, "B");
    }

    #[test]
    fn reads_gzipped_tar_by_extension() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("templates.tar.gz");
        write_tgz(&path);

        let fs = TarFs::open(&path).unwrap();
        let mut text = String::new();
        fs.open_read("top.tpl")
            .unwrap()
            .read_to_string(&mut text)
            .unwrap();
        assert_eq!(text, "gz");
    }

    #[test]
    fn modified_comes_from_header() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("templates.tar");
        write_tar(&path);

        let fs = TarFs::open(&path).unwrap();
        assert_eq!(
            fs.modified("top.tpl").unwrap(),
            UNIX_EPOCH + Duration::from_secs(2_000)
        );
    }

    #[test]
    fn unrepresentable_mtime_is_missing_metadata() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("future.tar");
        {
            let mut builder = tar::Builder::new(File::create(&path).unwrap());
            append(&mut builder, "top.tpl", b"B", u64::MAX);
            builder.finish().unwrap();
        }

        let fs = TarFs::open(&path).unwrap();
        assert!(matches!(
            fs.modified("top.tpl"),
            Err(LoaderError::MissingMetadata { .. })
        ));
    }

    #[test]
    fn url_names_archive_and_entry() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("templates.tar");
        write_tar(&path);

        let fs = TarFs::open(&path).unwrap();
        assert_eq!(
            fs.url("dir/nested.tpl").unwrap(),
            format!("tar://{}!/dir/nested.tpl", path.display())
        );
        assert!(fs.syspath("dir/nested.tpl").is_none());
    }

    #[test]
    fn walk_lists_entries() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("templates.tar");
        write_tar(&path);

        let fs = TarFs::open(&path).unwrap();
        assert_eq!(fs.walk_files().unwrap(), vec!["/dir/nested.tpl", "/top.tpl"]);
    }

    #[test]
    fn open_missing_archive_fails() {
        let temp = TempDir::new().unwrap();
        let result = TarFs::open(temp.path().join("absent.tar"));
        assert!(matches!(result, Err(LoaderError::Open { .. })));
    }

    #[test]
    fn open_corrupt_gzip_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.tgz");
        std::fs::write(&path, b"definitely not gzip").unwrap();
        assert!(matches!(TarFs::open(&path), Err(LoaderError::Open { .. })));
    }
}
