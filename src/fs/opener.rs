//! Locator strings to filesystem backends.
//!
//! | Locator | Backend |
//! |---|---|
//! | `osfs://<dir>`, `file://<dir>`, `<dir>` | [`OsFs`] |
//! | `mem://` | [`MemoryFs`] (empty) |
//! | `tar://<archive>` | [`TarFs`], gzip detected by extension |
//! | `tgz://<archive>` | [`TarFs`], gzip forced |
//! | `http://...`, `https://...` | [`HttpFs`] |

use crate::error::{LoaderError, Result};
use crate::fs::{Filesystem, HttpFs, MemoryFs, OsFs, TarFs};
use std::sync::Arc;

/// Open the filesystem a locator names.
///
/// Fails with [`LoaderError::UnsupportedScheme`] for unknown schemes and with
/// the backend's own open error when the target cannot be used.
pub fn open_fs(locator: &str) -> Result<Arc<dyn Filesystem>> {
    let Some((scheme, rest)) = locator.split_once("://") else {
        return Ok(Arc::new(OsFs::new(locator)?));
    };

    let fs: Arc<dyn Filesystem> = match scheme.to_ascii_lowercase().as_str() {
        "osfs" | "file" => Arc::new(OsFs::new(non_empty(rest, locator)?)?),
        "mem" => Arc::new(MemoryFs::new()),
        "tar" => Arc::new(TarFs::open(non_empty(rest, locator)?)?),
        "tgz" => Arc::new(TarFs::open_with(non_empty(rest, locator)?, true)?),
        "http" | "https" => Arc::new(HttpFs::new(locator)?),
        other => {
            return Err(LoaderError::UnsupportedScheme {
                scheme: other.to_string(),
                locator: locator.to_string(),
            })
        }
    };

    tracing::debug!("Opened {} from '{}'", fs.describe(), locator);
    Ok(fs)
}

fn non_empty<'a>(rest: &'a str, locator: &str) -> Result<&'a str> {
    if rest.is_empty() {
        return Err(LoaderError::Open {
            locator: locator.to_string(),
            message: "locator names no path".to_string(),
        });
    }
    Ok(rest)
}
