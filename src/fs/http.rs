//! Remote filesystem served over HTTP/HTTPS.
//!
//! Files are addressed by joining the template path onto a base URL.
//! Existence is probed with `HEAD`, contents are fetched with `GET`, and the
//! `Last-Modified` header supplies modification times. HTTP has no directory
//! listing, so walking reports [`LoaderError::Unsupported`].

use crate::error::{LoaderError, Result};
use crate::fs::{normalize, Filesystem};
use anyhow::{anyhow, Context};
use chrono::DateTime;
use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use std::io::Read;
use std::time::{Duration, SystemTime};

/// A read-only filesystem rooted at an HTTP(S) base URL.
#[derive(Debug, Clone)]
pub struct HttpFs {
    base: String,
    client: Client,
    timeout: Duration,
}

impl HttpFs {
    /// Create a remote filesystem with a 30-second request timeout.
    pub fn new(base: &str) -> Result<Self> {
        Self::with_timeout(base, Duration::from_secs(30))
    }

    /// Create a remote filesystem with a custom request timeout.
    pub fn with_timeout(base: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(format!("fsloader/{}", crate::VERSION))
            .timeout(timeout)
            .build()
            .map_err(|e| LoaderError::Open {
                locator: base.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            base: base.trim_end_matches('/').to_string(),
            client,
            timeout,
        })
    }

    /// The base URL, without a trailing slash.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// The configured request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn file_url(&self, path: &str) -> Option<String> {
        let key = normalize(path).filter(|k| !k.is_empty())?;
        Some(format!("{}/{}", self.base, key))
    }

    fn require_url(&self, path: &str) -> Result<String> {
        self.file_url(path)
            .ok_or_else(|| LoaderError::ResourceNotFound {
                path: path.to_string(),
            })
    }

    fn head(&self, path: &str) -> Result<Response> {
        let url = self.require_url(path)?;
        let response = self
            .client
            .head(&url)
            .send()
            .with_context(|| format!("HEAD {}", url))?;
        Self::check_status(response, path, &url)
    }

    fn check_status(response: Response, path: &str, url: &str) -> Result<Response> {
        if response.status() == StatusCode::NOT_FOUND {
            return Err(LoaderError::ResourceNotFound {
                path: path.to_string(),
            });
        }
        if !response.status().is_success() {
            return Err(Self::status_error(response.status(), url));
        }
        Ok(response)
    }

    fn status_error(status: StatusCode, url: &str) -> LoaderError {
        anyhow!("HTTP {} fetching {}", status, url).into()
    }
}

impl Filesystem for HttpFs {
    fn is_file(&self, path: &str) -> Result<bool> {
        match self.head(path) {
            Ok(_) => Ok(true),
            Err(LoaderError::ResourceNotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn open_read(&self, path: &str) -> Result<Box<dyn Read + '_>> {
        let url = self.require_url(path)?;
        let response = self
            .client
            .get(&url)
            .send()
            .with_context(|| format!("GET {}", url))?;
        let response = Self::check_status(response, path, &url)?;
        Ok(Box::new(response))
    }

    fn modified(&self, path: &str) -> Result<SystemTime> {
        let response = self.head(path)?;
        response
            .headers()
            .get(reqwest::header::LAST_MODIFIED)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| DateTime::parse_from_rfc2822(v).ok())
            .map(SystemTime::from)
            .ok_or_else(|| LoaderError::MissingMetadata {
                path: path.to_string(),
            })
    }

    fn url(&self, path: &str) -> Option<String> {
        self.file_url(path)
    }

    fn walk_files(&self) -> Result<Vec<String>> {
        Err(LoaderError::Unsupported {
            operation: "walk",
            backend: self.describe(),
        })
    }

    fn describe(&self) -> String {
        format!("HttpFs({})", self.base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::time::UNIX_EPOCH;

    #[test]
    fn default_timeout_is_30_seconds() {
        let fs = HttpFs::new("https://example.com/templates/").unwrap();
        assert_eq!(fs.timeout(), Duration::from_secs(30));
        assert_eq!(fs.base(), "https://example.com/templates");
    }

    #[test]
    fn url_joins_base_and_path() {
        let fs = HttpFs::new("https://example.com/templates").unwrap();
        assert_eq!(
            fs.url("/dir/nested.tpl").as_deref(),
            Some("https://example.com/templates/dir/nested.tpl")
        );
        assert!(fs.url("../escape.tpl").is_none());
        assert!(fs.syspath("dir/nested.tpl").is_none());
    }

    #[test]
    fn is_file_uses_head() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(Method::HEAD).path("/top.tpl");
            then.status(200);
        });

        let fs = HttpFs::new(&server.base_url()).unwrap();
        assert!(fs.is_file("top.tpl").unwrap());
        assert!(!fs.is_file("missing.tpl").unwrap());
        assert!(!fs.is_file("../escape.tpl").unwrap());
        mock.assert_calls(1);
    }

    #[test]
    fn is_file_server_error_is_reported() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(Method::HEAD).path("/broken.tpl");
            then.status(500);
        });

        let fs = HttpFs::new(&server.base_url()).unwrap();
        let err = fs.is_file("broken.tpl").unwrap_err();
        assert!(matches!(err, LoaderError::Other(_)));
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn open_read_fetches_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/dir/nested.tpl");
            then.status(200).body("A");
        });

        let fs = HttpFs::new(&server.base_url()).unwrap();
        let mut text = String::new();
        fs.open_read("dir/nested.tpl")
            .unwrap()
            .read_to_string(&mut text)
            .unwrap();
        assert_eq!(text, "A");
    }

    #[test]
    fn open_read_server_error_is_wrapped() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/broken.tpl");
            then.status(500);
        });

        let fs = HttpFs::new(&server.base_url()).unwrap();
        let err = fs.open_read("broken.tpl").err().unwrap();
        assert!(matches!(err, LoaderError::Other(_)));
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn modified_parses_last_modified() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(Method::HEAD).path("/top.tpl");
            then.status(200)
                .header("Last-Modified", "Sat, 01 Jan 2000 00:00:00 GMT");
        });

        let fs = HttpFs::new(&server.base_url()).unwrap();
        assert_eq!(
            fs.modified("top.tpl").unwrap(),
            UNIX_EPOCH + Duration::from_secs(946_684_800)
        );
    }

    #[test]
    fn modified_without_header_is_missing_metadata() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(Method::HEAD).path("/top.tpl");
            then.status(200);
        });

        let fs = HttpFs::new(&server.base_url()).unwrap();
        assert!(matches!(
            fs.modified("top.tpl"),
            Err(LoaderError::MissingMetadata { .. })
        ));
    }

    #[test]
    fn walk_is_unsupported() {
        let fs = HttpFs::new("https://example.com").unwrap();
        assert!(matches!(
            fs.walk_files(),
            Err(LoaderError::Unsupported { operation: "walk", .. })
        ));
    }
}
