//! Error types for fsloader operations.
//!
//! This module defines [`LoaderError`], the error type shared by the
//! filesystem backends and the template loader, and a [`Result`] type alias.
//!
//! # Error Handling Strategy
//!
//! - The loader manufactures exactly one error itself: [`LoaderError::TemplateNotFound`]
//! - [`LoaderError::MissingMetadata`] and walk-time [`LoaderError::Unsupported`]
//!   are interpreted by the loader and never reach the caller from a lookup
//! - Everything else (open failures, I/O, decode errors) passes through unchanged
//! - Use `anyhow::Error` (via `LoaderError::Other`) for unexpected backend errors

use crate::encoding::Encoding;
use std::path::PathBuf;
use thiserror::Error;

/// Core error type for fsloader operations.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// No backend in the search chain holds the requested template.
    #[error("Template not found: {name}")]
    TemplateNotFound { name: String },

    /// A locator could not be turned into a filesystem.
    #[error("Failed to open filesystem '{locator}': {message}")]
    Open { locator: String, message: String },

    /// The locator names a scheme no backend understands.
    #[error("Unsupported filesystem scheme '{scheme}' in '{locator}'")]
    UnsupportedScheme { scheme: String, locator: String },

    /// The backend keeps no modification time for this resource.
    #[error("No modification time available for {path}")]
    MissingMetadata { path: String },

    /// The backend cannot perform the requested operation at all.
    #[error("Operation '{operation}' is not supported by {backend}")]
    Unsupported {
        operation: &'static str,
        backend: String,
    },

    /// A path inside a backend does not exist.
    #[error("Resource not found: {path}")]
    ResourceNotFound { path: String },

    /// A file would sit where a directory already is, or inside another file.
    #[error("Cannot write {path}: conflicts with existing {existing}")]
    PathConflict { path: String, existing: String },

    /// File contents are not valid in the configured encoding.
    #[error("Failed to decode {path} as {encoding}")]
    Decode { path: String, encoding: Encoding },

    /// Text holds characters the configured encoding cannot represent.
    #[error("Cannot encode {path} as {encoding}")]
    Encode { path: String, encoding: Encoding },

    /// Encoding name not recognized.
    #[error("Unknown encoding: {name}")]
    UnknownEncoding { name: String },

    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LoaderError {
    /// Whether this error is the loader's not-found signal.
    pub fn is_template_not_found(&self) -> bool {
        matches!(self, Self::TemplateNotFound { .. })
    }
}

/// Result type alias for fsloader operations.
pub type Result<T> = std::result::Result<T, LoaderError>;
