//! Text codecs for template contents.
//!
//! Templates are read as bytes and decoded with the loader's configured
//! [`Encoding`]. Codec names follow the usual spellings (`utf-8`, `latin-1`,
//! `ascii`) and accept the common aliases.

use crate::error::LoaderError;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// A text encoding used to decode template files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum Encoding {
    /// UTF-8, rejecting invalid sequences.
    #[default]
    Utf8,
    /// ISO-8859-1. Every byte maps to one character, so decoding never fails.
    Latin1,
    /// 7-bit US-ASCII.
    Ascii,
}

impl Encoding {
    /// Canonical codec name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Latin1 => "latin-1",
            Self::Ascii => "ascii",
        }
    }

    /// Decode raw file contents, or `None` if they are not valid in this encoding.
    pub fn decode(self, bytes: &[u8]) -> Option<String> {
        match self {
            Self::Utf8 => std::str::from_utf8(bytes).ok().map(str::to_owned),
            Self::Latin1 => Some(bytes.iter().map(|&b| char::from(b)).collect()),
            Self::Ascii => {
                if bytes.is_ascii() {
                    Some(bytes.iter().map(|&b| char::from(b)).collect())
                } else {
                    None
                }
            }
        }
    }

    /// Encode text, or `None` if it holds characters this encoding cannot represent.
    pub fn encode(self, text: &str) -> Option<Vec<u8>> {
        match self {
            Self::Utf8 => Some(text.as_bytes().to_vec()),
            Self::Latin1 => text.chars().map(|c| u8::try_from(u32::from(c)).ok()).collect(),
            Self::Ascii => text.is_ascii().then(|| text.as_bytes().to_vec()),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Encoding {
    type Err = LoaderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "utf-8" | "utf8" => Ok(Self::Utf8),
            "latin-1" | "latin1" | "iso-8859-1" | "iso8859-1" | "l1" => Ok(Self::Latin1),
            "ascii" | "us-ascii" => Ok(Self::Ascii),
            _ => Err(LoaderError::UnknownEncoding {
                name: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for Encoding {
    type Error = LoaderError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
