//! Format-specific extractors
//!
//! - [`epub`]: spine-ordered text chapters, typography and cover metadata
//! - [`comic`]: zip-based image archives (CBZ, and CBR files that are really zips)
//! - [`pdf`]: placeholder only

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub mod comic;
pub mod epub;
pub mod pdf;

/// Book format
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Epub,
    Cbz,
    Cbr,
    Pdf,
    /// Any other tag, kept verbatim
    Unknown(String),
}

impl Format {
    /// Parse a format tag, ignoring case
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "epub" => Self::Epub,
            "cbz" => Self::Cbz,
            "cbr" => Self::Cbr,
            "pdf" => Self::Pdf,
            _ => Self::Unknown(tag.to_string()),
        }
    }

    /// Detect format from a file's extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_tag)
            .unwrap_or_else(|| Self::Unknown(String::new()))
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Epub => f.write_str("EPUB"),
            Self::Cbz => f.write_str("CBZ"),
            Self::Cbr => f.write_str("CBR"),
            Self::Pdf => f.write_str("PDF"),
            Self::Unknown(tag) => f.write_str(tag),
        }
    }
}
