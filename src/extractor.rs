//! Format dispatch
//!
//! Routes a book to its format extractor and converts every internal error
//! into a well-formed result, so callers always receive a renderable
//! document or usable listing metadata.

use std::io::Cursor;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::archive::Archive;
use crate::config::Config;
use crate::document::{BookContent, BookMetadata};
use crate::error::Result;
use crate::formats::{comic, epub, pdf, Format};

type MemoryArchive = Archive<Cursor<Vec<u8>>>;

/// Content and metadata extractor
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    config: Config,
}

impl Extractor {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Extract the full content of the book at `path`.
    ///
    /// `format_tag` is matched case-insensitively (`EPUB`, `CBZ`, `CBR`, `PDF`).
    pub fn extract_content<P: AsRef<Path>>(&self, path: P, format_tag: &str) -> BookContent {
        let path = path.as_ref();
        let format = Format::from_tag(format_tag);
        info!("Extracting {} content from {}", format, path.display());

        self.content_for(&format, || Archive::open(path))
    }

    /// Extract content from a book already held in memory
    pub fn extract_content_from_bytes(&self, bytes: Vec<u8>, format: &Format) -> BookContent {
        self.content_for(format, || Archive::from_bytes(bytes))
    }

    /// Title, author and cover for the book at `path`, by file extension
    pub fn extract_metadata<P: AsRef<Path>>(&self, path: P) -> BookMetadata {
        let path = path.as_ref();
        let format = Format::from_path(path);
        debug!("Extracting {} metadata from {}", format, path.display());

        metadata_for(&format, &file_title(path), || Archive::open(path))
    }

    /// Metadata for an in-memory book; `file_name` supplies the format and fallback title
    pub fn extract_metadata_from_bytes(&self, bytes: Vec<u8>, file_name: &str) -> BookMetadata {
        let format = Format::from_path(file_name);
        metadata_for(&format, &file_title(Path::new(file_name)), || {
            Archive::from_bytes(bytes)
        })
    }

    fn content_for<F>(&self, format: &Format, open: F) -> BookContent
    where
        F: FnOnce() -> Result<MemoryArchive>,
    {
        let result = match format {
            Format::Pdf => return pdf::placeholder(),
            Format::Unknown(tag) => {
                return BookContent::unsupported(tag, &format!("Unsupported format: {}", tag))
            }
            Format::Epub => {
                open().and_then(|mut archive| epub::extract_content(&mut archive, &self.config))
            }
            Format::Cbz | Format::Cbr => {
                open().and_then(|mut archive| comic::extract_content(&mut archive, &self.config))
            }
        };

        result.unwrap_or_else(|e| {
            warn!("{} extraction failed: {}", format, e);
            BookContent::failed(e.into_failure())
        })
    }
}

fn metadata_for<F>(format: &Format, title: &str, open: F) -> BookMetadata
where
    F: FnOnce() -> Result<MemoryArchive>,
{
    let result = match format {
        Format::Epub => open().and_then(|mut archive| epub::extract_metadata(&mut archive, title)),
        Format::Cbz => open().and_then(|mut archive| comic::extract_metadata(&mut archive, title)),
        Format::Cbr | Format::Pdf | Format::Unknown(_) => return BookMetadata::from_file_name(title),
    };

    result.unwrap_or_else(|e| {
        warn!("{} metadata extraction failed, using file name: {}", format, e);
        BookMetadata::from_file_name(title)
    })
}

/// File name without its extension
fn file_title(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
