//! Content extraction engine for the Los Libros reader
//!
//! Turns EPUB and comic archives (CBZ/CBR) into a render-agnostic document
//! model: ordered chapters holding paragraphs as plain text and as markup,
//! plus typography hints and the book's stylesheets. A lighter metadata path
//! produces title, author and cover for library listings.
//!
//! Extraction never fails from the caller's point of view. Unreadable books
//! come back as a one-chapter sentinel document whose
//! [`ContentStatus`](document::ContentStatus) says what went wrong.
//!
//! ```no_run
//! let content = book_processor::extract_content("books/dune.epub", "EPUB");
//! for chapter in &content.chapters {
//!     println!("{}: {} paragraphs", chapter.title, chapter.paragraphs.len());
//! }
//! ```

use std::path::Path;

pub mod archive;
pub mod config;
pub mod document;
pub mod error;
pub mod extractor;
pub mod formats;
pub mod markup;
pub mod media;

pub use config::Config;
pub use document::*;
pub use error::{ExtractError, Result};
pub use extractor::Extractor;
pub use formats::Format;

/// Extract a book's content with the default configuration
pub fn extract_content<P: AsRef<Path>>(path: P, format_tag: &str) -> BookContent {
    Extractor::default().extract_content(path, format_tag)
}

/// Extract listing metadata with the default configuration
pub fn extract_metadata<P: AsRef<Path>>(path: P) -> BookMetadata {
    Extractor::default().extract_metadata(path)
}
