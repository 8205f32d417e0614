//! EPUB content extraction
//!
//! Walks the spine in reading order, segments each content document into
//! paragraphs and attaches typography mined from the manifest stylesheets.

use std::io::{Read, Seek};

use tracing::{debug, info, warn};

pub mod metadata;
pub mod opf;
pub mod typography;

pub use metadata::extract_metadata;

use crate::archive::Archive;
use crate::config::Config;
use crate::document::{BookContent, Chapter, FailureReason, TitleSource};
use crate::error::Result;
use crate::markup;

/// Message for books whose spine yields no text
pub const NO_CONTENT_MESSAGE: &str = "No readable text was found in this book.";

/// Extract every non-empty spine document as a chapter
pub fn extract_content<R: Read + Seek>(
    archive: &mut Archive<R>,
    config: &Config,
) -> Result<BookContent> {
    let package = opf::load_package(archive)?;
    if package.spine.is_empty() {
        return Err(FailureReason::EmptySpine.into());
    }

    let mut chapters = Vec::new();
    for idref in &package.spine {
        let Some(item) = package.manifest.get(idref) else {
            debug!("Spine entry '{}' has no manifest item, skipping", idref);
            continue;
        };

        let path = package.resolve(&item.href);
        let html = match archive.read_string(&path) {
            Ok(Some(html)) => html,
            Ok(None) => {
                debug!("Spine document {} not found in archive, skipping", path);
                continue;
            }
            Err(e) => {
                warn!("Failed to read spine document {}: {}", path, e);
                continue;
            }
        };

        let parsed = markup::parse_chapter(&html, config.max_title_chars);
        if parsed.paragraphs.is_empty() {
            debug!("Spine document {} has no paragraphs, dropping", path);
            continue;
        }

        // Positional titles count emitted chapters only
        let number = chapters.len() + 1;
        let (title, title_source) = parsed
            .title
            .unwrap_or_else(|| (format!("Chapter {}", number), TitleSource::Positional));

        debug!(
            "Chapter {} from {}: {} paragraphs via {:?}, title via {:?}",
            number,
            path,
            parsed.paragraphs.len(),
            parsed.segmentation,
            title_source
        );

        let mut chapter = Chapter::from_paragraphs(title, parsed.paragraphs);
        chapter.title_source = Some(title_source);
        chapter.segmentation = parsed.segmentation;
        chapters.push(chapter);
    }

    let mut content = BookContent::from_chapters(chapters, false, NO_CONTENT_MESSAGE);
    if content.is_complete() {
        let typography = typography::extract(archive, &package);
        content.font_family = typography.font_family;
        content.font_size_px = typography.font_size_px;
        content.css = typography.css;
    }

    info!(
        "Extracted {} chapters from {} spine entries",
        content.chapters.len(),
        package.spine.len()
    );
    Ok(content)
}
