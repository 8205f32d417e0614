//! Core document types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Title used for chapters reporting an extraction failure
pub const ERROR_TITLE: &str = "Error";

/// Title used when a book yields no readable chapters
pub const EMPTY_TITLE: &str = "Empty";

/// Title used for formats the engine does not extract
pub const UNSUPPORTED_TITLE: &str = "Not Supported";

/// Author reported when the package names none
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Extracted book content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookContent {
    pub chapters: Vec<Chapter>,
    /// When set, every paragraph is an embedded image reference
    pub is_image_book: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size_px: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css: Option<String>,
    pub status: ContentStatus,
}

/// Outcome of a content extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ContentStatus {
    /// Real chapters were extracted
    Complete,
    /// The book was readable but produced no chapters
    Empty,
    /// The book could not be read
    Failed { reason: FailureReason },
    /// The format is not extracted by this engine
    Unsupported { format: String },
}

/// Why a book could not be read
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "camelCase")]
pub enum FailureReason {
    #[error("Invalid EPUB: META-INF/container.xml is missing")]
    MissingContainer,

    #[error("Invalid EPUB: container.xml does not name a package document")]
    MissingPackagePath,

    #[error("Invalid EPUB: package document '{path}' could not be read")]
    UnreadablePackage { path: String },

    #[error("Invalid EPUB: the package document defines no reading order")]
    EmptySpine,

    #[error("Could not read archive: {detail}")]
    UnreadableArchive { detail: String },

    #[error("RAR-based comic archives are not supported; repack the book as CBZ")]
    RarArchive,
}

/// A single chapter in reading order
///
/// `paragraphs` and `html_paragraphs` always have the same length: index `i`
/// of each holds the same paragraph as plain text and as markup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub title: String,
    pub paragraphs: Vec<String>,
    pub html_paragraphs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_source: Option<TitleSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segmentation: Option<SegmentationTier>,
}

/// One paragraph in both representations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    pub text: String,
    pub html: String,
}

impl Paragraph {
    /// Wrap already-plain text in a minimal paragraph element
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let html = format!("<p>{}</p>", html_escape::encode_text(&text));
        Self { text, html }
    }
}

/// Where a chapter title came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TitleSource {
    /// The document's `<title>` element
    TitleElement,
    /// The first `<h1>`/`<h2>` heading
    Heading,
    /// A positional "Chapter N" label
    Positional,
}

/// Which paragraph segmentation tier produced a chapter's paragraphs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SegmentationTier {
    /// `<p>` blocks
    Paragraphs,
    /// `<div>` blocks
    Divisions,
    /// Blank-line separated body text
    PlainText,
}

/// Library-listing metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookMetadata {
    pub title: String,
    pub author: String,
    /// Embedded image reference, or empty when no cover was found
    pub cover: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_source: Option<CoverSource>,
}

/// Which cover heuristic matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CoverSource {
    /// `<meta name="cover" content="...">` naming a manifest id
    MetaReference,
    /// A manifest item with `properties="cover-image"`
    CoverImageProperty,
    /// An archive entry whose name contains "cover"
    ArchiveScan,
    /// The first page of a comic archive
    FirstPage,
}

impl Chapter {
    /// Build a chapter from paired paragraphs
    pub fn from_paragraphs(title: impl Into<String>, paragraphs: Vec<Paragraph>) -> Self {
        let (paragraphs, html_paragraphs) = paragraphs
            .into_iter()
            .map(|p| (p.text, p.html))
            .unzip();

        Self {
            title: title.into(),
            paragraphs,
            html_paragraphs,
            title_source: None,
            segmentation: None,
        }
    }

    /// Single-paragraph chapter carrying a message
    pub fn sentinel(title: &str, message: &str) -> Self {
        Self::from_paragraphs(title, vec![Paragraph::from_text(message)])
    }

    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }
}

impl BookContent {
    /// Assemble a document from extracted chapters.
    ///
    /// Chapters without paragraphs are dropped; if none remain the result is
    /// the `Empty` sentinel carrying `empty_message`.
    pub fn from_chapters(chapters: Vec<Chapter>, is_image_book: bool, empty_message: &str) -> Self {
        let chapters: Vec<Chapter> = chapters.into_iter().filter(|c| !c.is_empty()).collect();
        if chapters.is_empty() {
            return Self::empty(empty_message);
        }

        Self {
            chapters,
            is_image_book,
            font_family: None,
            font_size_px: None,
            css: None,
            status: ContentStatus::Complete,
        }
    }

    pub fn empty(message: &str) -> Self {
        Self::sentinel(EMPTY_TITLE, message, ContentStatus::Empty)
    }

    pub fn failed(reason: FailureReason) -> Self {
        let message = reason.to_string();
        Self::sentinel(ERROR_TITLE, &message, ContentStatus::Failed { reason })
    }

    pub fn unsupported(format: &str, message: &str) -> Self {
        Self::sentinel(
            UNSUPPORTED_TITLE,
            message,
            ContentStatus::Unsupported {
                format: format.to_string(),
            },
        )
    }

    fn sentinel(title: &str, message: &str, status: ContentStatus) -> Self {
        Self {
            chapters: vec![Chapter::sentinel(title, message)],
            is_image_book: false,
            font_family: None,
            font_size_px: None,
            css: None,
            status,
        }
    }

    /// True when real chapters were extracted
    pub fn is_complete(&self) -> bool {
        self.status == ContentStatus::Complete
    }
}

impl BookMetadata {
    /// Metadata derived from the file name alone
    pub fn from_file_name(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: UNKNOWN_AUTHOR.to_string(),
            cover: String::new(),
            cover_source: None,
        }
    }

    pub fn with_cover(mut self, cover: String, source: CoverSource) -> Self {
        self.cover = cover;
        self.cover_source = Some(source);
        self
    }
}
