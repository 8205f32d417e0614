//! Chapter markup extraction
//!
//! Turns one XHTML content document into a title and a list of paragraphs.
//! Both use ordered fallback chains, and the tier that produced the result is
//! reported alongside it.

use once_cell::sync::Lazy;
use regex::Regex;

pub mod scanner;
pub mod text;

use crate::document::{Paragraph, SegmentationTier, TitleSource};
use text::{to_plain_text, Whitespace};

/// A line containing only whitespace, between two line breaks
static BLANK_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());

/// Extracted content of one chapter document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterMarkup {
    pub title: Option<(String, TitleSource)>,
    pub paragraphs: Vec<Paragraph>,
    pub segmentation: Option<SegmentationTier>,
}

/// Extract title and paragraphs from a content document
pub fn parse_chapter(html: &str, max_title_chars: usize) -> ChapterMarkup {
    let (paragraphs, segmentation) = match segment(html) {
        Some((paragraphs, tier)) => (paragraphs, Some(tier)),
        None => (Vec::new(), None),
    };

    ChapterMarkup {
        title: extract_title(html, max_title_chars),
        paragraphs,
        segmentation,
    }
}

/// Chapter title from `<title>`, else the first `<h1>`/`<h2>`.
///
/// `None` means the caller should assign a positional title.
pub fn extract_title(html: &str, max_chars: usize) -> Option<(String, TitleSource)> {
    let fits = |text: &str| !text.is_empty() && text.chars().count() < max_chars;

    if let Some(title) = scanner::first_element(html, &["title"]) {
        let text = to_plain_text(title.inner, Whitespace::Collapse);
        if fits(&text) && !text.eq_ignore_ascii_case("untitled") {
            return Some((text, TitleSource::TitleElement));
        }
    }

    if let Some(heading) = scanner::first_element(html, &["h1", "h2"]) {
        let text = to_plain_text(heading.inner, Whitespace::Collapse);
        if fits(&text) {
            return Some((text, TitleSource::Heading));
        }
    }

    None
}

/// Split a document into paragraphs.
///
/// Tiers, first non-empty wins: `<p>` blocks, then `<div>` blocks, then
/// blank-line separated body text.
pub fn segment(html: &str) -> Option<(Vec<Paragraph>, SegmentationTier)> {
    let by_element = |name: &str| -> Vec<Paragraph> {
        scanner::elements(html, name)
            .into_iter()
            .filter_map(|element| {
                let text = to_plain_text(element.inner, Whitespace::Collapse);
                (!text.is_empty()).then(|| Paragraph {
                    text,
                    html: element.outer.trim().to_string(),
                })
            })
            .collect()
    };

    let paragraphs = by_element("p");
    if !paragraphs.is_empty() {
        return Some((paragraphs, SegmentationTier::Paragraphs));
    }

    let divisions = by_element("div");
    if !divisions.is_empty() {
        return Some((divisions, SegmentationTier::Divisions));
    }

    let plain = plain_text_paragraphs(body_markup(html));
    if !plain.is_empty() {
        return Some((plain, SegmentationTier::PlainText));
    }

    None
}

fn plain_text_paragraphs(markup: &str) -> Vec<Paragraph> {
    let text = to_plain_text(markup, Whitespace::Preserve);
    BLANK_LINE
        .split(&text)
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .map(Paragraph::from_text)
        .collect()
}

/// Content of `<body>`, or everything after `<head>` when there is no body
fn body_markup(html: &str) -> &str {
    if let Some(body) = scanner::first_element(html, &["body"]) {
        return body.inner;
    }
    match scanner::first_element(html, &["head"]) {
        Some(head) => &html[head.tag.span.start + head.outer.len()..],
        None => html,
    }
}
