//! Comic archive (CBZ/CBR) extraction
//!
//! Pages are the archive's image entries in plain lexicographic name order,
//! embedded as data URIs and grouped into fixed-size chapters.

use std::io::{Read, Seek};

use tracing::{debug, info};

use crate::archive::Archive;
use crate::config::Config;
use crate::document::{BookContent, BookMetadata, Chapter, CoverSource, Paragraph};
use crate::error::Result;
use crate::media;

/// Message for archives without any recognized image
pub const NO_IMAGES_MESSAGE: &str = "No images were found in this archive.";

/// Chapter label when every page fits in one chapter
pub const ALL_PAGES_TITLE: &str = "All Pages";

/// macOS resource-fork debris that zips often carry
fn is_resource_fork(name: &str) -> bool {
    name.starts_with("__MACOSX/")
        || name
            .rsplit('/')
            .next()
            .map(|file| file.starts_with("._"))
            .unwrap_or(false)
}

/// Image entry names in page order
pub fn page_names<R: Read + Seek>(archive: &Archive<R>) -> Vec<String> {
    let mut names: Vec<String> = archive
        .file_names()
        .into_iter()
        .filter(|name| media::is_image(name) && !is_resource_fork(name))
        .collect();
    names.sort();
    names
}

/// Embed every page and group pages into chapters
pub fn extract_content<R: Read + Seek>(
    archive: &mut Archive<R>,
    config: &Config,
) -> Result<BookContent> {
    let names = page_names(archive);
    let mut pages = Vec::with_capacity(names.len());
    for name in &names {
        if let Some(bytes) = archive.read(name)? {
            pages.push(media::data_uri(name, &bytes));
        }
    }

    let group = config.page_group_size();
    let total = pages.len();
    let chapters = pages
        .chunks(group)
        .enumerate()
        .map(|(i, chunk)| {
            let first = i * group + 1;
            let last = first + chunk.len() - 1;
            let title = if total <= group {
                ALL_PAGES_TITLE.to_string()
            } else {
                format!("Pages {}-{}", first, last)
            };

            let paragraphs = chunk
                .iter()
                .zip(first..)
                .map(|(uri, page)| Paragraph {
                    text: uri.clone(),
                    html: format!("<img src=\"{}\" alt=\"Page {}\"/>", uri, page),
                })
                .collect();
            Chapter::from_paragraphs(title, paragraphs)
        })
        .collect();

    info!("Extracted {} pages into chunks of {}", total, group);
    Ok(BookContent::from_chapters(chapters, true, NO_IMAGES_MESSAGE))
}

/// Comic metadata: the file name, an unknown author and the first page as cover
pub fn extract_metadata<R: Read + Seek>(
    archive: &mut Archive<R>,
    fallback_title: &str,
) -> Result<BookMetadata> {
    let metadata = BookMetadata::from_file_name(fallback_title);

    let Some(first) = page_names(archive).into_iter().next() else {
        debug!("Comic archive has no pages, no cover");
        return Ok(metadata);
    };

    Ok(match archive.read(&first)? {
        Some(bytes) => metadata.with_cover(media::data_uri(&first, &bytes), CoverSource::FirstPage),
        None => metadata,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::test_support::build_zip;
    use crate::document::{ContentStatus, EMPTY_TITLE, UNKNOWN_AUTHOR};

    fn comic(count: usize) -> Archive<std::io::Cursor<Vec<u8>>> {
        let names: Vec<String> = (1..=count).map(|i| format!("pages/{:03}.jpg", i)).collect();
        let mut entries: Vec<(&str, &[u8])> = names.iter().map(|n| (n.as_str(), &b"img"[..])).collect();
        entries.push(("ComicInfo.xml", b"<ComicInfo/>"));
        Archive::from_bytes(build_zip(&entries)).unwrap()
    }

    #[test]
    fn test_pagination_into_ranges() {
        let mut archive = comic(45);
        let content = extract_content(&mut archive, &Config::default()).unwrap();

        assert!(content.is_image_book);
        let titles: Vec<_> = content.chapters.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Pages 1-20", "Pages 21-40", "Pages 41-45"]);
        let sizes: Vec<_> = content.chapters.iter().map(|c| c.paragraphs.len()).collect();
        assert_eq!(sizes, vec![20, 20, 5]);
        assert_eq!(
            content.chapters[2].html_paragraphs[4],
            format!("<img src=\"{}\" alt=\"Page 45\"/>", media::data_uri("x.jpg", b"img"))
        );
    }

    #[test]
    fn test_single_chapter_for_small_archive() {
        let mut archive = comic(15);
        let content = extract_content(&mut archive, &Config::default()).unwrap();

        assert_eq!(content.chapters.len(), 1);
        assert_eq!(content.chapters[0].title, ALL_PAGES_TITLE);
        assert_eq!(content.chapters[0].paragraphs.len(), 15);
        assert!(content.chapters[0]
            .paragraphs
            .iter()
            .all(|p| p.starts_with("data:image/jpeg;base64,")));
    }

    #[test]
    fn test_exactly_one_group() {
        let mut archive = comic(20);
        let content = extract_content(&mut archive, &Config::default()).unwrap();
        assert_eq!(content.chapters.len(), 1);
        assert_eq!(content.chapters[0].title, ALL_PAGES_TITLE);
    }

    #[test]
    fn test_lexicographic_order() {
        let bytes = build_zip(&[
            ("p10.png", b"ten"),
            ("p2.png", b"two"),
            ("p1.png", b"one"),
            ("dir/", b""),
        ]);
        let archive = Archive::from_bytes(bytes).unwrap();
        assert_eq!(page_names(&archive), vec!["p1.png", "p10.png", "p2.png"]);
    }

    #[test]
    fn test_resource_forks_skipped() {
        let bytes = build_zip(&[
            ("__MACOSX/._001.jpg", b"junk"),
            ("art/._002.jpg", b"junk"),
            ("art/001.jpg", b"page"),
        ]);
        let archive = Archive::from_bytes(bytes).unwrap();
        assert_eq!(page_names(&archive), vec!["art/001.jpg"]);
    }

    #[test]
    fn test_no_images() {
        let bytes = build_zip(&[("readme.txt", b"hi")]);
        let mut archive = Archive::from_bytes(bytes).unwrap();
        let content = extract_content(&mut archive, &Config::default()).unwrap();

        assert_eq!(content.status, ContentStatus::Empty);
        assert!(!content.is_image_book);
        assert_eq!(content.chapters[0].title, EMPTY_TITLE);
        assert_eq!(content.chapters[0].paragraphs, vec![NO_IMAGES_MESSAGE]);
    }

    #[test]
    fn test_metadata_uses_first_page() {
        let bytes = build_zip(&[("b.png", b"second"), ("a.webp", b"first")]);
        let mut archive = Archive::from_bytes(bytes).unwrap();
        let metadata = extract_metadata(&mut archive, "Issue 1").unwrap();

        assert_eq!(metadata.title, "Issue 1");
        assert_eq!(metadata.author, UNKNOWN_AUTHOR);
        assert_eq!(metadata.cover, media::data_uri("a.webp", b"first"));
        assert_eq!(metadata.cover_source, Some(CoverSource::FirstPage));
    }

    #[test]
    fn test_custom_page_group_size() {
        let mut archive = comic(5);
        let config = Config {
            pages_per_chapter: 2,
            ..Config::default()
        };
        let content = extract_content(&mut archive, &config).unwrap();
        let titles: Vec<_> = content.chapters.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Pages 1-2", "Pages 3-4", "Pages 5-5"]);
    }
}
