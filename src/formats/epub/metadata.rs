//! Title, author and cover for library listings

use std::io::{Read, Seek};

use tracing::debug;

use super::opf::{self, ManifestItem, Package};
use crate::archive::Archive;
use crate::document::{BookMetadata, CoverSource, UNKNOWN_AUTHOR};
use crate::error::Result;
use crate::media;

/// Read title, author and cover from an EPUB.
///
/// `fallback_title` is used when the package names no title.
pub fn extract_metadata<R: Read + Seek>(
    archive: &mut Archive<R>,
    fallback_title: &str,
) -> Result<BookMetadata> {
    let package = opf::load_package(archive)?;

    let metadata = BookMetadata {
        title: package
            .metadata
            .title
            .clone()
            .unwrap_or_else(|| fallback_title.to_string()),
        author: package
            .metadata
            .creator
            .clone()
            .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
        cover: String::new(),
        cover_source: None,
    };

    Ok(match find_cover(archive, &package)? {
        Some((cover, source)) => metadata.with_cover(cover, source),
        None => metadata,
    })
}

/// Resolve the cover image, trying each heuristic in turn
pub fn find_cover<R: Read + Seek>(
    archive: &mut Archive<R>,
    package: &Package,
) -> Result<Option<(String, CoverSource)>> {
    if let Some(id) = &package.metadata.cover_id {
        match package.manifest.get(id) {
            Some(item) => {
                if let Some(cover) = embed_item(archive, package, item)? {
                    debug!("Cover resolved from <meta name=\"cover\"> ({})", item.href);
                    return Ok(Some((cover, CoverSource::MetaReference)));
                }
            }
            None => debug!("Cover meta names unknown manifest id '{}'", id),
        }
    }

    let cover_images = package.manifest.iter().filter(|item| {
        item.properties
            .as_deref()
            .map(|p| p.contains("cover-image"))
            .unwrap_or(false)
    });
    for item in cover_images {
        if let Some(cover) = embed_item(archive, package, item)? {
            debug!("Cover resolved from cover-image property ({})", item.href);
            return Ok(Some((cover, CoverSource::CoverImageProperty)));
        }
    }

    for name in archive.file_names() {
        if name.to_lowercase().contains("cover") && media::is_image(&name) {
            if let Some(bytes) = archive.read(&name)? {
                debug!("Cover resolved by archive scan ({})", name);
                return Ok(Some((media::data_uri(&name, &bytes), CoverSource::ArchiveScan)));
            }
        }
    }

    debug!("No cover found");
    Ok(None)
}

fn embed_item<R: Read + Seek>(
    archive: &mut Archive<R>,
    package: &Package,
    item: &ManifestItem,
) -> Result<Option<String>> {
    if item.is_declared_non_image() {
        debug!("Cover candidate {} is not an image, skipping", item.href);
        return Ok(None);
    }

    let path = package.resolve(&item.href);
    Ok(archive
        .read(&path)?
        .map(|bytes| media::data_uri(&path, &bytes)))
}
