//! Container and package document (OPF) resolution
//!
//! Locates the package document through `META-INF/container.xml` and reads
//! its metadata, manifest and spine. Package documents are parsed as XML
//! first; malformed ones are read with the tolerant markup scanner instead.

use std::collections::HashMap;
use std::io::{Read, Seek};

use tracing::{debug, warn};

use crate::archive::Archive;
use crate::document::FailureReason;
use crate::error::Result;
use crate::markup::scanner;
use crate::markup::text::{to_plain_text, Whitespace};

/// Fixed location of the container descriptor
pub const CONTAINER_PATH: &str = "META-INF/container.xml";

/// Manifest item from OPF
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestItem {
    pub id: String,
    pub href: String,
    pub media_type: Option<String>,
    pub properties: Option<String>,
}

impl ManifestItem {
    /// Whether the declared media type rules out an image
    pub fn is_declared_non_image(&self) -> bool {
        self.media_type
            .as_deref()
            .map(|t| !t.trim().to_ascii_lowercase().starts_with("image/"))
            .unwrap_or(false)
    }
}

/// Manifest items keyed by id, remembering declaration order
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    items: Vec<ManifestItem>,
    by_id: HashMap<String, usize>,
}

impl Manifest {
    /// Add an item; a repeated id replaces the earlier lookup
    pub fn insert(&mut self, item: ManifestItem) {
        self.by_id.insert(item.id.clone(), self.items.len());
        self.items.push(item);
    }

    pub fn get(&self, id: &str) -> Option<&ManifestItem> {
        self.by_id.get(id).map(|&i| &self.items[i])
    }

    /// Items in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &ManifestItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Dublin Core fields and the cover reference
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageMetadata {
    pub title: Option<String>,
    pub creator: Option<String>,
    /// Manifest id named by `<meta name="cover">`
    pub cover_id: Option<String>,
}

/// Parsed package document
#[derive(Debug, Clone)]
pub struct Package {
    /// Archive path of the package document
    pub path: String,
    /// Directory hrefs are resolved against
    pub base_dir: String,
    pub metadata: PackageMetadata,
    pub manifest: Manifest,
    /// Manifest ids in reading order
    pub spine: Vec<String>,
}

impl Package {
    /// Archive path for a manifest href
    pub fn resolve(&self, href: &str) -> String {
        resolve_href(&self.base_dir, href)
    }
}

/// Locate, read and parse the package document
pub fn load_package<R: Read + Seek>(archive: &mut Archive<R>) -> Result<Package> {
    let path = find_package_path(archive)?;

    let content = archive
        .read_string(&path)?
        .ok_or_else(|| FailureReason::UnreadablePackage { path: path.clone() })?;

    Ok(parse_package(&content, &path))
}

/// Find the path to the OPF file from container.xml
pub fn find_package_path<R: Read + Seek>(archive: &mut Archive<R>) -> Result<String> {
    let container = archive
        .read_string(CONTAINER_PATH)?
        .ok_or(FailureReason::MissingContainer)?;

    let path = match roxmltree::Document::parse_with_options(&container, xml_options()) {
        Ok(doc) => doc
            .descendants()
            .filter(|node| node.tag_name().name() == "rootfile")
            .find_map(|node| node.attribute("full-path").map(str::to_string)),
        Err(e) => {
            debug!("container.xml is not well-formed ({}), scanning tags", e);
            scanner::start_tags(&container, "rootfile")
                .find_map(|tag| tag.attr("full-path"))
        }
    };

    path.map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .ok_or_else(|| FailureReason::MissingPackagePath.into())
}

/// Parse package document text located at `path`
pub fn parse_package(content: &str, path: &str) -> Package {
    let base_dir = path
        .rsplit_once('/')
        .map(|(dir, _)| dir.to_string())
        .unwrap_or_default();

    let (metadata, manifest, spine) =
        match roxmltree::Document::parse_with_options(content, xml_options()) {
            Ok(doc) => (
                parse_metadata(&doc),
                parse_manifest(&doc),
                parse_spine(&doc),
            ),
            Err(e) => {
                warn!("Package document {} is not well-formed ({}), scanning tags", path, e);
                (
                    scan_metadata(content),
                    scan_manifest(content),
                    scan_spine(content),
                )
            }
        };

    debug!(
        "Package {}: {} manifest items, {} spine entries",
        path,
        manifest.len(),
        spine.len()
    );

    Package {
        path: path.to_string(),
        base_dir,
        metadata,
        manifest,
        spine,
    }
}

fn xml_options() -> roxmltree::ParsingOptions {
    let mut options = roxmltree::ParsingOptions::default();
    options.allow_dtd = true;
    options
}

fn non_empty(text: String) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn node_text(node: &roxmltree::Node) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}

fn parse_metadata(doc: &roxmltree::Document) -> PackageMetadata {
    let first_text = |name: &str| {
        doc.descendants()
            .filter(|node| node.is_element() && node.tag_name().name() == name)
            .find_map(|node| non_empty(node_text(&node)))
    };

    let cover_id = doc
        .descendants()
        .filter(|node| node.tag_name().name() == "meta")
        .filter(|node| node.attribute("name") == Some("cover"))
        .find_map(|node| node.attribute("content").map(|c| c.trim().to_string()))
        .filter(|id| !id.is_empty());

    PackageMetadata {
        title: first_text("title"),
        creator: first_text("creator"),
        cover_id,
    }
}

fn parse_manifest(doc: &roxmltree::Document) -> Manifest {
    let mut manifest = Manifest::default();

    for node in doc.descendants() {
        if node.tag_name().name() == "item" {
            if let (Some(id), Some(href)) = (node.attribute("id"), node.attribute("href")) {
                manifest.insert(ManifestItem {
                    id: id.to_string(),
                    href: href.to_string(),
                    media_type: node.attribute("media-type").map(|s| s.to_string()),
                    properties: node.attribute("properties").map(|s| s.to_string()),
                });
            }
        }
    }

    manifest
}

fn parse_spine(doc: &roxmltree::Document) -> Vec<String> {
    doc.descendants()
        .filter(|node| node.tag_name().name() == "itemref")
        .filter_map(|node| node.attribute("idref").map(|s| s.to_string()))
        .collect()
}

fn scan_metadata(content: &str) -> PackageMetadata {
    let first_text = |name: &str| {
        scanner::elements(content, name)
            .into_iter()
            .find_map(|element| non_empty(to_plain_text(element.inner, Whitespace::Collapse)))
    };

    let cover_id = scanner::start_tags(content, "meta")
        .filter(|tag| tag.attr("name").as_deref() == Some("cover"))
        .find_map(|tag| tag.attr("content").and_then(non_empty));

    PackageMetadata {
        title: first_text("title"),
        creator: first_text("creator"),
        cover_id,
    }
}

fn scan_manifest(content: &str) -> Manifest {
    let mut manifest = Manifest::default();

    for tag in scanner::start_tags(content, "item") {
        if let (Some(id), Some(href)) = (tag.attr("id"), tag.attr("href")) {
            manifest.insert(ManifestItem {
                id,
                href,
                media_type: tag.attr("media-type"),
                properties: tag.attr("properties"),
            });
        }
    }

    manifest
}

fn scan_spine(content: &str) -> Vec<String> {
    scanner::start_tags(content, "itemref")
        .filter_map(|tag| tag.attr("idref"))
        .collect()
}

/// Resolve an href against a directory inside the archive.
///
/// Fragments are dropped and `.`/`..` segments folded; a leading `/` makes
/// the href relative to the archive root.
pub fn resolve_href(base_dir: &str, href: &str) -> String {
    let href = href.split('#').next().unwrap_or(href);

    let mut segments: Vec<&str> = if href.starts_with('/') {
        Vec::new()
    } else {
        base_dir.split('/').filter(|s| !s.is_empty()).collect()
    };

    for segment in href.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    segments.join("/")
}
