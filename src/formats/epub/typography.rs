//! Stylesheet mining
//!
//! Concatenates every manifest stylesheet and picks out the body/paragraph
//! font family and size.

use std::io::{Read, Seek};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use super::opf::{ManifestItem, Package};
use crate::archive::Archive;

/// Pixels per point
const PX_PER_PT: f64 = 1.333;

/// Pixels per em, assuming the browser default root size
const PX_PER_EM: f64 = 16.0;

/// Family keywords that say nothing about the actual font
const GENERIC_FAMILIES: &[&str] = &[
    "serif",
    "sans-serif",
    "monospace",
    "cursive",
    "fantasy",
    "inherit",
    "initial",
];

static COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());
static RULE: Lazy<Regex> = Lazy::new(|| Regex::new(r"([^{}]*)\{([^{}]*)\}").unwrap());
static FONT_FAMILY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)font-family\s*:\s*([^;}]+)").unwrap());
static FONT_SIZE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)font-size\s*:\s*([0-9]*\.?[0-9]+)\s*(px|pt|rem|em)\b").unwrap()
});

/// Typography hints and the aggregate stylesheet text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Typography {
    pub font_family: Option<String>,
    pub font_size_px: Option<u32>,
    pub css: Option<String>,
}

fn is_stylesheet(item: &ManifestItem) -> bool {
    let href = item.href.split('#').next().unwrap_or(&item.href);
    href.to_ascii_lowercase().ends_with(".css")
        || item.media_type.as_deref().map(str::trim) == Some("text/css")
}

/// Read every stylesheet the manifest declares, in declaration order.
///
/// Stylesheets that cannot be read are skipped. The first stylesheet that
/// yields a property fixes it; later ones do not override.
pub fn extract<R: Read + Seek>(archive: &mut Archive<R>, package: &Package) -> Typography {
    let mut typography = Typography::default();
    let mut sheets = Vec::new();

    for item in package.manifest.iter().filter(|item| is_stylesheet(item)) {
        let path = package.resolve(&item.href);
        let css = match archive.read_string(&path) {
            Ok(Some(css)) => css,
            Ok(None) => {
                debug!("Stylesheet {} not found in archive, skipping", path);
                continue;
            }
            Err(e) => {
                warn!("Failed to read stylesheet {}: {}", path, e);
                continue;
            }
        };

        let (family, size) = scan_stylesheet(&css);
        if typography.font_family.is_none() && family.is_some() {
            debug!("Font family {:?} taken from {}", family, path);
            typography.font_family = family;
        }
        if typography.font_size_px.is_none() && size.is_some() {
            debug!("Font size {:?}px taken from {}", size, path);
            typography.font_size_px = size;
        }
        sheets.push(css);
    }

    if !sheets.is_empty() {
        typography.css = Some(sheets.join("\n"));
    }
    typography
}

/// First qualifying `font-family` and `font-size` on a `body` or `p` rule
pub fn scan_stylesheet(css: &str) -> (Option<String>, Option<u32>) {
    let css = COMMENT.replace_all(css, "");
    let mut family = None;
    let mut size = None;

    for rule in RULE.captures_iter(&css) {
        let targets_text = rule[1]
            .split(',')
            .map(|selector| selector.trim().to_ascii_lowercase())
            .any(|selector| selector == "body" || selector == "p");
        if !targets_text {
            continue;
        }

        let declarations = &rule[2];
        if family.is_none() {
            family = FONT_FAMILY
                .captures(declarations)
                .and_then(|c| font_family(&c[1]));
        }
        if size.is_none() {
            size = FONT_SIZE
                .captures(declarations)
                .and_then(|c| font_size_px(&c[1], &c[2]));
        }
        if family.is_some() && size.is_some() {
            break;
        }
    }

    (family, size)
}

/// First family in a `font-family` value, unless it is a generic keyword
fn font_family(value: &str) -> Option<String> {
    let value = value.split('!').next().unwrap_or(value);
    let first = value.split(',').next()?.trim();
    let name = first.trim_matches(|c| c == '"' || c == '\'').trim();

    if name.is_empty() || GENERIC_FAMILIES.contains(&name.to_ascii_lowercase().as_str()) {
        return None;
    }
    Some(name.to_string())
}

/// Convert a size to whole pixels
fn font_size_px(value: &str, unit: &str) -> Option<u32> {
    let value: f64 = value.parse().ok()?;
    let px = match unit.to_ascii_lowercase().as_str() {
        "px" => value,
        "pt" => value * PX_PER_PT,
        "em" | "rem" => value * PX_PER_EM,
        _ => return None,
    };
    Some(px.round() as u32)
}
