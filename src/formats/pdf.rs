//! PDF placeholder
//!
//! PDF books are listed but not extracted yet.

use crate::document::BookContent;

pub const PLACEHOLDER_MESSAGE: &str =
    "PDF support is not available yet. This book can be listed but not read.";

/// Stub document returned for every PDF
pub fn placeholder() -> BookContent {
    BookContent::unsupported("pdf", PLACEHOLDER_MESSAGE)
}
