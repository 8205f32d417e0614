//! Configuration for the extraction engine

use serde::Deserialize;
use std::env;

/// Default number of comic pages grouped into one chapter
pub const DEFAULT_PAGES_PER_CHAPTER: usize = 20;

/// Default upper bound (exclusive) on accepted chapter title length, in characters
pub const DEFAULT_MAX_TITLE_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    pub pages_per_chapter: usize,
    pub max_title_chars: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            pages_per_chapter: DEFAULT_PAGES_PER_CHAPTER,
            max_title_chars: DEFAULT_MAX_TITLE_CHARS,
        }
    }
}

impl Config {
    /// Build a configuration from `BOOK_PROCESSOR_*` environment variables.
    ///
    /// Missing or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        Config {
            pages_per_chapter: env_usize("BOOK_PROCESSOR_PAGES_PER_CHAPTER")
                .unwrap_or(DEFAULT_PAGES_PER_CHAPTER)
                .max(1),
            max_title_chars: env_usize("BOOK_PROCESSOR_MAX_TITLE_CHARS")
                .unwrap_or(DEFAULT_MAX_TITLE_CHARS),
        }
    }

    /// Page group size, never zero
    pub fn page_group_size(&self) -> usize {
        self.pages_per_chapter.max(1)
    }
}

fn env_usize(key: &str) -> Option<usize> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
