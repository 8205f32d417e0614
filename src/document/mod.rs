//! Render-agnostic document model
//!
//! Everything the extractor hands back to its caller lives here. All types
//! serialize to camelCase JSON since they cross the IPC boundary to the
//! reading UI and the text-to-speech pipeline.

mod types;

pub use types::*;
