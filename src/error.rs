//! Error types for content extraction
//!
//! These never escape the public entry points: the extractor turns them into
//! sentinel documents or fallback metadata.

use thiserror::Error;

use crate::document::FailureReason;

/// Internal extraction error
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Failed to read ZIP archive: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Archive is RAR-compressed")]
    RarArchive,

    #[error("{0}")]
    Structure(#[from] FailureReason),
}

/// Result type alias for extraction operations
pub type Result<T> = std::result::Result<T, ExtractError>;

impl ExtractError {
    /// Map the error onto the reason reported to callers
    pub fn into_failure(self) -> FailureReason {
        match self {
            ExtractError::Structure(reason) => reason,
            ExtractError::RarArchive => FailureReason::RarArchive,
            other => FailureReason::UnreadableArchive {
                detail: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structure_error_keeps_reason() {
        let err = ExtractError::from(FailureReason::EmptySpine);
        assert_eq!(err.into_failure(), FailureReason::EmptySpine);
    }

    #[test]
    fn test_io_error_becomes_unreadable_archive() {
        let err = ExtractError::from(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no such file",
        ));
        match err.into_failure() {
            FailureReason::UnreadableArchive { detail } => {
                assert!(detail.contains("no such file"));
            }
            other => panic!("unexpected reason: {:?}", other),
        }
    }
}
