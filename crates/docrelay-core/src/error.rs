//! Error types for the conversion-record persistence boundary.

use uuid::Uuid;

/// Errors surfaced by a [`crate::ConversionStore`] implementation.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Conversion record not found: {0}")]
    NotFound(Uuid),

    #[error("Failed to persist result artifact: {0}")]
    Artifact(String),

    #[error("Record backend error: {0}")]
    Backend(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type RecordResult<T> = Result<T, RecordError>;
