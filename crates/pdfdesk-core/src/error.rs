use pdfdesk_store::StorageError;
use thiserror::Error;

/// Input byte stream is not a well-formed document container.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed PDF: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("failed to serialize PDF: {0}")]
    Serialize(String),
}

/// Per-operation precondition failures.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("at least 2 documents are required for merging, got {0}")]
    InsufficientInputs(usize),

    #[error("invalid page range: {0}")]
    InvalidRange(String),

    #[error("invalid rotation angle {0} (must be 90, 180, or 270)")]
    InvalidAngle(i64),

    #[error("invalid page number {page} (document has {page_count} pages)")]
    InvalidPageNumber { page: u32, page_count: usize },

    #[error("unsupported signature image format: {0}")]
    UnsupportedImageFormat(String),
}

/// Missing or ill-typed request field, caught before any decode work.
#[derive(Debug, Error)]
#[error("invalid field `{field}`: {constraint}")]
pub struct ValidationError {
    pub field: &'static str,
    pub constraint: String,
}

impl ValidationError {
    pub fn new(field: &'static str, constraint: impl Into<String>) -> Self {
        Self {
            field,
            constraint: constraint.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("unreadable input document {index}: {source}")]
    UnreadableInput { index: usize, source: DecodeError },

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
