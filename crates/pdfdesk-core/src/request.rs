//! Operation request union
//!
//! The transport layer decides which operation is being asked for exactly
//! once, at the boundary, by building one of these variants. Handling is a
//! closed match, so a missing operation arm is a compile error rather than
//! a runtime fallback.

use crate::error::ValidationError;
use crate::ops::PageSelector;
use serde::Deserialize;

fn default_stamp_page() -> PageSelector {
    PageSelector::Last
}

fn default_stamp_offset() -> f64 {
    50.0
}

fn default_stamp_width() -> f64 {
    180.0
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum OperationRequest {
    Merge {
        documents: Vec<Vec<u8>>,
    },
    Split {
        document: Vec<u8>,
        start_page: u32,
        end_page: u32,
    },
    Rotate {
        document: Vec<u8>,
        angle: i64,
        page_number: Option<u32>,
    },
    Compress {
        document: Vec<u8>,
    },
    StampSignature {
        document: Vec<u8>,
        image: Vec<u8>,
        #[serde(default = "default_stamp_page")]
        page: PageSelector,
        #[serde(default = "default_stamp_offset")]
        x: f64,
        #[serde(default = "default_stamp_offset")]
        y: f64,
        #[serde(default = "default_stamp_width")]
        width: f64,
    },
}

impl OperationRequest {
    /// Human-readable operation label, used for logging and file naming.
    pub fn label(&self) -> &'static str {
        match self {
            OperationRequest::Merge { .. } => "merge",
            OperationRequest::Split { .. } => "split",
            OperationRequest::Rotate { .. } => "rotate",
            OperationRequest::Compress { .. } => "compress",
            OperationRequest::StampSignature { .. } => "stamp-signature",
        }
    }

    /// Field-level checks, run before any decode work. Preconditions that
    /// need a decoded document (page ranges, angles) belong to the
    /// individual operations.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            OperationRequest::Merge { documents } => {
                for (i, document) in documents.iter().enumerate() {
                    if document.is_empty() {
                        return Err(ValidationError::new(
                            "documents",
                            format!("document {i} is empty"),
                        ));
                    }
                }
                Ok(())
            }
            OperationRequest::Split { document, .. } => require_bytes(document, "document"),
            OperationRequest::Rotate { document, .. } => require_bytes(document, "document"),
            OperationRequest::Compress { document } => require_bytes(document, "document"),
            OperationRequest::StampSignature {
                document,
                image,
                x,
                y,
                width,
                ..
            } => {
                require_bytes(document, "document")?;
                require_bytes(image, "image")?;
                if !x.is_finite() || *x < 0.0 {
                    return Err(ValidationError::new("x", "must be a non-negative number"));
                }
                if !y.is_finite() || *y < 0.0 {
                    return Err(ValidationError::new("y", "must be a non-negative number"));
                }
                if !width.is_finite() || *width <= 0.0 {
                    return Err(ValidationError::new("width", "must be a positive number"));
                }
                Ok(())
            }
        }
    }
}

fn require_bytes(bytes: &[u8], field: &'static str) -> Result<(), ValidationError> {
    if bytes.is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    Ok(())
}
