//! PDF page-manipulation pipeline
//!
//! This crate provides the document model and transform operations behind
//! the pdfdesk platform: merge, split, rotate, compress-reserialize, and
//! signature stamping, plus the orchestrator that turns an
//! [`OperationRequest`] into a persisted artifact.
//!
//! Documents are decoded into an owned [`PageSet`] (an ordered sequence of
//! self-contained pages), transformed, re-encoded, and written through
//! `pdfdesk-store`. Nothing about document content outlives a single
//! pipeline invocation.

pub mod error;
pub mod ops;
pub mod pageset;
pub mod pipeline;
pub mod request;

pub use error::{DecodeError, EncodeError, PipelineError, TransformError, ValidationError};
pub use ops::{PageSelector, StampPlacement};
pub use pageset::{Page, PageSet, Rotation};
pub use pipeline::{execute, PipelineOutcome};
pub use request::OperationRequest;
