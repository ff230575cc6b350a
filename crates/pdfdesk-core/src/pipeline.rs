//! Pipeline orchestrator
//!
//! One invocation runs strictly in sequence: validate the request, decode
//! the inputs, apply the matching transform, encode, persist. Nothing about
//! document content survives the invocation — only the artifact reference
//! and size metrics are handed back for the caller to log.

use crate::error::PipelineError;
use crate::ops;
use crate::pageset::PageSet;
use crate::request::OperationRequest;
use chrono::Utc;
use pdfdesk_store::{ArtifactReference, ArtifactStore, OwnerId};

/// What an invocation hands back to the transport layer.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub artifact: ArtifactReference,
    pub label: &'static str,
    pub original_size: usize,
    pub result_size: usize,
}

/// Run one operation to completion for `owner`.
///
/// Any failure — validation, decode, transform, encode, or storage — aborts
/// the whole operation; a partially transformed document is never persisted.
/// Retrying is the caller's business.
pub fn execute(
    request: OperationRequest,
    owner: &OwnerId,
    store: &ArtifactStore,
) -> Result<PipelineOutcome, PipelineError> {
    request.validate()?;
    let label = request.label();
    let timestamp = Utc::now().timestamp_millis();

    let (bytes, original_size, suggested_name) = match request {
        OperationRequest::Merge { documents } => {
            let original_size = documents.iter().map(Vec::len).sum();
            let sources = decode_all(&documents)?;
            let merged = ops::merge(&sources)?;
            (merged.encode()?, original_size, format!("merged-{timestamp}.pdf"))
        }
        OperationRequest::Split {
            document,
            start_page,
            end_page,
        } => {
            let source = decode_one(&document)?;
            let out = ops::split(&source, start_page, end_page)?;
            (
                out.encode()?,
                document.len(),
                format!("split-{start_page}-{end_page}-{timestamp}.pdf"),
            )
        }
        OperationRequest::Rotate {
            document,
            angle,
            page_number,
        } => {
            let source = decode_one(&document)?;
            let out = ops::rotate(source, angle, page_number)?;
            (
                out.encode()?,
                document.len(),
                format!("rotated-{angle}deg-{timestamp}.pdf"),
            )
        }
        OperationRequest::Compress { document } => {
            let source = decode_one(&document)?;
            let out = ops::compress(source)?;
            (
                out.encode_compact()?,
                document.len(),
                format!("compressed-{timestamp}.pdf"),
            )
        }
        OperationRequest::StampSignature {
            document,
            image,
            page,
            x,
            y,
            width,
        } => {
            let source = decode_one(&document)?;
            let out = ops::stamp_signature(source, &image, page, x, y, width)?;
            (
                out.encode()?,
                document.len(),
                format!("signed-{timestamp}.pdf"),
            )
        }
    };

    let result_size = bytes.len();
    let artifact = store.save(&bytes, &suggested_name, owner)?;

    Ok(PipelineOutcome {
        artifact,
        label,
        original_size,
        result_size,
    })
}

fn decode_one(bytes: &[u8]) -> Result<PageSet, PipelineError> {
    PageSet::decode(bytes).map_err(|source| PipelineError::UnreadableInput { index: 0, source })
}

fn decode_all(documents: &[Vec<u8>]) -> Result<Vec<PageSet>, PipelineError> {
    documents
        .iter()
        .enumerate()
        .map(|(index, bytes)| {
            PageSet::decode(bytes)
                .map_err(|source| PipelineError::UnreadableInput { index, source })
        })
        .collect()
}
