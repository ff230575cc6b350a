//! Compact re-serialization

use crate::error::TransformError;
use crate::pageset::PageSet;

/// Compression here is a re-serialization, not a lossy pass: the page set
/// itself is returned unchanged and the compact container layout is applied
/// when the orchestrator encodes the result with
/// [`PageSet::encode_compact`]. Image and font fidelity are untouched, so
/// callers should not expect a dramatic size drop — the underlying library
/// provides no real recompression.
pub fn compress(set: PageSet) -> Result<PageSet, TransformError> {
    Ok(set)
}
