//! Concatenate multiple documents into one

use crate::error::TransformError;
use crate::pageset::PageSet;

/// Merge the sources into a new page set: documents are concatenated in
/// input order, pages within each document keep their original order.
/// Every page is deep-copied, so the output shares nothing with the
/// sources. Fewer than two sources is a validation failure; no upper
/// limit is imposed here.
pub fn merge(sources: &[PageSet]) -> Result<PageSet, TransformError> {
    if sources.len() < 2 {
        return Err(TransformError::InsufficientInputs(sources.len()));
    }

    let mut merged = PageSet::new();
    for source in sources {
        let indices: Vec<usize> = (0..source.page_count()).collect();
        merged.copy_pages(source, &indices);
    }
    Ok(merged)
}
