//! Extract an inclusive page range

use crate::error::TransformError;
use crate::pageset::PageSet;

/// Copy pages `[start_page, end_page]` (1-indexed, inclusive) into a new
/// page set, preserving order.
///
/// Bounds are checked in a fixed order and the first failure wins:
/// `1 <= start_page`, `end_page <= page_count`, `start_page <= end_page`.
/// An out-of-range request is always an error; the range is never clamped
/// to produce a smaller document than asked for.
pub fn split(source: &PageSet, start_page: u32, end_page: u32) -> Result<PageSet, TransformError> {
    let page_count = source.page_count();

    if start_page < 1 {
        return Err(TransformError::InvalidRange(format!(
            "startPage must be at least 1, got {start_page}"
        )));
    }
    if end_page as usize > page_count {
        return Err(TransformError::InvalidRange(format!(
            "endPage {end_page} exceeds the document's {page_count} pages"
        )));
    }
    if start_page > end_page {
        return Err(TransformError::InvalidRange(format!(
            "startPage {start_page} is after endPage {end_page}"
        )));
    }

    let indices: Vec<usize> = (start_page as usize - 1..end_page as usize).collect();
    let mut out = PageSet::new();
    out.copy_pages(source, &indices);
    Ok(out)
}
