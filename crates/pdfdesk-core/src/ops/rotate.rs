//! Set absolute page rotation

use crate::error::TransformError;
use crate::pageset::{PageSet, Rotation};

/// Set the rotation of one page (1-indexed `page_number`) or of every page
/// when no page is given.
///
/// The angle must be exactly 90, 180, or 270 — anything else, including 0
/// and negative values, is rejected. Rotation is absolute: the previous
/// value is overwritten, not added to.
pub fn rotate(
    mut set: PageSet,
    angle: i64,
    page_number: Option<u32>,
) -> Result<PageSet, TransformError> {
    let rotation = match angle {
        90 => Rotation::Deg90,
        180 => Rotation::Deg180,
        270 => Rotation::Deg270,
        other => return Err(TransformError::InvalidAngle(other)),
    };

    match page_number {
        Some(number) => {
            let page_count = set.page_count();
            if number < 1 || number as usize > page_count {
                return Err(TransformError::InvalidPageNumber {
                    page: number,
                    page_count,
                });
            }
            set.set_rotation(number as usize - 1, rotation);
        }
        None => {
            for page in set.pages_mut() {
                page.set_rotation(rotation);
            }
        }
    }

    Ok(set)
}
