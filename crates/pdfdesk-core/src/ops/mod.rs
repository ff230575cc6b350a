//! Transform operations
//!
//! Single-shot pure functions from page sets to a new page set. Each
//! operation validates its own preconditions; a failure aborts the whole
//! operation, never yielding a partial result.

pub mod compress;
pub mod merge;
pub mod rotate;
pub mod split;
pub mod stamp;

pub use compress::compress;
pub use merge::merge;
pub use rotate::rotate;
pub use split::split;
pub use stamp::{stamp_signature, PageSelector, StampPlacement};
