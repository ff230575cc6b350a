//! Owner-scoped artifact storage
//!
//! Maps (owner, generated file name) to a byte blob on local disk.
//! Every save produces a fresh, collision-free path; artifacts are
//! never overwritten in place.

pub mod error;
pub mod owner;
pub mod store;

pub use error::StorageError;
pub use owner::OwnerId;
pub use store::{ArtifactReference, ArtifactStore};
