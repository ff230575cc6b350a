use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid owner id: {0}")]
    InvalidOwner(String),

    #[error("failed to write artifact: {0}")]
    Io(#[from] std::io::Error),
}
