use storage::error::StorageError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RotationError>;

#[derive(Error, Debug)]
pub enum RotationError {
    /// The tier catalog is empty, unreachable or malformed. Aborts the
    /// rotation attempt; the next poll retries.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
