use thiserror::Error;

/// Failures reported by store operations.
///
/// Ownership mismatches are reported as [`StoreError::NotFound`] so callers
/// cannot probe for other users' content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Input rejected after normalization; nothing was stored
    #[error("invalid input: {0}")]
    Invalid(&'static str),

    /// Target does not exist or is not owned by the caller
    #[error("not found")]
    NotFound,

    /// Durable storage could not be read or written
    #[error("persistence failed: {0}")]
    Persistence(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
