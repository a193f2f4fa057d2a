//! Errors raised by the encoder and the vector index.

use thiserror::Error;

use wikisent_core::error::WikisentError;

/// Failure to turn input into a vector.
#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("input is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("tokenization failed: {0}")]
    Tokenization(String),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("failed to load model: {0}")]
    ModelLoad(String),
}

/// Failure to add to or search the vector index.
#[derive(Debug, Error, PartialEq)]
pub enum IndexError {
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("vector component {position} is not finite")]
    NonFiniteComponent { position: usize },

    #[error("top_k must be at least 1")]
    InvalidTopK,

    #[error("index lock poisoned")]
    LockPoisoned,
}

impl From<EncodingError> for WikisentError {
    fn from(err: EncodingError) -> Self {
        WikisentError::Encoding(err.to_string())
    }
}

impl From<IndexError> for WikisentError {
    fn from(err: IndexError) -> Self {
        match err {
            IndexError::DimensionMismatch { expected, actual } => {
                WikisentError::DimensionMismatch { expected, actual }
            }
            other => WikisentError::Index(other.to_string()),
        }
    }
}
