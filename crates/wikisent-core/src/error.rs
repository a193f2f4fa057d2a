use thiserror::Error;

/// Top-level error type for wikisent.
///
/// Subsystem crates define their own error types and implement
/// `From<SubsystemError> for WikisentError` so that `?` works across crate
/// boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WikisentError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Index error: {0}")]
    Index(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

}

impl From<toml::de::Error> for WikisentError {
    fn from(err: toml::de::Error) -> Self {
        WikisentError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for WikisentError {
    fn from(err: toml::ser::Error) -> Self {
        WikisentError::Config(err.to_string())
    }
}

/// A specialized `Result` type for wikisent operations.
pub type Result<T> = std::result::Result<T, WikisentError>;
