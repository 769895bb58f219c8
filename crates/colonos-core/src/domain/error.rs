//! Error taxonomy for the code-derivation and packaging pipeline.

/// Colonos pipeline errors.
#[derive(Debug, thiserror::Error)]
pub enum ColonosError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("encoding failed for code {code:?}: {reason}")]
    Encoding { code: String, reason: String },

    #[error("archive error: {0}")]
    Archive(String),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<zip::result::ZipError> for ColonosError {
    fn from(err: zip::result::ZipError) -> Self {
        ColonosError::Archive(err.to_string())
    }
}

/// Result type for Colonos operations.
pub type Result<T> = std::result::Result<T, ColonosError>;
