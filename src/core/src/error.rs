use thiserror::Error;

/// Image retag error types
#[derive(Error, Debug)]
pub enum RetagError {
    /// Identifier is not 64 hexadecimal digits
    #[error("Invalid image ID: {0}")]
    InvalidImageId(String),

    /// Trailing metadata tokens do not form key/value pairs
    #[error("Metadata arguments must come in key, value pairs, got {count} token(s)")]
    OddMetadataArguments { count: usize },

    /// Metadata record could not be decoded as a JSON object
    #[error("Metadata error: {0}")]
    Metadata(String),

    /// Archive member the writer cannot reproduce
    #[error("Unsupported archive member: {path} ({kind})")]
    UnsupportedMember { path: String, kind: String },

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for RetagError {
    fn from(err: serde_json::Error) -> Self {
        RetagError::SerializationError(err.to_string())
    }
}

/// Result type alias for image retag operations
pub type Result<T> = std::result::Result<T, RetagError>;
