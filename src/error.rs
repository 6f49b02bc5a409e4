use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueryLensError {
    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Unsupported file extension: {0}")]
    UnsupportedExtension(String),

    #[error("No file extension found for path: {0}")]
    NoExtension(String),

    #[error("Failed to read {path}: {source}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid config {path}: {message}")]
    InvalidConfig { path: String, message: String },

    #[error("Invalid key binding '{0}'")]
    InvalidKeyBinding(String),

    #[error("Invalid edit: {0}")]
    InvalidEdit(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Serialization error")]
    SerializationError(#[from] serde_json::Error),
}
