//! Error types for body construction.

use thiserror::Error;

/// Message used whenever a FILE property does not hold descriptor JSON.
pub(crate) const MULTIPART_DATA_EXPECTED: &str =
    "Unable to parse content. Expected to receive an array or object of multipart data";

/// Errors that can occur while building a request body.
///
/// Every variant is raised before any network I/O, except multipart
/// descriptor errors which surface when the multipart body is assembled at
/// send time.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BodyError {
    /// Text that looked like a JSON object or array failed to parse.
    #[error("Malformed JSON: {message}")]
    JsonParse {
        /// The body text as authored.
        body: String,
        /// Parser diagnostic.
        message: String,
    },

    /// A multipart descriptor or body argument has the wrong shape.
    #[error("Datasource argument error: {0}")]
    DatasourceArgument(String),

    /// A value could not be rendered in the requested encoding.
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// A property declared a multipart type that does not exist.
    #[error("Unsupported multipart type: {0}")]
    UnsupportedPartType(String),

    /// JSON serialization of a structured body failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BodyError {
    /// Check if this error came from parsing authored JSON.
    pub const fn is_json_parse_error(&self) -> bool {
        matches!(self, Self::JsonParse { .. })
    }

    /// Check if this error came from a malformed multipart argument.
    pub const fn is_datasource_argument_error(&self) -> bool {
        matches!(self, Self::DatasourceArgument(_))
    }
}

/// Result type alias using `BodyError`.
pub type Result<T> = std::result::Result<T, BodyError>;
