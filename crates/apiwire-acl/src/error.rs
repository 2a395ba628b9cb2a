//! Error types for authorization decisions.

use thiserror::Error;

/// Errors that can occur while evaluating an access decision.
///
/// Any failure fails the whole decision. There is no retry and no fallback
/// verdict.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthorizationError {
    /// The current principal could not be resolved.
    #[error("Principal lookup failed: {0}")]
    PrincipalLookup(String),

    /// One of the principal's groups could not be resolved.
    #[error("Group lookup failed for '{group_id}': {message}")]
    GroupLookup {
        /// Group that failed to load.
        group_id: String,
        /// Store diagnostic.
        message: String,
    },

    /// Network or HTTP failure talking to the decision service.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The decision service answered with a non-success status.
    #[error("Decision service error ({status}): {message}")]
    Service {
        /// HTTP status code.
        status: u16,
        /// Response body, if any.
        message: String,
    },

    /// The decision service answered with an unexpected body.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Client configuration issue.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl AuthorizationError {
    /// Check if the failure happened before the decision service was called.
    pub const fn is_lookup_error(&self) -> bool {
        matches!(self, Self::PrincipalLookup(_) | Self::GroupLookup { .. })
    }
}

/// Result type alias using `AuthorizationError`.
pub type Result<T> = std::result::Result<T, AuthorizationError>;
