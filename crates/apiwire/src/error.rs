use thiserror::Error;

use apiwire_acl::AuthorizationError;
use apiwire_body::BodyError;

/// Any failure raised while preparing or authorizing an action request.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PluginError {
    #[error(transparent)]
    Body(#[from] BodyError),

    #[error(transparent)]
    Authorization(#[from] AuthorizationError),
}

impl PluginError {
    /// Check if the request body could not be built.
    pub const fn is_body_error(&self) -> bool {
        matches!(self, Self::Body(_))
    }

    /// Check if the access decision failed.
    pub const fn is_authorization_error(&self) -> bool {
        matches!(self, Self::Authorization(_))
    }

    /// Check if a JSON body could not be parsed.
    pub const fn is_json_parse_error(&self) -> bool {
        matches!(self, Self::Body(e) if e.is_json_parse_error())
    }
}

pub type Result<T> = std::result::Result<T, PluginError>;
