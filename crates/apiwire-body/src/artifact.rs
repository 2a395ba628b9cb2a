//! Body sources going into the pipeline and artifacts coming out of it.

use bytes::Bytes;
use reqwest::RequestBuilder;
use serde_json::Value;

use apiwire_common::Property;

use crate::error::Result;
use crate::multipart::MultipartBody;

/// The resolved body object before encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodySource {
    /// Raw text as authored.
    Text(String),
    /// Already-structured JSON.
    Json(Value),
    /// Structured property list for form and multipart bodies.
    Properties(Vec<Property>),
}

impl From<String> for BodySource {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for BodySource {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Value> for BodySource {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<Vec<Property>> for BodySource {
    fn from(properties: Vec<Property>) -> Self {
        Self::Properties(properties)
    }
}

/// An encoded body ready for the transport.
///
/// The transport is responsible for setting the negotiated `Content-Type`
/// header, except for multipart bodies where reqwest adds the boundary.
#[derive(Debug)]
pub enum BodyArtifact {
    /// Raw bytes, sent verbatim. An empty body is always this variant.
    Bytes(Bytes),
    /// A single string, sent verbatim.
    Text(String),
    /// Structured JSON, serialized when attached.
    Json(Value),
    /// Multipart body, assembled when attached.
    Multipart(MultipartBody),
}

impl BodyArtifact {
    /// The empty-byte artifact.
    #[must_use]
    pub const fn empty() -> Self {
        Self::Bytes(Bytes::new())
    }

    /// Check if this artifact is a zero-length byte body.
    #[must_use]
    pub fn is_empty_bytes(&self) -> bool {
        matches!(self, Self::Bytes(bytes) if bytes.is_empty())
    }

    /// Hands the body to a request builder.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails or a multipart descriptor
    /// turns out to be malformed during assembly.
    pub fn attach(self, builder: RequestBuilder) -> Result<RequestBuilder> {
        match self {
            Self::Bytes(bytes) => Ok(builder.body(bytes)),
            Self::Text(text) => Ok(builder.body(text)),
            Self::Json(value) => Ok(builder.body(serde_json::to_vec(&value)?)),
            Self::Multipart(body) => Ok(builder.multipart(body.into_form()?)),
        }
    }
}

/// Encodes text as ISO-8859-1. Characters outside Latin-1 become `?`.
pub(crate) fn latin1_bytes(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}
