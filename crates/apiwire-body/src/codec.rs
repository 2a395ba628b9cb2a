//! Content codec selection.
//!
//! [`BodyCodec`] is the single entry point of the body pipeline. It is built
//! once from a [`CodecConfig`] and passed to every call site; it holds no
//! mutable state.

use bytes::Bytes;
use log::debug;
use typed_builder::TypedBuilder;

use apiwire_common::Property;

use crate::artifact::{BodyArtifact, BodySource, latin1_bytes};
use crate::error::{BodyError, Result};
use crate::form::FormEncoder;
use crate::json::JsonNormalizer;
use crate::multipart::{DEFAULT_CHUNK_SIZE, MultipartAssembler};

/// `application/json`
pub const APPLICATION_JSON: &str = "application/json";
/// `application/x-www-form-urlencoded`
pub const APPLICATION_FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
/// `multipart/form-data`
pub const MULTIPART_FORM_DATA: &str = "multipart/form-data";

/// Settings for the body pipeline.
///
/// # Examples
///
/// ```
/// use apiwire_body::CodecConfig;
///
/// let config = CodecConfig::builder().file_chunk_size(8192).build();
/// assert_eq!(config.file_chunk_size, 8192);
/// assert_eq!(CodecConfig::default().file_chunk_size, 4096);
/// ```
#[derive(Debug, Clone, Copy, TypedBuilder)]
pub struct CodecConfig {
    /// Block size for streamed multipart file parts.
    #[builder(default = DEFAULT_CHUNK_SIZE)]
    pub file_chunk_size: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Encoding strategy for a declared content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentCodec {
    /// `application/json`
    Json,
    /// `application/x-www-form-urlencoded`
    FormUrlEncoded,
    /// `multipart/form-data`
    Multipart,
    /// Anything else; the body is sent as Latin-1 text.
    Opaque,
}

impl ContentCodec {
    /// Picks the codec for a content type.
    ///
    /// Only the media type is considered; parameters such as `charset` and
    /// letter case are ignored.
    #[must_use]
    pub fn from_content_type(content_type: &str) -> Self {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            APPLICATION_JSON => Self::Json,
            APPLICATION_FORM_URLENCODED => Self::FormUrlEncoded,
            MULTIPART_FORM_DATA => Self::Multipart,
            _ => Self::Opaque,
        }
    }

    /// Check if this codec reads the structured property list.
    #[must_use]
    pub const fn uses_properties(self) -> bool {
        matches!(self, Self::FormUrlEncoded | Self::Multipart)
    }
}

/// Turns body sources into transport-ready artifacts.
///
/// # Examples
///
/// ```
/// use apiwire_body::{BodyArtifact, BodyCodec, BodySource};
/// use apiwire_common::Property;
///
/// let codec = BodyCodec::default();
///
/// let body = BodySource::Properties(vec![Property::new("q", "a b")]);
/// let artifact = codec.encode(Some(body), "application/x-www-form-urlencoded", true)?;
/// assert!(matches!(artifact, BodyArtifact::Text(ref t) if t == "q=a+b"));
///
/// assert!(codec.encode(None, "application/json", false)?.is_empty_bytes());
/// # Ok::<(), apiwire_body::BodyError>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct BodyCodec {
    json: JsonNormalizer,
    form: FormEncoder,
    multipart: MultipartAssembler,
}

impl BodyCodec {
    /// Creates a codec from its configuration.
    #[must_use]
    pub const fn new(config: CodecConfig) -> Self {
        Self {
            json: JsonNormalizer::new(),
            form: FormEncoder::new(),
            multipart: MultipartAssembler::new(config.file_chunk_size),
        }
    }

    /// Encodes a body for the given content type.
    ///
    /// - No body gives an empty byte body.
    /// - JSON bodies go through [`JsonNormalizer`].
    /// - Form bodies go through [`FormEncoder`]; an empty form is an empty
    ///   byte body.
    /// - Multipart bodies are captured by [`MultipartAssembler`] and built
    ///   when attached to the request; an empty list is an empty byte body.
    /// - Anything else is sent as Latin-1 text.
    ///
    /// # Errors
    ///
    /// Returns an error when JSON text is malformed, a form value cannot be
    /// encoded, or a form/multipart content type is paired with a body that
    /// is not a property list.
    pub fn encode(
        &self,
        body: Option<BodySource>,
        content_type: &str,
        encode_params: bool,
    ) -> Result<BodyArtifact> {
        let Some(body) = body else {
            return Ok(BodyArtifact::empty());
        };

        let codec = ContentCodec::from_content_type(content_type);
        debug!("Encoding request body for '{content_type}' with {codec:?} codec");

        match codec {
            ContentCodec::Json => self.json.normalize(body),
            ContentCodec::FormUrlEncoded => {
                let form = self
                    .form
                    .encode(properties(&body, content_type)?, encode_params)?;
                if form.is_empty() {
                    Ok(BodyArtifact::empty())
                } else {
                    Ok(BodyArtifact::Text(form))
                }
            }
            ContentCodec::Multipart => {
                let properties = properties(&body, content_type)?;
                if properties.is_empty() {
                    Ok(BodyArtifact::empty())
                } else {
                    Ok(BodyArtifact::Multipart(self.multipart.assemble(properties)))
                }
            }
            ContentCodec::Opaque => {
                let text = match body {
                    BodySource::Text(text) => text,
                    BodySource::Json(value) => value.to_string(),
                    BodySource::Properties(properties) => serde_json::to_string(&properties)?,
                };
                Ok(BodyArtifact::Bytes(Bytes::from(latin1_bytes(&text))))
            }
        }
    }
}

impl Default for BodyCodec {
    fn default() -> Self {
        Self::new(CodecConfig::default())
    }
}

fn properties<'a>(body: &'a BodySource, content_type: &str) -> Result<&'a [Property]> {
    match body {
        BodySource::Properties(properties) => Ok(properties),
        BodySource::Text(_) | BodySource::Json(_) => Err(BodyError::DatasourceArgument(format!(
            "Expected a list of properties for a '{content_type}' body"
        ))),
    }
}
