//! Multipart form-data assembly.
//!
//! A flat property list becomes a multipart body by dispatching each property
//! on its declared [`MultipartFormDataType`]:
//!
//! | tag | parts |
//! |-----|-------|
//! | none | one part holding the raw value |
//! | `TEXT` | one `text/plain` part with the Latin-1 bytes of the value |
//! | `FILE` | one streamed attachment per JSON descriptor |
//! | `ARRAY` | one part per element of a JSON array |
//!
//! Properties without a tag predate typed properties and are passed through.
//! A tag that is present but unknown is rejected.
//!
//! Assembly is lazy. [`MultipartAssembler::assemble`] only captures the
//! properties; descriptors are parsed when the transport asks for the form,
//! and file bytes are pulled in fixed-size chunks while the request is sent.
//!
//! # Example
//!
//! ```
//! use apiwire_body::multipart::{MultipartAssembler, PartBody};
//! use apiwire_common::Property;
//!
//! let properties = vec![
//!     Property::new("file", r#"{"name":"a.txt","type":"text/plain","data":"hi"}"#)
//!         .with_type("FILE"),
//! ];
//!
//! let body = MultipartAssembler::default().assemble(&properties);
//! let parts = body.parts()?;
//!
//! assert_eq!(parts.len(), 1);
//! let PartBody::File(source) = &parts[0].body else { unreachable!() };
//! assert_eq!(source.filename(), Some("a.txt"));
//! assert_eq!(source.content_type(), "text/plain");
//! assert_eq!(source.data().as_ref(), b"hi");
//! # Ok::<(), apiwire_body::BodyError>(())
//! ```

use std::io;

use bytes::Bytes;
use futures::stream::{self, Stream};
use log::{debug, warn};
use reqwest::Body;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::Value;

use apiwire_common::{MultipartFormDataType, Property};

use crate::artifact::latin1_bytes;
use crate::error::{BodyError, MULTIPART_DATA_EXPECTED, Result};

/// Default block size for streamed file parts.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

const OCTET_STREAM: &str = "application/octet-stream";
const TEXT_PLAIN_UTF8: &str = "text/plain; charset=utf-8";

/// One part of a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPart {
    /// Form field name.
    pub name: String,
    /// Part content.
    pub body: PartBody,
}

impl FormPart {
    fn new(name: &str, body: PartBody) -> Self {
        Self {
            name: name.to_string(),
            body,
        }
    }

    /// Converts the part into its reqwest form.
    ///
    /// # Errors
    ///
    /// Returns an error if a declared MIME type does not parse or a JSON part
    /// cannot be serialized.
    pub fn into_reqwest(self) -> Result<Part> {
        match self.body {
            PartBody::String(text) => with_content_type(Part::text(text), TEXT_PLAIN_UTF8),
            PartBody::Text(data) => with_content_type(Part::bytes(data.to_vec()), "text/plain"),
            PartBody::Json(value) => with_content_type(
                Part::bytes(serde_json::to_vec(&value)?),
                "application/json",
            ),
            PartBody::File(source) => source.into_part(),
        }
    }
}

/// Content of a [`FormPart`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartBody {
    /// An untyped string value, sent as UTF-8 `text/plain`.
    String(String),
    /// Latin-1 bytes of a `TEXT` property, sent as `text/plain`.
    Text(Bytes),
    /// A structured value, sent as `application/json`.
    Json(Value),
    /// A streamed file attachment.
    File(FileSource),
}

/// A file attachment decoded from a descriptor.
///
/// The bytes are held once and streamed as cheap slices, so the stream can
/// be restarted from the source but not resumed mid-way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSource {
    filename: Option<String>,
    content_type: String,
    data: Bytes,
    chunk_size: usize,
}

impl FileSource {
    /// Attachment file name.
    #[must_use]
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Declared MIME type.
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Attachment bytes.
    #[must_use]
    pub const fn data(&self) -> &Bytes {
        &self.data
    }

    /// Payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Streams the payload in blocks of the configured chunk size.
    ///
    /// Every call starts a fresh stream from the beginning of the source.
    pub fn chunks(&self) -> impl Stream<Item = io::Result<Bytes>> + Send + Sync + 'static {
        let data = self.data.clone();
        let len = data.len();
        let chunk_size = self.chunk_size.max(1);

        stream::iter((0..len).step_by(chunk_size).map(move |start| {
            let end = usize::min(start + chunk_size, len);
            Ok::<_, io::Error>(data.slice(start..end))
        }))
    }

    fn into_part(self) -> Result<Part> {
        let length = self.data.len() as u64;
        let mut part = Part::stream_with_length(Body::wrap_stream(self.chunks()), length);

        if let Some(filename) = self.filename {
            part = part.file_name(filename);
        }

        with_content_type(part, &self.content_type)
    }
}

fn with_content_type(part: Part, content_type: &str) -> Result<Part> {
    part.mime_str(content_type).map_err(|e| {
        BodyError::DatasourceArgument(format!(
            "Invalid content type '{content_type}' for multipart part: {e}"
        ))
    })
}

/// Descriptor of one file attachment as stored in a `FILE` property.
#[derive(Debug, Deserialize)]
struct FileDescriptor {
    #[serde(default)]
    name: Option<String>,
    #[serde(default, rename = "type")]
    content_type: Option<String>,
    #[serde(default)]
    data: Value,
}

impl FileDescriptor {
    fn into_source(self, chunk_size: usize) -> FileSource {
        let data = match self.data {
            Value::String(s) => s,
            Value::Null => String::new(),
            other => other.to_string(),
        };

        FileSource {
            filename: self.name,
            content_type: self
                .content_type
                .unwrap_or_else(|| OCTET_STREAM.to_string()),
            data: Bytes::from(latin1_bytes(&data)),
            chunk_size,
        }
    }
}

/// Turns one property into multipart parts.
///
/// There is one implementation per [`MultipartFormDataType`] plus
/// [`PassthroughEncoder`] for untagged properties.
pub trait PartEncoder {
    /// Encodes `property` under the field name `key`.
    ///
    /// # Errors
    ///
    /// Returns an error when the property value does not fit the encoder.
    fn encode(&self, key: &str, property: &Property) -> Result<Vec<FormPart>>;
}

/// Encoder for untagged properties: the raw value becomes a single part.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughEncoder;

impl PartEncoder for PassthroughEncoder {
    fn encode(&self, key: &str, property: &Property) -> Result<Vec<FormPart>> {
        Ok(vec![value_part(key, &property.value)])
    }
}

/// Encoder for `TEXT` properties.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextEncoder;

impl PartEncoder for TextEncoder {
    fn encode(&self, key: &str, property: &Property) -> Result<Vec<FormPart>> {
        let text = property
            .value_text()
            .unwrap_or_else(|| property.value.to_string());

        Ok(vec![FormPart::new(
            key,
            PartBody::Text(Bytes::from(latin1_bytes(&text))),
        )])
    }
}

/// Encoder for `FILE` properties.
#[derive(Debug, Clone, Copy)]
pub struct FileEncoder {
    chunk_size: usize,
}

impl FileEncoder {
    /// Creates an encoder that streams attachments in `chunk_size` blocks.
    #[must_use]
    pub const fn new(chunk_size: usize) -> Self {
        Self { chunk_size }
    }

    fn descriptors(text: &str) -> Result<Vec<FileDescriptor>> {
        let parsed = if text.starts_with('{') {
            serde_json::from_str::<FileDescriptor>(text).map(|d| vec![d])
        } else if text.starts_with('[') {
            serde_json::from_str::<Vec<FileDescriptor>>(text)
        } else {
            return Err(BodyError::DatasourceArgument(
                MULTIPART_DATA_EXPECTED.to_string(),
            ));
        };

        parsed.map_err(|e| {
            warn!("Failed to parse multipart file descriptor: {e}");
            BodyError::DatasourceArgument(format!("{MULTIPART_DATA_EXPECTED}: {e}"))
        })
    }
}

impl Default for FileEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE)
    }
}

impl PartEncoder for FileEncoder {
    fn encode(&self, key: &str, property: &Property) -> Result<Vec<FormPart>> {
        let Value::String(text) = &property.value else {
            return Err(BodyError::DatasourceArgument(
                MULTIPART_DATA_EXPECTED.to_string(),
            ));
        };

        Ok(Self::descriptors(text)?
            .into_iter()
            .map(|descriptor| {
                FormPart::new(key, PartBody::File(descriptor.into_source(self.chunk_size)))
            })
            .collect())
    }
}

/// Encoder for `ARRAY` properties.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrayEncoder;

impl PartEncoder for ArrayEncoder {
    fn encode(&self, key: &str, property: &Property) -> Result<Vec<FormPart>> {
        let Value::String(text) = &property.value else {
            return Ok(vec![value_part(key, &property.value)]);
        };

        match serde_json::from_str::<Value>(text) {
            Ok(Value::Array(items)) => Ok(items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => FormPart::new(key, PartBody::String(s)),
                    other => FormPart::new(key, PartBody::Json(other)),
                })
                .collect()),
            Ok(_) => {
                warn!("ARRAY value for '{key}' is not a JSON array, sending raw string");
                Ok(vec![FormPart::new(key, PartBody::String(text.clone()))])
            }
            Err(e) => {
                warn!("ARRAY value for '{key}' is not JSON ({e}), sending raw string");
                Ok(vec![FormPart::new(key, PartBody::String(text.clone()))])
            }
        }
    }
}

fn value_part(key: &str, value: &Value) -> FormPart {
    match value {
        Value::String(s) => FormPart::new(key, PartBody::String(s.clone())),
        Value::Null => FormPart::new(key, PartBody::String(String::new())),
        other => FormPart::new(key, PartBody::Json(other.clone())),
    }
}

/// Builds lazy multipart bodies from property lists.
#[derive(Debug, Clone, Copy)]
pub struct MultipartAssembler {
    chunk_size: usize,
}

impl MultipartAssembler {
    /// Creates an assembler streaming file parts in `chunk_size` blocks.
    #[must_use]
    pub const fn new(chunk_size: usize) -> Self {
        Self { chunk_size }
    }

    /// Captures `properties` for deferred assembly.
    ///
    /// The input is copied, never modified. No descriptor is parsed until
    /// [`MultipartBody::parts`] or [`MultipartBody::into_form`] runs.
    #[must_use]
    pub fn assemble(&self, properties: &[Property]) -> MultipartBody {
        MultipartBody {
            properties: properties.to_vec(),
            chunk_size: self.chunk_size,
        }
    }
}

impl Default for MultipartAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE)
    }
}

/// A multipart body that has not been assembled yet.
#[derive(Debug, Clone)]
pub struct MultipartBody {
    properties: Vec<Property>,
    chunk_size: usize,
}

impl MultipartBody {
    /// Dispatches every keyed property to its encoder.
    ///
    /// # Errors
    ///
    /// Returns [`BodyError::UnsupportedPartType`] for an unknown tag and
    /// [`BodyError::DatasourceArgument`] for a malformed file descriptor.
    pub fn parts(&self) -> Result<Vec<FormPart>> {
        debug!(
            "Assembling multipart body from {} properties",
            self.properties.len()
        );

        let mut parts = Vec::with_capacity(self.properties.len());
        for property in &self.properties {
            let Some(key) = property.key.as_deref() else {
                continue;
            };
            parts.extend(self.encode_property(key, property)?);
        }

        Ok(parts)
    }

    /// Assembles the reqwest form, with file parts streaming from their source.
    ///
    /// # Errors
    ///
    /// Returns an error if assembly fails or a part cannot be converted.
    pub fn into_form(self) -> Result<Form> {
        self.parts()?
            .into_iter()
            .try_fold(Form::new(), |form, part| {
                let name = part.name.clone();
                Ok(form.part(name, part.into_reqwest()?))
            })
    }

    fn encode_property(&self, key: &str, property: &Property) -> Result<Vec<FormPart>> {
        let kind = property
            .multipart_type()
            .map_err(|e| BodyError::UnsupportedPartType(e.to_string()))?;

        match kind {
            None => PassthroughEncoder.encode(key, property),
            Some(MultipartFormDataType::Text) => TextEncoder.encode(key, property),
            Some(MultipartFormDataType::File) => {
                FileEncoder::new(self.chunk_size).encode(key, property)
            }
            Some(MultipartFormDataType::Array) => ArrayEncoder.encode(key, property),
        }
    }
}
