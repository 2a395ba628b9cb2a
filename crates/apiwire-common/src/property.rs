//! Key/value/type records that describe one logical body field.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single body field from a stored action configuration.
///
/// Properties are authored by users and are loosely typed: the key may be
/// missing, the value may be any JSON value, and the multipart tag is free
/// text. Encoders skip properties without a key.
///
/// # Examples
///
/// ```
/// use apiwire_common::Property;
///
/// let field = Property::new("name", "apiwire").with_type("TEXT");
/// assert_eq!(field.key.as_deref(), Some("name"));
/// assert_eq!(field.value_text().as_deref(), Some("apiwire"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    /// Field name. `None` means the field is ignored by every encoder.
    #[serde(default)]
    pub key: Option<String>,
    /// Field value as authored.
    #[serde(default)]
    pub value: Value,
    /// Multipart tag (`TEXT`, `FILE` or `ARRAY`, any case).
    #[serde(default, rename = "type")]
    pub r#type: Option<String>,
}

impl Property {
    /// Creates an untyped property.
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: Some(key.into()),
            value: value.into(),
            r#type: None,
        }
    }

    /// Creates a property with no key.
    pub fn keyless(value: impl Into<Value>) -> Self {
        Self {
            key: None,
            value: value.into(),
            r#type: None,
        }
    }

    /// Sets the multipart tag.
    #[must_use]
    pub fn with_type(mut self, r#type: impl Into<String>) -> Self {
        self.r#type = Some(r#type.into());
        self
    }

    /// Renders the value as text the way body encoders see it.
    ///
    /// Strings are returned as-is, `null` renders as the empty string and
    /// numbers and booleans use their JSON text. Objects and arrays have no
    /// scalar text form and return `None`.
    #[must_use]
    pub fn value_text(&self) -> Option<String> {
        match &self.value {
            Value::String(s) => Some(s.clone()),
            Value::Null => Some(String::new()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Parses the multipart tag.
    ///
    /// Returns `Ok(None)` when no tag is present.
    ///
    /// # Errors
    ///
    /// Returns an error if a tag is present but not recognized.
    pub fn multipart_type(&self) -> anyhow::Result<Option<MultipartFormDataType>> {
        self.r#type
            .as_deref()
            .map(str::parse::<MultipartFormDataType>)
            .transpose()
    }
}

/// How a property is laid out inside a multipart body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MultipartFormDataType {
    /// Plain scalar sent as a `text/plain` part.
    Text,
    /// One or more binary attachments described by JSON descriptors.
    File,
    /// A JSON array expanded into repeated parts under the same name.
    Array,
}

impl fmt::Display for MultipartFormDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "TEXT"),
            Self::File => write!(f, "FILE"),
            Self::Array => write!(f, "ARRAY"),
        }
    }
}

impl FromStr for MultipartFormDataType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "TEXT" => Ok(Self::Text),
            "FILE" => Ok(Self::File),
            "ARRAY" => Ok(Self::Array),
            _ => anyhow::bail!("Unknown multipart data type: {s}"),
        }
    }
}
