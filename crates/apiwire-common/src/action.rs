//! Stored REST action configuration and the API content type marker.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::property::Property;

/// Form data key holding the declared API content type.
pub const FIELD_API_CONTENT_TYPE: &str = "apiContentType";

/// Body-bearing part of a stored action.
///
/// # Examples
///
/// ```
/// use apiwire_common::{ActionConfiguration, ApiContentType, Property};
///
/// let action = ActionConfiguration::default()
///     .with_body(r#"{"hello": "world"}"#)
///     .with_api_content_type(ApiContentType::Json)
///     .with_body_form_data(vec![Property::new("a", "1")]);
///
/// assert_eq!(action.api_content_type(), Some(ApiContentType::Json));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionConfiguration {
    /// Raw body text as authored.
    #[serde(default)]
    pub body: Option<String>,
    /// Structured body used for form and multipart requests.
    #[serde(default)]
    pub body_form_data: Option<Vec<Property>>,
    /// Free-form editor settings.
    #[serde(default)]
    pub form_data: Map<String, Value>,
}

impl ActionConfiguration {
    /// Sets the raw body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets the structured body.
    #[must_use]
    pub fn with_body_form_data(mut self, properties: Vec<Property>) -> Self {
        self.body_form_data = Some(properties);
        self
    }

    /// Declares the API content type in the form data.
    #[must_use]
    pub fn with_api_content_type(mut self, content_type: ApiContentType) -> Self {
        self.form_data.insert(
            FIELD_API_CONTENT_TYPE.to_string(),
            Value::String(content_type.as_str().to_string()),
        );
        self
    }

    /// Reads the declared API content type.
    ///
    /// Returns `None` when the marker is missing, not a string, or not one of
    /// the known values. Configurations created before the marker existed
    /// have no value here.
    #[must_use]
    pub fn api_content_type(&self) -> Option<ApiContentType> {
        self.form_data
            .get(FIELD_API_CONTENT_TYPE)
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
    }
}

/// API content type selected in the action editor.
///
/// Stored as the MIME type of the body (`none` for no body). The short editor
/// names (`json`, `raw`, ...) are accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ApiContentType {
    /// The request carries no body.
    #[serde(rename = "none")]
    None,
    /// JSON body.
    #[serde(rename = "application/json", alias = "json")]
    Json,
    /// URL-encoded form body.
    #[serde(
        rename = "application/x-www-form-urlencoded",
        alias = "x-www-form-urlencoded"
    )]
    FormUrlEncoded,
    /// Multipart form body.
    #[serde(rename = "multipart/form-data")]
    MultipartFormData,
    /// Raw text body.
    #[serde(rename = "text/plain", alias = "raw")]
    Raw,
    /// GraphQL query body.
    #[serde(rename = "application/graphql", alias = "graphql")]
    Graphql,
}

impl ApiContentType {
    /// Value stored in the configuration.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Json => "application/json",
            Self::FormUrlEncoded => "application/x-www-form-urlencoded",
            Self::MultipartFormData => "multipart/form-data",
            Self::Raw => "text/plain",
            Self::Graphql => "application/graphql",
        }
    }
}

impl fmt::Display for ApiContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiContentType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "application/json" | "json" => Ok(Self::Json),
            "application/x-www-form-urlencoded" | "x-www-form-urlencoded" => {
                Ok(Self::FormUrlEncoded)
            }
            "multipart/form-data" => Ok(Self::MultipartFormData),
            "text/plain" | "raw" => Ok(Self::Raw),
            "application/graphql" | "graphql" => Ok(Self::Graphql),
            _ => anyhow::bail!("Unknown API content type: {s}"),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_api_content_type_round_trips_through_form_data() {
        for content_type in [
            ApiContentType::None,
            ApiContentType::Json,
            ApiContentType::FormUrlEncoded,
            ApiContentType::MultipartFormData,
            ApiContentType::Raw,
            ApiContentType::Graphql,
        ] {
            let action = ActionConfiguration::default().with_api_content_type(content_type);
            assert_eq!(action.api_content_type(), Some(content_type));
        }
    }

    #[test]
    fn test_missing_or_unknown_marker() {
        let action = ActionConfiguration::default();
        assert_eq!(action.api_content_type(), None);

        let mut action = ActionConfiguration::default();
        action
            .form_data
            .insert(FIELD_API_CONTENT_TYPE.to_string(), Value::from("xml"));
        assert_eq!(action.api_content_type(), None);

        let mut action = ActionConfiguration::default();
        action
            .form_data
            .insert(FIELD_API_CONTENT_TYPE.to_string(), Value::from(7));
        assert_eq!(action.api_content_type(), None);
    }

    #[test]
    fn test_marker_accepts_mime_and_short_names() {
        for (stored, expected) in [
            ("application/json", ApiContentType::Json),
            ("json", ApiContentType::Json),
            ("application/x-www-form-urlencoded", ApiContentType::FormUrlEncoded),
            ("x-www-form-urlencoded", ApiContentType::FormUrlEncoded),
            ("multipart/form-data", ApiContentType::MultipartFormData),
            ("text/plain", ApiContentType::Raw),
            ("raw", ApiContentType::Raw),
            ("application/graphql", ApiContentType::Graphql),
            ("NONE", ApiContentType::None),
        ] {
            let mut action = ActionConfiguration::default();
            action
                .form_data
                .insert(FIELD_API_CONTENT_TYPE.to_string(), Value::from(stored));
            assert_eq!(action.api_content_type(), Some(expected), "{stored}");
        }
    }

    #[test]
    fn test_marker_is_stored_as_mime_type() {
        let action = ActionConfiguration::default().with_api_content_type(ApiContentType::Json);
        assert_eq!(action.form_data[FIELD_API_CONTENT_TYPE], "application/json");

        let value: ApiContentType = serde_json::from_str("\"raw\"").unwrap();
        assert_eq!(value, ApiContentType::Raw);
        assert_eq!(serde_json::to_string(&value).unwrap(), "\"text/plain\"");
    }

    #[test]
    fn test_deserialize_camel_case() {
        let json = r#"{
            "body": "{\"a\": 1}",
            "bodyFormData": [{"key": "a", "value": "1"}],
            "formData": {"apiContentType": "application/json"}
        }"#;

        let action: ActionConfiguration = serde_json::from_str(json).unwrap();

        assert_eq!(action.body.as_deref(), Some("{\"a\": 1}"));
        assert_eq!(action.body_form_data.as_ref().unwrap().len(), 1);
        assert_eq!(action.api_content_type(), Some(ApiContentType::Json));
    }
}
