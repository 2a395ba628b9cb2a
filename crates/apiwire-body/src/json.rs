//! JSON body normalization.
//!
//! Raw body text that looks like a JSON object or array is parsed so the
//! transport sends canonical JSON. Anything else passes through untouched:
//! scalars, quoted strings and fragments that do not open with `{` or `[` are
//! sent verbatim.

use std::borrow::Cow;

use log::debug;
use serde_json::Value;

use crate::artifact::{BodyArtifact, BodySource};
use crate::error::{BodyError, Result};

/// Coerces raw JSON body text into structured JSON.
///
/// Stateless; one instance is shared by every call through
/// [`BodyCodec`](crate::BodyCodec).
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonNormalizer;

impl JsonNormalizer {
    /// Creates a normalizer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Normalizes a body for a JSON request.
    ///
    /// - Structured input is returned unchanged.
    /// - The empty string becomes an empty byte body. Request signers that
    ///   hash the payload treat an empty string differently from no content.
    /// - Text whose trimmed form starts with `{` or `[` is parsed, keeping
    ///   object key order.
    /// - Any other text is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`BodyError::JsonParse`] when text opening with `{` or `[` is
    /// not valid JSON.
    pub fn normalize(&self, body: BodySource) -> Result<BodyArtifact> {
        match body {
            BodySource::Text(text) => Self::normalize_text(text),
            BodySource::Json(value) => Ok(BodyArtifact::Json(value)),
            BodySource::Properties(properties) => {
                Ok(BodyArtifact::Json(serde_json::to_value(properties)?))
            }
        }
    }

    fn normalize_text(text: String) -> Result<BodyArtifact> {
        if text.is_empty() {
            return Ok(BodyArtifact::empty());
        }

        match parse_structured(&text) {
            Ok(Some(value)) => Ok(BodyArtifact::Json(value)),
            Ok(None) => {
                debug!("JSON body is not an object or array, sending as text");
                Ok(BodyArtifact::Text(text))
            }
            Err(e) => Err(BodyError::JsonParse {
                body: text,
                message: e.to_string(),
            }),
        }
    }
}

/// Parses text as a JSON object or array.
///
/// Returns `Ok(None)` when the trimmed text does not start with `{` or `[`.
/// Raw control characters inside string literals are escaped before parsing.
/// Text rejected by the strict parser is retried as JSON5, which accepts
/// single-quoted strings, unquoted keys, trailing commas and comments.
///
/// # Errors
///
/// Returns the strict parser error when neither grammar accepts the input.
pub fn parse_structured(text: &str) -> serde_json::Result<Option<Value>> {
    let trimmed = text.trim();
    if !trimmed.starts_with('{') && !trimmed.starts_with('[') {
        return Ok(None);
    }

    let escaped = escape_control_characters(trimmed);
    match serde_json::from_str(&escaped) {
        Ok(value) => Ok(Some(value)),
        Err(strict) => match json5::from_str::<Value>(&escaped) {
            Ok(value) => {
                debug!("Parsed JSON body leniently after strict parse failed: {strict}");
                Ok(Some(value))
            }
            Err(_) => Err(strict),
        },
    }
}

fn escape_control_characters(text: &str) -> Cow<'_, str> {
    if !text.chars().any(|c| c < '\u{20}') {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 16);
    let mut in_string = false;
    let mut escaped = false;

    for c in text.chars() {
        if !in_string {
            in_string = c == '"';
            out.push(c);
            continue;
        }

        if escaped {
            escaped = false;
            out.push(c);
            continue;
        }

        match c {
            '\\' => {
                escaped = true;
                out.push(c);
            }
            '"' => {
                in_string = false;
                out.push(c);
            }
            c if c < '\u{20}' => out.push_str(&format!("\\u{:04x}", u32::from(c))),
            c => out.push(c),
        }
    }

    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use apiwire_common::Property;
    use serde_json::json;

    fn normalize(text: &str) -> Result<BodyArtifact> {
        JsonNormalizer::new().normalize(BodySource::from(text))
    }

    #[test]
    fn test_empty_string_is_empty_bytes() {
        let artifact = normalize("").unwrap();
        assert!(artifact.is_empty_bytes());
    }

    #[test]
    fn test_object_is_parsed_in_key_order() {
        let artifact = normalize(r#"  {"z": 1, "a": {"nested": true}}  "#).unwrap();

        let BodyArtifact::Json(Value::Object(map)) = artifact else {
            unreachable!("expected a JSON object");
        };
        let keys: Vec<&String> = map.keys().collect();
        assert_eq!(keys, ["z", "a"]);
        assert_eq!(map["a"], json!({"nested": true}));
    }

    #[test]
    fn test_array_is_parsed() {
        let artifact = normalize("[1, \"two\", null]").unwrap();
        assert!(matches!(artifact, BodyArtifact::Json(Value::Array(ref items)) if items.len() == 3));
    }

    #[test]
    fn test_non_structured_text_passes_through() {
        for text in ["hello", "42", "\"quoted\"", "true", "  not json {"] {
            let artifact = normalize(text).unwrap();
            assert!(
                matches!(artifact, BodyArtifact::Text(ref t) if t == text),
                "{text} should pass through"
            );
        }
    }

    #[test]
    fn test_whitespace_only_text_passes_through() {
        let artifact = normalize("   ").unwrap();
        assert!(matches!(artifact, BodyArtifact::Text(ref t) if t == "   "));
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let err = normalize(r#"{"a": }"#).unwrap_err();

        assert!(err.is_json_parse_error());
        let BodyError::JsonParse { body, message } = err else {
            unreachable!("expected a JSON parse error");
        };
        assert_eq!(body, r#"{"a": }"#);
        assert!(!message.is_empty());
    }

    #[test]
    fn test_trailing_garbage_is_an_error() {
        assert!(normalize("[1, 2] extra").unwrap_err().is_json_parse_error());
    }

    #[test]
    fn test_raw_control_characters_in_strings_are_tolerated() {
        let artifact = normalize("{\"text\": \"line one\nline\ttwo\"}").unwrap();

        let BodyArtifact::Json(value) = artifact else {
            unreachable!("expected JSON");
        };
        assert_eq!(value["text"], json!("line one\nline\ttwo"));
    }

    #[test]
    fn test_escaped_quotes_do_not_end_strings() {
        let artifact = normalize("{\"a\": \"say \\\"hi\\\"\n\"}").unwrap();

        let BodyArtifact::Json(value) = artifact else {
            unreachable!("expected JSON");
        };
        assert_eq!(value["a"], json!("say \"hi\"\n"));
    }

    #[test]
    fn test_lenient_syntax_is_accepted() {
        let artifact = normalize("{'a': 1}").unwrap();
        let BodyArtifact::Json(value) = artifact else {
            unreachable!("expected JSON");
        };
        assert_eq!(value["a"].as_f64(), Some(1.0));

        let artifact = normalize("{a: 'x', b: true}").unwrap();
        let BodyArtifact::Json(value) = artifact else {
            unreachable!("expected JSON");
        };
        assert_eq!(value, json!({"a": "x", "b": true}));

        let artifact = normalize("[1, 2,]").unwrap();
        assert!(matches!(artifact, BodyArtifact::Json(Value::Array(ref items)) if items.len() == 2));

        let artifact = normalize(r#"{"a": "b",}"#).unwrap();
        assert!(matches!(artifact, BodyArtifact::Json(ref v) if *v == json!({"a": "b"})));
    }

    #[test]
    fn test_lenient_keys_keep_order() {
        let artifact = normalize("{z: 'last', a: 'first'}").unwrap();

        let BodyArtifact::Json(Value::Object(map)) = artifact else {
            unreachable!("expected a JSON object");
        };
        let keys: Vec<&String> = map.keys().collect();
        assert_eq!(keys, ["z", "a"]);
    }

    #[test]
    fn test_structured_input_is_unchanged() {
        let value = json!({"a": [1, 2, 3]});
        let artifact = JsonNormalizer::new()
            .normalize(BodySource::Json(value.clone()))
            .unwrap();

        assert!(matches!(artifact, BodyArtifact::Json(ref v) if *v == value));
    }

    #[test]
    fn test_property_list_serializes_as_array() {
        let artifact = JsonNormalizer::new()
            .normalize(BodySource::Properties(vec![Property::new("k", "v")]))
            .unwrap();

        let BodyArtifact::Json(value) = artifact else {
            unreachable!("expected JSON");
        };
        assert_eq!(value, json!([{"key": "k", "value": "v", "type": null}]));
    }

    #[test]
    fn test_parse_structured_skips_scalars() {
        assert_eq!(parse_structured("12").unwrap(), None);
        assert_eq!(parse_structured("{}").unwrap(), Some(json!({})));
    }
}
