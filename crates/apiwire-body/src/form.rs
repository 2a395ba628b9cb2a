//! `application/x-www-form-urlencoded` body encoding.

use url::form_urlencoded;

use apiwire_common::Property;

use crate::error::{BodyError, Result};

/// Serializes a property list as `key=value` pairs joined by `&`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormEncoder;

impl FormEncoder {
    /// Creates an encoder.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Encodes properties as a form body.
    ///
    /// Keyless properties are skipped. When `url_encode` is set, values are
    /// form-urlencoded as UTF-8; otherwise they are assumed to be encoded
    /// already and are copied as-is. Keys are never encoded. A property
    /// without a value still contributes `key=`.
    ///
    /// # Errors
    ///
    /// Returns [`BodyError::UnsupportedOperation`] when a value is a JSON
    /// object or array, which has no form text.
    pub fn encode(&self, properties: &[Property], url_encode: bool) -> Result<String> {
        let pairs = properties
            .iter()
            .filter_map(|property| property.key.as_deref().map(|key| (key, property)))
            .map(|(key, property)| {
                let value = property.value_text().ok_or_else(|| {
                    BodyError::UnsupportedOperation(format!(
                        "cannot form-encode structured value for key '{key}'"
                    ))
                })?;

                let value = if url_encode {
                    form_urlencoded::byte_serialize(value.as_bytes()).collect()
                } else {
                    value
                };

                Ok(format!("{key}={value}"))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(pairs.join("&"))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use proptest::prelude::*;
    use serde_json::{Value, json};

    #[test]
    fn test_empty_list() {
        assert_eq!(FormEncoder::new().encode(&[], true).unwrap(), "");
    }

    #[test]
    fn test_only_keyless_properties() {
        let properties = vec![Property::keyless("a"), Property::keyless("b")];
        assert_eq!(FormEncoder::new().encode(&properties, false).unwrap(), "");
    }

    #[test]
    fn test_pairs_are_joined() {
        let properties = vec![
            Property::new("a", "1"),
            Property::keyless("ignored"),
            Property::new("b", "2"),
        ];

        assert_eq!(
            FormEncoder::new().encode(&properties, false).unwrap(),
            "a=1&b=2"
        );
    }

    #[test]
    fn test_url_encoding_of_values() {
        let properties = vec![
            Property::new("q", "hello world"),
            Property::new("sym", "a&b=c/d"),
            Property::new("utf", "caf\u{e9}"),
        ];

        assert_eq!(
            FormEncoder::new().encode(&properties, true).unwrap(),
            "q=hello+world&sym=a%26b%3Dc%2Fd&utf=caf%C3%A9"
        );
    }

    #[test]
    fn test_values_copied_when_not_encoding() {
        let properties = vec![Property::new("q", "hello%20world")];
        assert_eq!(
            FormEncoder::new().encode(&properties, false).unwrap(),
            "q=hello%20world"
        );
    }

    #[test]
    fn test_missing_value_emits_empty_pair() {
        let properties = vec![Property::new("empty", Value::Null), Property::new("b", "2")];

        assert_eq!(
            FormEncoder::new().encode(&properties, true).unwrap(),
            "empty=&b=2"
        );
    }

    #[test]
    fn test_scalar_values_are_rendered() {
        let properties = vec![Property::new("n", 7), Property::new("t", true)];
        assert_eq!(
            FormEncoder::new().encode(&properties, false).unwrap(),
            "n=7&t=true"
        );
    }

    #[test]
    fn test_structured_value_is_rejected() {
        let properties = vec![Property::new("obj", json!({"a": 1}))];
        let err = FormEncoder::new().encode(&properties, true).unwrap_err();
        assert!(matches!(err, BodyError::UnsupportedOperation(_)));
    }

    proptest! {
        #[test]
        fn test_unencoded_pairs_split_back(
            pairs in prop::collection::vec(("[a-z][a-z0-9_]{0,8}", "[A-Za-z0-9 ._-]{0,12}"), 1..8)
        ) {
            let properties: Vec<Property> = pairs
                .iter()
                .map(|(k, v)| Property::new(k.clone(), v.clone()))
                .collect();

            let encoded = FormEncoder::new().encode(&properties, false).unwrap();
            let decoded: Vec<(String, String)> = encoded
                .split('&')
                .map(|pair| {
                    let (k, v) = pair.split_once('=').unwrap();
                    (k.to_string(), v.to_string())
                })
                .collect();

            prop_assert_eq!(decoded, pairs);
        }
    }
}
