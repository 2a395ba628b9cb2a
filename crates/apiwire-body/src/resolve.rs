//! Picks the body source of a stored action and encodes it.

use log::debug;
use reqwest::Method;

use apiwire_common::{ActionConfiguration, ApiContentType};

use crate::artifact::{BodyArtifact, BodySource};
use crate::codec::{BodyCodec, ContentCodec};
use crate::error::Result;

impl BodyCodec {
    /// Resolves and encodes the request body of an action.
    ///
    /// The body defaults to the empty string. Non-GET requests read the raw
    /// body. GET requests only read it when the action declares an API
    /// content type other than `none`; actions saved before the marker
    /// existed never send a GET body. Form and multipart requests always use
    /// the structured property list instead of the raw body.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`BodyCodec::encode`].
    ///
    /// # Examples
    ///
    /// ```
    /// use apiwire_body::BodyCodec;
    /// use apiwire_common::ActionConfiguration;
    /// use reqwest::Method;
    ///
    /// let action = ActionConfiguration::default().with_body(r#"{"ignored": true}"#);
    ///
    /// let artifact = BodyCodec::default().resolve(&action, "application/json", &Method::GET, false)?;
    /// assert!(artifact.is_empty_bytes());
    /// # Ok::<(), apiwire_body::BodyError>(())
    /// ```
    pub fn resolve(
        &self,
        action: &ActionConfiguration,
        content_type: &str,
        method: &Method,
        encode_params: bool,
    ) -> Result<BodyArtifact> {
        let api_content_type = action.api_content_type();
        let reads_raw_body = *method != Method::GET
            || api_content_type.is_some_and(|declared| declared != ApiContentType::None);

        let mut body = if reads_raw_body {
            Some(BodySource::Text(action.body.clone().unwrap_or_default()))
        } else {
            debug!("Skipping body of {method} request without a declared API content type");
            Some(BodySource::Text(String::new()))
        };

        if ContentCodec::from_content_type(content_type).uses_properties() {
            body = action.body_form_data.clone().map(BodySource::Properties);
        }

        self.encode(body, content_type, encode_params)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::codec::{APPLICATION_FORM_URLENCODED, APPLICATION_JSON, MULTIPART_FORM_DATA};
    use apiwire_common::Property;
    use serde_json::json;

    fn action_with_body() -> ActionConfiguration {
        ActionConfiguration::default()
            .with_body(r#"{"name": "apiwire"}"#)
            .with_body_form_data(vec![Property::new("a", "1"), Property::new("b", "two words")])
    }

    #[test]
    fn test_get_without_api_content_type_skips_body() {
        let codec = BodyCodec::default();

        let artifact = codec
            .resolve(&action_with_body(), APPLICATION_JSON, &Method::GET, false)
            .unwrap();
        assert!(artifact.is_empty_bytes());

        let artifact = codec
            .resolve(&action_with_body(), "text/plain", &Method::GET, false)
            .unwrap();
        assert!(artifact.is_empty_bytes());
    }

    #[test]
    fn test_get_with_none_api_content_type_skips_body() {
        let action = action_with_body().with_api_content_type(ApiContentType::None);

        let artifact = BodyCodec::default()
            .resolve(&action, APPLICATION_JSON, &Method::GET, false)
            .unwrap();
        assert!(artifact.is_empty_bytes());
    }

    #[test]
    fn test_get_with_declared_api_content_type_reads_body() {
        let action = action_with_body().with_api_content_type(ApiContentType::Json);

        let artifact = BodyCodec::default()
            .resolve(&action, APPLICATION_JSON, &Method::GET, false)
            .unwrap();
        assert!(matches!(artifact, BodyArtifact::Json(ref v) if *v == json!({"name": "apiwire"})));
    }

    #[test]
    fn test_get_with_stored_mime_marker_reads_body() {
        let mut action = ActionConfiguration::default().with_body(r#"{"q": 1}"#);
        action
            .form_data
            .insert("apiContentType".to_string(), json!("application/json"));

        let artifact = BodyCodec::default()
            .resolve(&action, APPLICATION_JSON, &Method::GET, false)
            .unwrap();
        assert!(matches!(artifact, BodyArtifact::Json(ref v) if *v == json!({"q": 1})));
    }

    #[test]
    fn test_non_get_reads_body() {
        for method in [Method::POST, Method::PUT, Method::PATCH, Method::DELETE] {
            let artifact = BodyCodec::default()
                .resolve(&action_with_body(), APPLICATION_JSON, &method, false)
                .unwrap();
            assert!(matches!(artifact, BodyArtifact::Json(_)), "{method} should read the body");
        }
    }

    #[test]
    fn test_missing_body_defaults_to_empty() {
        let artifact = BodyCodec::default()
            .resolve(&ActionConfiguration::default(), APPLICATION_JSON, &Method::POST, false)
            .unwrap();
        assert!(artifact.is_empty_bytes());

        let artifact = BodyCodec::default()
            .resolve(&ActionConfiguration::default(), "text/plain", &Method::POST, false)
            .unwrap();
        assert!(artifact.is_empty_bytes());
    }

    #[test]
    fn test_form_uses_property_list() {
        for method in [Method::GET, Method::POST] {
            let artifact = BodyCodec::default()
                .resolve(&action_with_body(), APPLICATION_FORM_URLENCODED, &method, true)
                .unwrap();
            assert!(matches!(artifact, BodyArtifact::Text(ref t) if t == "a=1&b=two+words"));
        }
    }

    #[test]
    fn test_form_without_property_list_is_empty() {
        let action = ActionConfiguration::default().with_body("a=1");

        let artifact = BodyCodec::default()
            .resolve(&action, APPLICATION_FORM_URLENCODED, &Method::POST, false)
            .unwrap();
        assert!(artifact.is_empty_bytes());
    }

    #[test]
    fn test_multipart_uses_property_list() {
        let artifact = BodyCodec::default()
            .resolve(&action_with_body(), MULTIPART_FORM_DATA, &Method::POST, false)
            .unwrap();

        let BodyArtifact::Multipart(multipart) = artifact else {
            unreachable!("expected a multipart body");
        };
        assert_eq!(multipart.parts().unwrap().len(), 2);
    }

    #[test]
    fn test_raw_text_body() {
        let action = ActionConfiguration::default().with_body("<xml/>");

        let artifact = BodyCodec::default()
            .resolve(&action, "application/xml", &Method::POST, false)
            .unwrap();

        let BodyArtifact::Bytes(bytes) = artifact else {
            unreachable!("expected bytes");
        };
        assert_eq!(bytes.as_ref(), b"<xml/>");
    }
}
