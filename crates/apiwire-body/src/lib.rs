//! # apiwire-body
//!
//! Builds outbound request bodies for stored REST actions.
//!
//! A caller hands over an [`ActionConfiguration`](apiwire_common::ActionConfiguration),
//! the negotiated content type and the HTTP method; [`BodyCodec::resolve`]
//! picks the body source and dispatches to one of the encoders:
//!
//! - [`json::JsonNormalizer`] for `application/json`
//! - [`form::FormEncoder`] for `application/x-www-form-urlencoded`
//! - [`multipart::MultipartAssembler`] for `multipart/form-data`
//! - Latin-1 text for anything else
//!
//! The result is a [`BodyArtifact`] that is attached to a reqwest request.
//!
//! ## Example
//!
//! ```no_run
//! use apiwire_body::BodyCodec;
//! use apiwire_common::{ActionConfiguration, Property};
//! use reqwest::Method;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let codec = BodyCodec::default();
//!
//! let action = ActionConfiguration::default().with_body_form_data(vec![
//!     Property::new("title", "report").with_type("TEXT"),
//!     Property::new("file", r#"{"name":"a.txt","type":"text/plain","data":"hi"}"#)
//!         .with_type("FILE"),
//! ]);
//!
//! let artifact = codec.resolve(&action, "multipart/form-data", &Method::POST, false)?;
//!
//! let client = reqwest::Client::new();
//! let request = artifact.attach(client.post("https://example.com/upload"))?;
//! request.send().await?;
//! # Ok(())
//! # }
//! ```

pub mod artifact;
pub mod codec;
pub mod error;
pub mod form;
pub mod json;
pub mod multipart;
mod resolve;

pub use artifact::{BodyArtifact, BodySource};
pub use codec::{BodyCodec, CodecConfig, ContentCodec};
pub use error::BodyError;
pub use multipart::{FormPart, MultipartBody, PartBody};
