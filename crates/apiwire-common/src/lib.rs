//! # apiwire-common
//!
//! Common types shared by the request body pipeline and its callers.
//!
//! - [`Property`]: one key/value/type record of a structured body
//! - [`MultipartFormDataType`]: how a property is laid out in a multipart body
//! - [`ActionConfiguration`]: the body-bearing part of a stored REST action
//! - [`ApiContentType`]: the content type declared in the action editor
//!
//! ## Example
//!
//! ```
//! use apiwire_common::{ActionConfiguration, MultipartFormDataType, Property};
//!
//! let upload = Property::new("file", r#"{"name":"a.txt","type":"text/plain","data":"hi"}"#)
//!     .with_type("file");
//!
//! assert_eq!(
//!     upload.multipart_type()?,
//!     Some(MultipartFormDataType::File)
//! );
//!
//! let action = ActionConfiguration::default().with_body_form_data(vec![upload]);
//! assert!(action.body.is_none());
//! # Ok::<(), anyhow::Error>(())
//! ```

/// Stored action configuration and API content type marker.
pub mod action;
/// Body field records and multipart tags.
pub mod property;

pub use action::{ActionConfiguration, ApiContentType, FIELD_API_CONTENT_TYPE};
pub use property::{MultipartFormDataType, Property};
