//! # apiwire
//!
//! Outbound request preparation for stored REST API actions.
//!
//! This crate re-exports the building blocks:
//!
//! - [`apiwire_common`]: the property model and action configuration
//! - [`apiwire_body`]: content codecs that turn an action into a request body
//! - [`apiwire_acl`]: policy-backed access decisions
//!
//! ## Quick Start
//!
//! ```rust
//! use apiwire::{ActionConfiguration, BodyArtifact, BodyCodec, Property};
//! use reqwest::Method;
//!
//! let action = ActionConfiguration::default()
//!     .with_body_form_data(vec![Property::new("q", "rust lang"), Property::new("page", "2")]);
//!
//! let codec = BodyCodec::default();
//! let artifact = codec.resolve(&action, "application/x-www-form-urlencoded", &Method::GET, true)?;
//!
//! assert!(matches!(artifact, BodyArtifact::Text(ref form) if form == "q=rust+lang&page=2"));
//! # Ok::<(), apiwire::PluginError>(())
//! ```

pub mod error;

pub use apiwire_acl::*;
pub use apiwire_body::*;
pub use apiwire_common::*;

pub use error::{PluginError, Result};
