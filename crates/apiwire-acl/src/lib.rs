//! # apiwire-acl
//!
//! Access decisions backed by a remote policy service.
//!
//! [`AclClient::evaluate`] resolves the current [`Principal`] through a
//! [`PrincipalStore`], loads every group the principal belongs to, unions the
//! permissions and POSTs a [`DecisionRequest`] to the policy package URL. The
//! answer is turned into a [`Verdict`].
//!
//! Group lookups run concurrently up to
//! [`AclConfig::max_concurrent_group_lookups`]. Any failing lookup fails the
//! whole decision before the policy service is contacted.

pub mod client;
pub mod config;
pub mod decision;
pub mod error;
pub mod store;

pub use client::AclClient;
pub use config::AclConfig;
pub use decision::{DecisionRequest, DecisionResponse, Verdict};
pub use error::{AuthorizationError, Result};
pub use store::{Group, Principal, PrincipalStore};
