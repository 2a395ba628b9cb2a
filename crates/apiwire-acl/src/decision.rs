//! Decision service wire types.

use std::collections::BTreeSet;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AuthorizationError, Result};

/// Body POSTed to the decision service.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeSet;
/// use apiwire_acl::DecisionRequest;
/// use reqwest::Method;
///
/// let permissions = BTreeSet::from(["read".to_string()]);
/// let request = DecisionRequest::new(permissions, &Method::GET, "/api/v1/pages");
///
/// assert_eq!(
///     serde_json::to_value(&request)?,
///     serde_json::json!({
///         "input": {
///             "user": {"permissions": ["read"]},
///             "method": "GET",
///             "resource": "/api/v1/pages"
///         }
///     })
/// );
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecisionRequest {
    /// Policy input document.
    pub input: DecisionInput,
}

/// Policy input: who is asking and what for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecisionInput {
    /// The requesting principal.
    pub user: DecisionUser,
    /// HTTP method name, e.g. `GET`.
    pub method: String,
    /// Resource path being accessed.
    pub resource: String,
}

/// The principal as seen by the policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecisionUser {
    /// Union of direct and group permissions, sorted.
    pub permissions: BTreeSet<String>,
}

impl DecisionRequest {
    /// Builds the request for one access check.
    pub fn new(permissions: BTreeSet<String>, method: &Method, resource: impl Into<String>) -> Self {
        Self {
            input: DecisionInput {
                user: DecisionUser { permissions },
                method: method.as_str().to_string(),
                resource: resource.into(),
            },
        }
    }
}

/// Body returned by the decision service.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DecisionResponse {
    /// Absent when the policy is undefined for the input.
    #[serde(default)]
    pub result: Option<Value>,
    /// Identifier assigned by the decision service, if any.
    #[serde(default)]
    pub decision_id: Option<String>,
}

impl DecisionResponse {
    /// Interprets the decision.
    ///
    /// `result` may be a boolean, or an object carrying a boolean `allow`
    /// whose remaining fields are kept as the verdict payload. A missing
    /// `result` denies.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorizationError::InvalidResponse`] for any other shape.
    pub fn into_verdict(self) -> Result<Verdict> {
        match self.result {
            None | Some(Value::Null) => Ok(Verdict::deny()),
            Some(Value::Bool(allowed)) => Ok(Verdict {
                allowed,
                payload: None,
            }),
            Some(Value::Object(object)) => {
                let Some(allowed) = object.get("allow").and_then(Value::as_bool) else {
                    return Err(AuthorizationError::InvalidResponse(
                        "Decision object has no boolean 'allow' field".to_string(),
                    ));
                };
                Ok(Verdict {
                    allowed,
                    payload: Some(Value::Object(object)),
                })
            }
            Some(other) => Err(AuthorizationError::InvalidResponse(format!(
                "Unexpected decision result: {other}"
            ))),
        }
    }
}

/// Allow/deny outcome of an access check.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    allowed: bool,
    payload: Option<Value>,
}

impl Verdict {
    /// A denying verdict without payload.
    #[must_use]
    pub const fn deny() -> Self {
        Self {
            allowed: false,
            payload: None,
        }
    }

    /// Check if access is granted.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        self.allowed
    }

    /// Explanatory payload returned with an object-shaped decision.
    #[must_use]
    pub const fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }
}
