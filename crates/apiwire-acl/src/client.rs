//! Decision service client.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use futures::{StreamExt, TryStreamExt, stream};
use log::{debug, warn};
use reqwest::Method;

use crate::config::AclConfig;
use crate::decision::{DecisionRequest, DecisionResponse, Verdict};
use crate::error::{AuthorizationError, Result};
use crate::store::{Principal, PrincipalStore};

/// Evaluates access decisions for the current principal.
///
/// Cloning is cheap; the HTTP connection pool and the store are shared.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use apiwire_acl::{AclClient, AclConfig, PrincipalStore};
/// use reqwest::Method;
///
/// # async fn example(store: Arc<dyn PrincipalStore>) -> apiwire_acl::Result<()> {
/// let config = AclConfig::new("http://localhost:8181", "/v1/data/apiwire/authz");
/// let client = AclClient::new(config, store)?;
///
/// if client.evaluate(&Method::GET, "/api/v1/pages").await?.is_allowed() {
///     // serve the request
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AclClient {
    client: reqwest::Client,
    store: Arc<dyn PrincipalStore>,
    decision_url: String,
    max_concurrent_group_lookups: usize,
}

impl std::fmt::Debug for AclClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AclClient")
            .field("decision_url", &self.decision_url)
            .field(
                "max_concurrent_group_lookups",
                &self.max_concurrent_group_lookups,
            )
            .finish_non_exhaustive()
    }
}

impl AclClient {
    /// Creates a client from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: AclConfig, store: Arc<dyn PrincipalStore>) -> Result<Self> {
        config.validate()?;

        let client = match config.timeout_seconds {
            Some(timeout) => reqwest::Client::builder()
                .timeout(Duration::from_secs(timeout))
                .build()?,
            None => reqwest::Client::builder().build()?,
        };

        Ok(Self {
            client,
            store,
            decision_url: config.decision_url(),
            max_concurrent_group_lookups: config.max_concurrent_group_lookups,
        })
    }

    /// URL decision requests are POSTed to.
    #[must_use]
    pub fn decision_url(&self) -> &str {
        &self.decision_url
    }

    /// Decides whether the current principal may perform `method` on
    /// `resource`.
    ///
    /// The decision service is not called when any principal or group lookup
    /// fails.
    ///
    /// # Errors
    ///
    /// Returns an error if a lookup fails, the decision service cannot be
    /// reached or answers with a failure status, or the answer is malformed.
    pub async fn evaluate(&self, method: &Method, resource: &str) -> Result<Verdict> {
        let permissions = self.permissions().await?;
        let request = DecisionRequest::new(permissions, method, resource);
        debug!(
            "Submitting decision request to {}: {request:?}",
            self.decision_url
        );

        let response = self
            .client
            .post(&self.decision_url)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(
                "Decision request failed with status {}: {message}",
                status.as_u16()
            );
            return Err(AuthorizationError::Service {
                status: status.as_u16(),
                message,
            });
        }

        let response_text = response.text().await?;
        let decision: DecisionResponse = serde_json::from_str(&response_text).map_err(|e| {
            AuthorizationError::InvalidResponse(format!("{e}: {response_text}"))
        })?;

        let verdict = decision.into_verdict()?;
        debug!(
            "Decision for {method} {resource}: allowed={}",
            verdict.is_allowed()
        );
        Ok(verdict)
    }

    /// Collects the permissions of the current principal and all of its
    /// groups.
    ///
    /// # Errors
    ///
    /// Returns an error if the principal or any group cannot be loaded.
    pub async fn permissions(&self) -> Result<BTreeSet<String>> {
        let Principal {
            id,
            permissions,
            group_ids,
        } = self
            .store
            .current_principal()
            .await
            .map_err(|e| AuthorizationError::PrincipalLookup(format!("{e:#}")))?;

        debug!(
            "Resolving {} group(s) for principal '{id}'",
            group_ids.len()
        );

        let store = &self.store;
        stream::iter(group_ids)
            .map(|group_id| async move {
                let group = store.group_by_id(&group_id).await;
                match group {
                    Ok(group) => Ok(group.permissions),
                    Err(e) => Err(AuthorizationError::GroupLookup {
                        group_id,
                        message: format!("{e:#}"),
                    }),
                }
            })
            .buffer_unordered(self.max_concurrent_group_lookups)
            .try_fold(permissions, |mut acc, group_permissions| async move {
                acc.extend(group_permissions);
                Ok(acc)
            })
            .await
    }
}
