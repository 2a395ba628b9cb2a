//! Principal and group lookup.

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The user an access decision is made for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    /// Principal identifier.
    pub id: String,
    /// Directly assigned permissions.
    #[serde(default)]
    pub permissions: BTreeSet<String>,
    /// Groups the principal belongs to.
    #[serde(default)]
    pub group_ids: BTreeSet<String>,
}

impl Principal {
    /// Creates a principal with no permissions or groups.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Adds directly assigned permissions.
    #[must_use]
    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions.extend(permissions.into_iter().map(Into::into));
        self
    }

    /// Adds group memberships.
    #[must_use]
    pub fn with_groups<I, S>(mut self, group_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_ids.extend(group_ids.into_iter().map(Into::into));
        self
    }
}

/// A permission group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Group identifier.
    pub id: String,
    /// Permissions granted to every member.
    #[serde(default)]
    pub permissions: BTreeSet<String>,
}

impl Group {
    /// Creates a group granting `permissions`.
    pub fn new<I, S>(id: impl Into<String>, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            permissions: permissions.into_iter().map(Into::into).collect(),
        }
    }
}

/// Source of principals and groups.
///
/// Implementations resolve the principal of the current request context and
/// look up groups by id. Lookups for different groups may run concurrently.
#[async_trait]
pub trait PrincipalStore: Send + Sync {
    /// Returns the principal the current request runs as.
    async fn current_principal(&self) -> anyhow::Result<Principal>;

    /// Returns the group with the given id.
    async fn group_by_id(&self, group_id: &str) -> anyhow::Result<Group>;
}
