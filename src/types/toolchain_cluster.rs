// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{labels, namespaces, DISABLE_ALL_TLS_VALIDATIONS};
use crate::error::{ClusterCacheError, Result};
use crate::types::condition::Condition;
use kube::{CustomResource, ResourceExt};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Describes how to connect to a remote cluster
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(
    group = "toolchain.dev.openshift.com",
    version = "v1alpha1",
    kind = "ToolchainCluster"
)]
#[kube(namespaced)]
#[kube(status = "ToolchainClusterStatus")]
#[serde(rename_all = "camelCase")]
pub struct ToolchainClusterSpec {
    /// URL of the remote cluster's API server
    pub api_endpoint: String,
    /// Base64 encoded PEM bundle used to verify the API server certificate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_bundle: Option<String>,
    /// Secret in the same namespace holding the bearer token
    pub secret_ref: LocalSecretReference,
    #[serde(
        default,
        rename = "disabledTLSValidations",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub disabled_tls_validations: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
pub struct LocalSecretReference {
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ToolchainClusterStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

/// Logical position of a remote cluster relative to the local operator
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClusterRole {
    Host,
    Member,
}

impl ClusterRole {
    /// Operator namespace used when the ToolchainCluster has no namespace label
    pub fn default_operator_namespace(&self) -> &'static str {
        match self {
            ClusterRole::Host => namespaces::DEFAULT_HOST_OPERATOR,
            ClusterRole::Member => namespaces::DEFAULT_MEMBER_OPERATOR,
        }
    }
}

impl fmt::Display for ClusterRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClusterRole::Host => write!(f, "host"),
            ClusterRole::Member => write!(f, "member"),
        }
    }
}

impl ToolchainCluster {
    fn label(&self, key: &str) -> Option<&str> {
        self.labels()
            .get(key)
            .map(|v| v.as_str())
            .filter(|v| !v.is_empty())
    }

    /// Role from the `type` label, member when absent
    pub fn role(&self) -> Result<ClusterRole> {
        match self.label(labels::TYPE) {
            None | Some("member") => Ok(ClusterRole::Member),
            Some("host") => Ok(ClusterRole::Host),
            Some(other) => Err(ClusterCacheError::ConfigurationError(format!(
                "ToolchainCluster {} has an unknown cluster type '{}'",
                self.name_any(),
                other
            ))),
        }
    }

    /// Namespace of the peer operator, falling back to the role default
    pub fn operator_namespace(&self, role: ClusterRole) -> String {
        self.label(labels::NAMESPACE)
            .unwrap_or_else(|| role.default_operator_namespace())
            .to_string()
    }

    /// Name by which the local cluster is known to the remote cluster
    pub fn owner_cluster_name(&self) -> String {
        self.label(labels::OWNER_CLUSTER_NAME)
            .unwrap_or_default()
            .to_string()
    }

    pub fn conditions(&self) -> &[Condition] {
        self.status
            .as_ref()
            .map(|s| s.conditions.as_slice())
            .unwrap_or_default()
    }

    pub fn tls_validation_disabled(&self) -> bool {
        self.spec
            .disabled_tls_validations
            .iter()
            .any(|v| v == DISABLE_ALL_TLS_VALIDATIONS)
    }
}
