// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Labels read from ToolchainCluster resources
pub mod labels {
    /// Role of the remote cluster: "host" or "member"
    pub const TYPE: &str = "type";
    /// Namespace of the peer operator in the remote cluster (optional)
    pub const NAMESPACE: &str = "namespace";
    /// Name by which the local cluster is known to the remote cluster
    pub const OWNER_CLUSTER_NAME: &str = "ownerClusterName";
}

/// Operator namespaces used when the namespace label is absent
pub mod namespaces {
    pub const DEFAULT_HOST_OPERATOR: &str = "toolchain-host-operator";
    pub const DEFAULT_MEMBER_OPERATOR: &str = "toolchain-member-operator";
}

/// Key of the bearer token in the secret referenced by a ToolchainCluster
pub const SECRET_TOKEN_KEY: &str = "token";

/// Path probed on every remote cluster
pub const HEALTHZ_PATH: &str = "/healthz";

/// Value of `spec.disabledTLSValidations` that turns off all verification
pub const DISABLE_ALL_TLS_VALIDATIONS: &str = "*";

/// Field manager of the status writes
pub const OPERATOR_NAME: &str = "toolchain-cluster-cache";

/// Finalizer placed on ToolchainClusters so deletions evict the cache entry
pub const CLUSTER_FINALIZER: &str = "toolchain.dev.openshift.com/cluster-cache";

/// Condition types, reasons and messages written by the health checker
pub mod conditions {
    pub const READY: &str = "Ready";
    pub const OFFLINE: &str = "Offline";

    pub const CLUSTER_READY_REASON: &str = "ClusterReady";
    pub const CLUSTER_NOT_READY_REASON: &str = "ClusterNotReady";
    pub const CLUSTER_NOT_REACHABLE_REASON: &str = "ClusterNotReachable";
    pub const CLUSTER_REACHABLE_REASON: &str = "ClusterReachable";

    pub const HEALTHZ_OK_MSG: &str = "/healthz responded with ok";
    pub const HEALTHZ_NOT_OK_MSG: &str = "/healthz responded without ok";
    pub const CLUSTER_NOT_REACHABLE_MSG: &str = "cluster is not reachable";
    pub const CLUSTER_REACHABLE_MSG: &str = "cluster is reachable";
}

/// Reasons and messages of the aggregated connection condition
pub mod connection {
    pub const READY_REASON: &str = "ToolchainClusterReady";
    pub const NOT_FOUND_REASON: &str = "ToolchainClusterNotFound";
    pub const NOT_READY_REASON: &str = "ToolchainClusterNotReady";
    pub const LAST_PROBE_TIME_EXCEEDED_REASON: &str = "ToolchainClusterLastProbeTimeExceeded";

    pub const NOT_FOUND_MSG: &str = "the cluster connection was not found";
    pub const NOT_READY_MSG: &str = "the cluster connection is not ready";
}

/// Defaults for the periodic loops and remote client settings
pub mod defaults {
    pub const REFRESH_PERIOD_SECS: u64 = 30;
    pub const HEALTH_CHECK_PERIOD_SECS: u64 = 10;
    pub const HEALTH_CHECK_TIMEOUT_SECS: u64 = 3;
    pub const PROBE_THRESHOLD: u32 = 3;
    pub const CLIENT_QPS: f32 = 40.0;
    pub const CLIENT_BURST: u32 = 50;
}
