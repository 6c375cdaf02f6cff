// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Periodic health checks of the cached remote clusters.
//!
//! Every cycle probes `/healthz` on each cluster and writes the outcome as
//! `Ready`/`Offline` conditions onto the ToolchainCluster status.

use crate::cluster::registry::ClusterRegistry;
use crate::cluster::run_periodically;
use crate::constants::{conditions, HEALTHZ_PATH, OPERATOR_NAME};
use crate::error::{ClusterCacheError, Result};
use crate::types::condition::{merge_conditions, Condition, ConditionStatus};
use crate::types::{ToolchainCluster, ToolchainClusterStatus};
use chrono::{DateTime, Utc};
use kube::{
    api::{ListParams, Patch, PatchParams},
    Api, Client, ResourceExt,
};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

pub struct HealthChecker {
    client: Client,
    namespace: String,
    registry: ClusterRegistry,
    timeout: Duration,
}

impl HealthChecker {
    pub fn new(client: Client, namespace: &str, registry: ClusterRegistry, timeout: Duration) -> Self {
        Self {
            client,
            namespace: namespace.to_string(),
            registry,
            timeout,
        }
    }

    /// Probe every ToolchainCluster in the namespace once and update its status
    #[instrument(skip(self), fields(namespace = %self.namespace))]
    pub async fn check_all(&self) -> Result<()> {
        let api: Api<ToolchainCluster> = Api::namespaced(self.client.clone(), &self.namespace);
        let clusters = api
            .list(&ListParams::default())
            .await
            .map_err(|e| ClusterCacheError::ListError(e.to_string()))?;

        if clusters.items.is_empty() {
            info!("No ToolchainClusters found, nothing to check");
            return Ok(());
        }

        for cluster in &clusters.items {
            if let Err(e) = self.update_cluster_status(&api, cluster).await {
                warn!("Failed to update status of cluster {}: {}", cluster.name_any(), e);
            }
        }

        Ok(())
    }

    #[instrument(skip(self, api, cluster), fields(cluster = %cluster.name_any()))]
    async fn update_cluster_status(
        &self,
        api: &Api<ToolchainCluster>,
        cluster: &ToolchainCluster,
    ) -> Result<()> {
        let name = cluster.name_any();
        let observed = self.cluster_health(&name).await;
        let status = ToolchainClusterStatus {
            conditions: merge_conditions(cluster.conditions(), observed),
        };

        let patch = serde_json::json!({ "status": status });
        let params = PatchParams {
            field_manager: Some(OPERATOR_NAME.to_string()),
            ..PatchParams::default()
        };
        api.patch_status(&name, &params, &Patch::Merge(&patch))
            .await
            .map_err(|e| ClusterCacheError::StatusWriteError(format!("{}: {}", name, e)))?;

        debug!("Updated status of cluster {}", name);
        Ok(())
    }

    /// Conditions describing the current health of the named cluster
    pub async fn cluster_health(&self, name: &str) -> Vec<Condition> {
        let now = Utc::now();

        let Some(cached) = self.registry.get(name) else {
            debug!("Cluster {} has no cached connection", name);
            return offline_conditions(now);
        };

        match probe_healthz(&cached.client, self.timeout).await {
            Ok(body) => healthz_conditions(&body, now),
            Err(e) => {
                warn!("Cluster {} is not reachable: {}", name, e);
                offline_conditions(now)
            }
        }
    }

    /// Check cluster health every `period` until `shutdown` is cancelled
    pub async fn run(&self, period: Duration, shutdown: CancellationToken) -> anyhow::Result<()> {
        info!(
            "Cluster health checks started, period {:?}, timeout {:?}",
            period, self.timeout
        );

        run_periodically(period, shutdown, || async {
            if let Err(e) = self.check_all().await {
                warn!("Cluster health check cycle failed: {}", e);
            }
        })
        .await;

        info!("Cluster health checks stopped");
        Ok(())
    }
}

/// GET `/healthz` on the remote cluster, bounded by `timeout`
pub async fn probe_healthz(client: &Client, timeout: Duration) -> Result<String> {
    let request = http::Request::get(HEALTHZ_PATH)
        .body(Vec::new())
        .map_err(|e| ClusterCacheError::ProbeError(e.to_string()))?;

    match tokio::time::timeout(timeout, client.request_text(request)).await {
        Ok(Ok(body)) => Ok(body),
        Ok(Err(e)) => Err(ClusterCacheError::ProbeError(e.to_string())),
        Err(_) => Err(ClusterCacheError::ProbeError(format!(
            "no response within {:?}",
            timeout
        ))),
    }
}

/// Conditions for a cluster that answered its health probe with `body`
pub fn healthz_conditions(body: &str, now: DateTime<Utc>) -> Vec<Condition> {
    if body.eq_ignore_ascii_case("ok") {
        vec![Condition::new(
            conditions::READY,
            ConditionStatus::True,
            conditions::CLUSTER_READY_REASON,
            conditions::HEALTHZ_OK_MSG,
            now,
        )]
    } else {
        vec![
            Condition::new(
                conditions::READY,
                ConditionStatus::False,
                conditions::CLUSTER_NOT_READY_REASON,
                conditions::HEALTHZ_NOT_OK_MSG,
                now,
            ),
            Condition::new(
                conditions::OFFLINE,
                ConditionStatus::False,
                conditions::CLUSTER_REACHABLE_REASON,
                conditions::CLUSTER_REACHABLE_MSG,
                now,
            ),
        ]
    }
}

/// Conditions for a cluster that could not be probed
pub fn offline_conditions(now: DateTime<Utc>) -> Vec<Condition> {
    vec![Condition::new(
        conditions::OFFLINE,
        ConditionStatus::True,
        conditions::CLUSTER_NOT_REACHABLE_REASON,
        conditions::CLUSTER_NOT_REACHABLE_MSG,
        now,
    )]
}
