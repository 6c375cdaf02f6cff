// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Keeps the cluster registry in line with the ToolchainCluster resources.

use crate::cluster::registry::{CachedCluster, ClusterRegistry};
use crate::cluster::run_periodically;
use crate::error::{ClusterCacheError, Result};
use crate::kubernetes::{ConnectionFactory, Connector};
use crate::types::ToolchainCluster;
use kube::{api::ListParams, Api, Client, ResourceExt};
use std::collections::HashSet;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// Adds, updates and removes registry entries for ToolchainClusters
pub struct ClusterService<C = ConnectionFactory> {
    client: Client,
    namespace: String,
    registry: ClusterRegistry,
    connector: C,
}

impl<C: Connector> ClusterService<C> {
    pub fn new(client: Client, namespace: &str, registry: ClusterRegistry, connector: C) -> Self {
        Self {
            client,
            namespace: namespace.to_string(),
            registry,
            connector,
        }
    }

    pub fn registry(&self) -> &ClusterRegistry {
        &self.registry
    }

    /// Connect to the cluster and store the connection in the registry.
    /// On failure the registry is left untouched.
    #[instrument(skip(self, cluster), fields(cluster = %cluster.name_any()))]
    pub async fn add_or_update(&self, cluster: &ToolchainCluster) -> Result<()> {
        let name = cluster.name_any();

        let cached = match self.build_cached_cluster(cluster).await {
            Ok(cached) => cached,
            Err(e) => {
                error!("Failed to connect to cluster {}: {}", name, e);
                return Err(e);
            }
        };

        let unchanged = self.registry.get(&name).is_some_and(|previous| {
            previous.api_endpoint == cached.api_endpoint
                && previous.role == cached.role
                && previous.operator_namespace == cached.operator_namespace
        });
        if unchanged {
            debug!("Refreshed connection to cluster {}", name);
        } else {
            info!(
                "Caching {} cluster {} ({}), operator namespace {}",
                cached.role, name, cached.api_endpoint, cached.operator_namespace
            );
        }
        self.registry.add(cached);
        Ok(())
    }

    async fn build_cached_cluster(&self, cluster: &ToolchainCluster) -> Result<CachedCluster> {
        let role = cluster.role()?;
        let client = self.connector.connect(cluster).await?;

        Ok(CachedCluster {
            name: cluster.name_any(),
            api_endpoint: cluster.spec.api_endpoint.clone(),
            client,
            role,
            operator_namespace: cluster.operator_namespace(role),
            owner_cluster_name: cluster.owner_cluster_name(),
            status: cluster.status.clone().unwrap_or_default(),
        })
    }

    /// Remove the cluster from the registry
    pub fn delete(&self, name: &str) {
        info!("Removing cluster {} from the cache", name);
        self.registry.delete(name);
    }

    /// Rebuild every registry entry from the ToolchainClusters in the namespace
    /// and drop entries whose ToolchainCluster no longer exists.
    ///
    /// Only entries cached before the list was taken are candidates for
    /// eviction. Entries added concurrently are left alone.
    #[instrument(skip(self), fields(namespace = %self.namespace))]
    pub async fn refresh_all(&self) -> Result<()> {
        let cached_before: HashSet<String> = self.registry.names().into_iter().collect();

        let clusters: Api<ToolchainCluster> = Api::namespaced(self.client.clone(), &self.namespace);
        let list = clusters
            .list(&ListParams::default())
            .await
            .map_err(|e| ClusterCacheError::ListError(e.to_string()))?;

        debug!("Refreshing cache from {} ToolchainClusters", list.items.len());

        let mut present = HashSet::with_capacity(list.items.len());
        for cluster in &list.items {
            present.insert(cluster.name_any());
            // Errors are logged by add_or_update; keep going with the rest
            let _ = self.add_or_update(cluster).await;
        }

        for name in cached_before {
            if !present.contains(&name) {
                info!("ToolchainCluster {} no longer exists", name);
                self.delete(&name);
            }
        }

        Ok(())
    }

    /// Refresh the cache every `period` until `shutdown` is cancelled
    pub async fn run(&self, period: Duration, shutdown: CancellationToken) -> anyhow::Result<()> {
        info!("Cluster cache refresh started, period {:?}", period);

        run_periodically(period, shutdown, || async {
            if let Err(e) = self.refresh_all().await {
                warn!("Cluster cache refresh failed: {}", e);
            }
        })
        .await;

        info!("Cluster cache refresh stopped");
        Ok(())
    }
}
