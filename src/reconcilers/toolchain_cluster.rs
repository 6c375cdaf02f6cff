// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! ToolchainCluster reconciler - keeps the cluster cache current on every change.

use crate::cluster::ClusterService;
use crate::constants::CLUSTER_FINALIZER;
use crate::error::{ClusterCacheError, Result};
use crate::kubernetes::Connector;
use crate::types::ToolchainCluster;
use futures::StreamExt;
use kube::{
    runtime::{
        controller::Action,
        finalizer::{finalizer, Event as Finalizer},
        Controller,
    },
    Api, Client, ResourceExt,
};
use kube_runtime::watcher::Config as WatcherConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

pub struct ToolchainClusterReconciler {
    client: Client,
    namespace: String,
    service: Arc<ClusterService>,
}

impl ToolchainClusterReconciler {
    pub fn new(client: Client, namespace: &str, service: Arc<ClusterService>) -> Self {
        Self {
            client,
            namespace: namespace.to_string(),
            service,
        }
    }

    /// Run the controller until `shutdown` is cancelled. Reconciliations in
    /// flight when the token fires are allowed to finish.
    pub async fn run(self, shutdown: CancellationToken) -> anyhow::Result<()> {
        let clusters: Api<ToolchainCluster> = Api::namespaced(self.client.clone(), &self.namespace);
        let context = Arc::new(self);

        info!("Starting ToolchainCluster controller");

        Controller::new(clusters, WatcherConfig::default())
            .graceful_shutdown_on(shutdown.cancelled_owned())
            .run(reconcile, error_policy, context)
            .for_each(|res| async move {
                match res {
                    Ok(o) => debug!("Reconciled ToolchainCluster: {:?}", o),
                    Err(e) => warn!("Reconciliation error: {:?}", e),
                }
            })
            .await;

        info!("ToolchainCluster controller stopped");
        Ok(())
    }
}

async fn reconcile(
    cluster: Arc<ToolchainCluster>,
    ctx: Arc<ToolchainClusterReconciler>,
) -> Result<Action> {
    let api: Api<ToolchainCluster> = Api::namespaced(ctx.client.clone(), &ctx.namespace);

    debug!("Reconciling ToolchainCluster: {}", cluster.name_any());

    finalizer(&api, CLUSTER_FINALIZER, cluster, |event| async {
        match event {
            Finalizer::Apply(cluster) => apply(&ctx.service, &cluster).await,
            Finalizer::Cleanup(cluster) => Ok(cleanup(&ctx.service, &cluster)),
        }
    })
    .await
    .map_err(|e| ClusterCacheError::FinalizerError(Box::new(e)))
}

/// Refresh the cache entry of a created or updated ToolchainCluster
pub async fn apply<C: Connector>(
    service: &ClusterService<C>,
    cluster: &ToolchainCluster,
) -> Result<Action> {
    service.add_or_update(cluster).await?;
    // The watcher notifies us when the cluster changes or is deleted
    Ok(Action::await_change())
}

/// Evict a deleted ToolchainCluster from the cache
pub fn cleanup<C: Connector>(service: &ClusterService<C>, cluster: &ToolchainCluster) -> Action {
    service.delete(&cluster.name_any());
    Action::await_change()
}

fn error_policy(
    _cluster: Arc<ToolchainCluster>,
    error: &ClusterCacheError,
    _ctx: Arc<ToolchainClusterReconciler>,
) -> Action {
    error!("Reconciliation error: {}", error);
    Action::requeue(Duration::from_secs(60))
}
