// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! In-memory registry of remote cluster connections.

use crate::types::{ClusterRole, ToolchainClusterStatus};
use kube::Client;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A connection to a remote cluster together with what is known about it
#[derive(Clone)]
pub struct CachedCluster {
    pub name: String,
    pub api_endpoint: String,
    /// Authenticated client for the remote cluster
    pub client: Client,
    pub role: ClusterRole,
    /// Namespace in the remote cluster where the peer operator runs
    pub operator_namespace: String,
    /// Name by which the local cluster is known to the remote cluster
    pub owner_cluster_name: String,
    pub status: ToolchainClusterStatus,
}

impl fmt::Debug for CachedCluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedCluster")
            .field("name", &self.name)
            .field("api_endpoint", &self.api_endpoint)
            .field("role", &self.role)
            .field("operator_namespace", &self.operator_namespace)
            .field("owner_cluster_name", &self.owner_cluster_name)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Process-wide cache of remote clusters keyed by name.
///
/// Cloning the registry yields another handle to the same entries. Readers
/// always receive copies, so the only way to change an entry is through
/// [`ClusterRegistry::add`] or [`ClusterRegistry::delete`].
#[derive(Clone, Default)]
pub struct ClusterRegistry {
    clusters: Arc<RwLock<HashMap<String, CachedCluster>>>,
}

impl ClusterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // The map stays consistent even if a writer panicked: every write is a
    // single insert or remove.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, CachedCluster>> {
        self.clusters.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, CachedCluster>> {
        self.clusters.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert the cluster, replacing any entry with the same name
    pub fn add(&self, cluster: CachedCluster) {
        self.write().insert(cluster.name.clone(), cluster);
    }

    /// Remove the cluster if present
    pub fn delete(&self, name: &str) {
        self.write().remove(name);
    }

    pub fn get(&self, name: &str) -> Option<CachedCluster> {
        self.read().get(name).cloned()
    }

    /// All clusters with the given role, sorted by name
    pub fn get_by_role(&self, role: ClusterRole) -> Vec<CachedCluster> {
        let mut clusters: Vec<CachedCluster> = self
            .read()
            .values()
            .filter(|c| c.role == role)
            .cloned()
            .collect();
        clusters.sort_by(|a, b| a.name.cmp(&b.name));
        clusters
    }

    /// The host cluster. When several are registered the one with the
    /// lexicographically smallest name wins.
    pub fn get_host(&self) -> Option<CachedCluster> {
        self.read()
            .values()
            .filter(|c| c.role == ClusterRole::Host)
            .min_by(|a, b| a.name.cmp(&b.name))
            .cloned()
    }

    /// Names of all registered clusters
    pub fn names(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}
