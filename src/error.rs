// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClusterCacheError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Invalid cluster configuration: {0}")]
    ConfigurationError(String),

    #[error("Secret not found: {0}")]
    SecretNotFound(String),

    #[error("Malformed secret: {0}")]
    SecretMalformed(String),

    #[error("Failed to create cluster connection: {0}")]
    ConnectionError(String),

    #[error("Health probe failed: {0}")]
    ProbeError(String),

    #[error("Failed to list ToolchainClusters: {0}")]
    ListError(String),

    #[error("Failed to update ToolchainCluster status: {0}")]
    StatusWriteError(String),

    #[error("Finalizer error: {0}")]
    FinalizerError(#[source] Box<kube::runtime::finalizer::Error<ClusterCacheError>>),
}

pub type Result<T> = std::result::Result<T, ClusterCacheError>;
