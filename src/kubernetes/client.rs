// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Remote cluster client creation from ToolchainCluster resources

use crate::config::Config;
use crate::constants::SECRET_TOKEN_KEY;
use crate::error::{ClusterCacheError, Result};
use crate::types::ToolchainCluster;
use k8s_openapi::api::core::v1::Secret;
use kube::{
    client::ClientBuilder,
    config::{KubeConfigOptions, Kubeconfig},
    Api, Client, ResourceExt,
};
use std::future::Future;
use std::time::Duration;
use tower::limit::RateLimitLayer;
use tracing::{debug, info, instrument};

/// Builds a remote client for a ToolchainCluster
pub trait Connector: Send + Sync {
    fn connect(&self, cluster: &ToolchainCluster) -> impl Future<Output = Result<Client>> + Send;
}

/// Rate limiting and timeout settings applied to every remote client
#[derive(Debug, Clone, Copy)]
pub struct ConnectionSettings {
    pub qps: f32,
    pub burst: u32,
    pub connect_timeout: Duration,
}

impl ConnectionSettings {
    /// Window in which `burst` requests may be issued to sustain `qps`
    pub fn rate_limit_window(&self) -> Duration {
        let qps = if self.qps > 0.0 { self.qps } else { 1.0 };
        Duration::from_secs_f64(f64::from(self.burst.max(1)) / f64::from(qps))
    }
}

impl From<&Config> for ConnectionSettings {
    fn from(config: &Config) -> Self {
        Self {
            qps: config.client_qps,
            burst: config.client_burst,
            connect_timeout: config.health_check_timeout,
        }
    }
}

/// Creates clients authenticated with the bearer token referenced by the ToolchainCluster
#[derive(Clone)]
pub struct ConnectionFactory {
    client: Client,
    settings: ConnectionSettings,
}

impl ConnectionFactory {
    pub fn new(client: Client, settings: ConnectionSettings) -> Self {
        Self { client, settings }
    }
}

impl Connector for ConnectionFactory {
    #[instrument(skip(self, cluster), fields(cluster = %cluster.name_any()))]
    async fn connect(&self, cluster: &ToolchainCluster) -> Result<Client> {
        validate_spec(cluster)?;

        let token = get_cluster_token(&self.client, cluster).await?;
        let config = build_client_config(cluster, &token, &self.settings).await?;

        let client = ClientBuilder::try_from(config)
            .map_err(|e| {
                ClusterCacheError::ConnectionError(format!(
                    "Failed to create client for cluster {}: {}",
                    cluster.name_any(),
                    e
                ))
            })?
            .with_layer(&RateLimitLayer::new(
                u64::from(self.settings.burst.max(1)),
                self.settings.rate_limit_window(),
            ))
            .build();

        debug!("Created client for {}", cluster.spec.api_endpoint);
        Ok(client)
    }
}

/// Check that the ToolchainCluster carries everything needed to connect
pub fn validate_spec(cluster: &ToolchainCluster) -> Result<()> {
    let name = cluster.name_any();

    if cluster.spec.api_endpoint.trim().is_empty() {
        return Err(ClusterCacheError::ConfigurationError(format!(
            "ToolchainCluster {} has no api endpoint",
            name
        )));
    }

    url::Url::parse(&cluster.spec.api_endpoint).map_err(|e| {
        ClusterCacheError::ConfigurationError(format!(
            "ToolchainCluster {} has an invalid api endpoint '{}': {}",
            name, cluster.spec.api_endpoint, e
        ))
    })?;

    if cluster.spec.secret_ref.name.trim().is_empty() {
        return Err(ClusterCacheError::ConfigurationError(format!(
            "ToolchainCluster {} has no secret reference",
            name
        )));
    }

    Ok(())
}

/// Read the bearer token from the secret referenced by the ToolchainCluster
#[instrument(skip(client, cluster), fields(cluster = %cluster.name_any()))]
async fn get_cluster_token(client: &Client, cluster: &ToolchainCluster) -> Result<String> {
    let cluster_name = cluster.name_any();
    let secret_name = &cluster.spec.secret_ref.name;
    let namespace = cluster.namespace().unwrap_or_else(|| client.default_namespace().to_string());
    let secrets: Api<Secret> = Api::namespaced(client.clone(), &namespace);

    info!(
        "Getting token secret '{}/{}' for cluster '{}'...",
        namespace, secret_name, cluster_name
    );

    let Some(secret) = secrets.get_opt(secret_name).await? else {
        return Err(ClusterCacheError::SecretNotFound(format!(
            "{}/{} referenced by cluster {}",
            namespace, secret_name, cluster_name
        )));
    };

    let Some(token_data) = secret.data.as_ref().and_then(|d| d.get(SECRET_TOKEN_KEY)) else {
        return Err(ClusterCacheError::SecretMalformed(format!(
            "Secret {}/{} for cluster {} does not contain '{}' key",
            namespace, secret_name, cluster_name, SECRET_TOKEN_KEY
        )));
    };

    let token = String::from_utf8(token_data.0.clone()).map_err(|e| {
        ClusterCacheError::SecretMalformed(format!(
            "Failed to decode token for cluster {}: {}",
            cluster_name, e
        ))
    })?;

    let token = token.trim();
    if token.is_empty() {
        return Err(ClusterCacheError::SecretMalformed(format!(
            "Secret {}/{} for cluster {} has an empty '{}' key",
            namespace, secret_name, cluster_name, SECRET_TOKEN_KEY
        )));
    }

    Ok(token.to_string())
}

/// Build the client configuration for the remote cluster
pub async fn build_client_config(
    cluster: &ToolchainCluster,
    token: &str,
    settings: &ConnectionSettings,
) -> Result<kube::Config> {
    let name = cluster.name_any();

    let mut remote = serde_json::json!({ "server": cluster.spec.api_endpoint });
    if let Some(ca_bundle) = cluster.spec.ca_bundle.as_deref().filter(|ca| !ca.is_empty()) {
        remote["certificate-authority-data"] = ca_bundle.into();
    }
    if cluster.tls_validation_disabled() {
        remote["insecure-skip-tls-verify"] = true.into();
    }

    let kubeconfig: Kubeconfig = serde_json::from_value(serde_json::json!({
        "apiVersion": "v1",
        "kind": "Config",
        "clusters": [{ "name": name, "cluster": remote }],
        "users": [{ "name": name, "user": { "token": token } }],
        "contexts": [{ "name": name, "context": { "cluster": name, "user": name } }],
        "current-context": name,
    }))
    .map_err(|e| ClusterCacheError::ConnectionError(format!("Failed to build kubeconfig: {}", e)))?;

    let mut config = kube::Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
        .await
        .map_err(|e| {
            ClusterCacheError::ConnectionError(format!(
                "Failed to create config for cluster {}: {}",
                name, e
            ))
        })?;
    config.connect_timeout = Some(settings.connect_timeout);

    Ok(config)
}
