// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities for mocking Kubernetes API responses.

use crate::cluster::CachedCluster;
use crate::error::{ClusterCacheError, Result as CacheResult};
use crate::kubernetes::Connector;
use crate::types::{
    ClusterRole, LocalSecretReference, ToolchainCluster, ToolchainClusterSpec,
    ToolchainClusterStatus,
};
use http::{Request, Response};
use http_body_util::BodyExt;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::ByteString;
use kube::api::ObjectMeta;
use kube::client::Body;
use kube::{Client, ResourceExt};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;
use tower::Service;

/// Namespace holding the ToolchainClusters in tests
pub const TEST_NAMESPACE: &str = "toolchain-host-operator";

/// Collection path of the ToolchainClusters in [`TEST_NAMESPACE`]
pub const CLUSTERS_PATH: &str =
    "/apis/toolchain.dev.openshift.com/v1alpha1/namespaces/toolchain-host-operator/toolchainclusters";

/// A request received by a [`MockService`]
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub body: Vec<u8>,
}

/// A mock HTTP service that returns predefined responses based on request paths
/// and records every request it receives.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a response for GET requests matching the path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, status, body)
    }

    /// Add a response for PATCH requests matching the path
    pub fn on_patch(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PATCH", path, status, body)
    }

    fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert((method.to_string(), path.to_string()), (status, body.to_string()));
        self
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        let responses = self.responses.lock().unwrap();

        // Try exact match first
        if let Some(resp) = responses.get(&(method.to_string(), path.to_string())) {
            return Some(resp.clone());
        }

        // Try prefix match for paths like .../toolchainclusters/east/status
        for ((m, p), resp) in responses.iter() {
            if m == method && path.starts_with(p) {
                return Some(resp.clone());
            }
        }

        None
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();
        let query = req.uri().query().map(str::to_string);

        let response = self.find_response(&method, &path);
        let requests = self.requests.clone();

        Box::pin(async move {
            let body = req.into_body().collect().await?.to_bytes().to_vec();
            requests.lock().unwrap().push(RecordedRequest {
                method,
                path,
                query,
                body,
            });

            let (status, body) = response.unwrap_or_else(|| {
                // Default 404 for unmatched requests
                (404, not_found_json("resource", "unknown"))
            });
            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": format!("{} \"{}\" not found", resource, name),
        "reason": "NotFound",
        "code": 404
    })
    .to_string()
}

/// A ToolchainCluster in [`TEST_NAMESPACE`] with the given labels
pub fn toolchain_cluster(name: &str, labels: &[(&str, &str)]) -> ToolchainCluster {
    ToolchainCluster {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(TEST_NAMESPACE.to_string()),
            labels: Some(
                labels
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ),
            ..Default::default()
        },
        spec: ToolchainClusterSpec {
            api_endpoint: format!("https://api.{}.example.com:6443", name),
            secret_ref: LocalSecretReference {
                name: format!("{}-secret", name),
            },
            ..Default::default()
        },
        status: None,
    }
}

pub fn toolchain_cluster_json(cluster: &ToolchainCluster) -> String {
    serde_json::to_string(cluster).unwrap()
}

pub fn toolchain_cluster_list_json(clusters: &[ToolchainCluster]) -> String {
    serde_json::json!({
        "apiVersion": "toolchain.dev.openshift.com/v1alpha1",
        "kind": "ToolchainClusterList",
        "metadata": { "resourceVersion": "1" },
        "items": clusters,
    })
    .to_string()
}

/// A secret JSON response with the given data entries
pub fn secret_json(name: &str, namespace: &str, data: &[(&str, &str)]) -> String {
    let secret = Secret {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        data: Some(
            data.iter()
                .map(|(k, v)| (k.to_string(), ByteString(v.as_bytes().to_vec())))
                .collect::<BTreeMap<_, _>>(),
        ),
        type_: Some("Opaque".to_string()),
        ..Default::default()
    };
    serde_json::to_string(&secret).unwrap()
}

/// A cache entry whose client talks to `remote`
pub fn cached_cluster(name: &str, role: ClusterRole, remote: MockService) -> CachedCluster {
    CachedCluster {
        name: name.to_string(),
        api_endpoint: format!("https://api.{}.example.com:6443", name),
        client: remote.into_client(),
        role,
        operator_namespace: role.default_operator_namespace().to_string(),
        owner_cluster_name: String::new(),
        status: ToolchainClusterStatus::default(),
    }
}

/// Hands out mock clients, failing for the configured cluster names
#[derive(Default)]
pub struct StubConnector {
    failing: HashSet<String>,
    slow: HashSet<String>,
    delay: Duration,
}

impl StubConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(names: &[&str]) -> Self {
        Self {
            failing: names.iter().map(|n| n.to_string()).collect(),
            ..Self::default()
        }
    }

    /// Connections to `names` take `delay` to complete
    pub fn slow(names: &[&str], delay: Duration) -> Self {
        Self {
            slow: names.iter().map(|n| n.to_string()).collect(),
            delay,
            ..Self::default()
        }
    }
}

impl Connector for StubConnector {
    async fn connect(&self, cluster: &ToolchainCluster) -> CacheResult<Client> {
        if self.slow.contains(&cluster.name_any()) {
            tokio::time::sleep(self.delay).await;
        }
        if self.failing.contains(&cluster.name_any()) {
            return Err(ClusterCacheError::ConnectionError(format!(
                "refusing to connect to {}",
                cluster.name_any()
            )));
        }
        Ok(MockService::new().into_client())
    }
}
