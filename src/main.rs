// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use kube::Client;
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use toolchain_common::cluster::{ClusterRegistry, ClusterService, HealthChecker};
use toolchain_common::config::Config;
use toolchain_common::kubernetes::{ConnectionFactory, ConnectionSettings};
use toolchain_common::reconcilers::ToolchainClusterReconciler;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting ToolchainCluster cache");

    let config = Config::from_env()?;
    info!(
        "Configuration loaded: watch_namespace={}, refresh_period={:?}, health_check_period={:?}",
        config.watch_namespace, config.refresh_period, config.health_check_period
    );

    let client = Client::try_default().await?;
    info!("Connected to Kubernetes cluster");

    let registry = ClusterRegistry::new();
    let factory = ConnectionFactory::new(client.clone(), ConnectionSettings::from(&config));
    let service = Arc::new(ClusterService::new(
        client.clone(),
        &config.watch_namespace,
        registry.clone(),
        factory,
    ));
    let health = HealthChecker::new(
        client.clone(),
        &config.watch_namespace,
        registry,
        config.health_check_timeout,
    );
    let reconciler =
        ToolchainClusterReconciler::new(client, &config.watch_namespace, service.clone());

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutdown signal received, finishing in-flight work");
        signal.cancel();
    });

    tokio::try_join!(
        service.run(config.refresh_period, shutdown.clone()),
        health.run(config.health_check_period, shutdown.clone()),
        reconciler.run(shutdown.clone())
    )?;

    info!("ToolchainCluster cache stopped");
    Ok(())
}

/// Wait for SIGTERM or SIGINT
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
