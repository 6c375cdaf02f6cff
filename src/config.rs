// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::defaults;
use anyhow::{bail, Context, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Operator configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Namespace holding the ToolchainCluster resources
    pub watch_namespace: String,
    /// Interval between two full cache refreshes
    pub refresh_period: Duration,
    /// Interval between two health check cycles
    pub health_check_period: Duration,
    /// Timeout of a single `/healthz` probe
    pub health_check_timeout: Duration,
    /// Missed probes tolerated before a Ready condition is considered stale
    pub probe_threshold: u32,
    pub client_qps: f32,
    pub client_burst: u32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let watch_namespace = env::var("WATCH_NAMESPACE")
            .context("WATCH_NAMESPACE environment variable not set")?;

        Ok(Config {
            watch_namespace,
            refresh_period: env_secs("CLUSTER_REFRESH_PERIOD_SECS", defaults::REFRESH_PERIOD_SECS)?,
            health_check_period: env_secs(
                "CLUSTER_HEALTH_CHECK_PERIOD_SECS",
                defaults::HEALTH_CHECK_PERIOD_SECS,
            )?,
            health_check_timeout: env_secs(
                "CLUSTER_HEALTH_CHECK_TIMEOUT_SECS",
                defaults::HEALTH_CHECK_TIMEOUT_SECS,
            )?,
            probe_threshold: env_or("CLUSTER_PROBE_THRESHOLD", defaults::PROBE_THRESHOLD)?,
            client_qps: env_or("CLUSTER_API_QPS", defaults::CLIENT_QPS)?,
            client_burst: env_or("CLUSTER_API_BURST", defaults::CLIENT_BURST)?,
        })
    }
}

/// Parse an optional duration in seconds, which must be greater than zero
fn env_secs(key: &str, default: u64) -> Result<Duration> {
    let secs: u64 = env_or(key, default)?;
    if secs == 0 {
        bail!("{} must be greater than zero", key);
    }
    Ok(Duration::from_secs(secs))
}

/// Parse an optional environment variable, falling back to `default` when unset
fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {:?}", key, value)),
        Err(_) => Ok(default),
    }
}
