// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Aggregated connection condition for status reporting reconcilers.
//!
//! A cached `Ready=True` alone is not trusted: the last probe must also be
//! recent enough, otherwise the health checker has stopped reporting.

use crate::cluster::{CachedCluster, ClusterRegistry};
use crate::config::Config;
use crate::constants::{conditions, connection};
use crate::types::condition::{find_condition, Condition, ConditionStatus};
use crate::types::ClusterRole;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Looks up the cluster a status reporter cares about
pub trait ClusterLookup {
    fn lookup(&self, role: ClusterRole) -> Option<CachedCluster>;
}

impl ClusterLookup for ClusterRegistry {
    fn lookup(&self, role: ClusterRole) -> Option<CachedCluster> {
        match role {
            ClusterRole::Host => self.get_host(),
            ClusterRole::Member => self.get_by_role(role).into_iter().next(),
        }
    }
}

/// Inputs for [`connection_condition`]
#[derive(Debug, Clone, Copy)]
pub struct ConnectionAttributes {
    pub role: ClusterRole,
    /// Interval between two health checks
    pub period: Duration,
    /// Timeout of a single health probe
    pub timeout: Duration,
    /// Consecutive missed probes tolerated before the connection is stale
    pub threshold: u32,
}

impl ConnectionAttributes {
    /// Attributes matching the health checker settings in `config`
    pub fn from_config(role: ClusterRole, config: &Config) -> Self {
        Self {
            role,
            period: config.health_check_period,
            timeout: config.health_check_timeout,
            threshold: config.probe_threshold,
        }
    }

    /// Longest tolerated time since the last probe, saturating at [`Duration::MAX`]
    pub fn max_probe_age(&self) -> Duration {
        self.period
            .checked_add(self.timeout)
            .and_then(|cycle| cycle.checked_mul(self.threshold))
            .unwrap_or(Duration::MAX)
    }
}

/// Compute the Ready condition of the connection to the looked-up cluster
pub fn connection_condition<L: ClusterLookup + ?Sized>(
    lookup: &L,
    attrs: &ConnectionAttributes,
    now: DateTime<Utc>,
) -> Condition {
    let Some(cluster) = lookup.lookup(attrs.role) else {
        return not_ready(connection::NOT_FOUND_REASON, connection::NOT_FOUND_MSG, now);
    };

    let ready = find_condition(&cluster.status.conditions, conditions::READY);
    let Some(ready) = ready.filter(|c| c.is_true()) else {
        let message = ready
            .and_then(|c| c.message.as_deref())
            .filter(|m| !m.is_empty())
            .unwrap_or(connection::NOT_READY_MSG);
        return not_ready(connection::NOT_READY_REASON, message, now);
    };

    let max_age = attrs.max_probe_age();
    let stale = match ready.last_probe_time {
        Some(probed) => match (now - probed).to_std() {
            Ok(age) => age > max_age,
            // probe time in the future
            Err(_) => false,
        },
        None => true,
    };

    if stale {
        return not_ready(
            connection::LAST_PROBE_TIME_EXCEEDED_REASON,
            &format!(
                "exceeded the maximum duration since the last probe: {}",
                format_duration(max_age)
            ),
            now,
        );
    }

    Condition {
        condition_type: conditions::READY.to_string(),
        status: ConditionStatus::True,
        reason: Some(connection::READY_REASON.to_string()),
        message: None,
        last_probe_time: Some(now),
        last_transition_time: Some(now),
    }
}

fn not_ready(reason: &str, message: &str, now: DateTime<Utc>) -> Condition {
    Condition::new(conditions::READY, ConditionStatus::False, reason, message, now)
}

/// Format like `39s`, `1m30s` or `2h0m5s`
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    match (hours, minutes) {
        (0, 0) => format!("{}s", seconds),
        (0, _) => format!("{}m{}s", minutes, seconds),
        _ => format!("{}h{}m{}s", hours, minutes, seconds),
    }
}
