// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Cross-cluster connection cache, its refresh loop and its health checks.

pub mod health;
pub mod registry;
pub mod service;

pub use health::HealthChecker;
pub use registry::{CachedCluster, ClusterRegistry};
pub use service::ClusterService;

use std::future::Future;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Shortest period between two cycles
pub(crate) const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Run `cycle` every `period` until `shutdown` is cancelled.
///
/// The token is only checked between cycles, so a running cycle always
/// completes. A cycle that overruns its period skips the missed ticks.
/// A zero period is raised to [`MIN_PERIOD`].
pub(crate) async fn run_periodically<F, Fut>(
    period: Duration,
    shutdown: CancellationToken,
    mut cycle: F,
) where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(period.max(MIN_PERIOD));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => cycle().await,
        }
    }
}
