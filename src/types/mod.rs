// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Custom resource types and status conditions.

pub mod condition;
pub mod toolchain_cluster;

pub use condition::{Condition, ConditionStatus};
pub use toolchain_cluster::{
    ClusterRole, LocalSecretReference, ToolchainCluster, ToolchainClusterSpec,
    ToolchainClusterStatus,
};
