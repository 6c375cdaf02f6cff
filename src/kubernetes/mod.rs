// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities for remote cluster client creation.

pub mod client;

pub use client::{ConnectionFactory, ConnectionSettings, Connector};
