use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A signal source reported a new value. Broadcast to every subscriber of the
/// registry's state feed.
#[derive(Debug, Clone, Serialize)]
pub struct StateChange {
    pub source_id: String,
    pub value: String,
    pub timestamp: DateTime<Utc>,
}

/// Read side of the catalog, as consumed by the watchdog coordinator.
///
/// Lookups never fail hard: an unknown device simply resolves to no name and
/// no sources, and an unknown source to no value. Callers degrade gracefully.
#[async_trait]
pub trait DeviceCatalog: Send + Sync {
    /// Human-readable name, if one was registered.
    async fn display_name(&self, device_id: &str) -> Option<String>;

    /// Signal sources bound to the device; empty if none (or unknown device).
    async fn signal_sources(&self, device_id: &str) -> Vec<String>;

    /// Current value of a signal source, if it ever reported one.
    async fn current_value(&self, source_id: &str) -> Option<String>;

    /// Reverse lookup used to filter the state feed down to watched devices.
    async fn device_of(&self, source_id: &str) -> Option<String>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub device_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub signal_sources: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SetValueRequest {
    pub source_id: String,
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct CatalogSnapshot {
    pub devices: Vec<DeviceRecord>,
    pub values: HashMap<String, String>,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("device already registered: {0}")]
    DeviceExists(String),
    #[error("unknown device: {0}")]
    DeviceNotFound(String),
    #[error("unknown signal source: {0}")]
    SourceNotFound(String),
}
