// =====================================================================================
// IN-MEMORY DEVICE REGISTRY
// =====================================================================================

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use crate::models::{
    CatalogError, CatalogSnapshot, DeviceCatalog, DeviceRecord, StateChange,
};

const FEED_CAPACITY: usize = 256;

#[derive(Debug, Default)]
struct DeviceEntry {
    name: Option<String>,
    signal_sources: Vec<String>,
}

#[derive(Debug)]
struct SourceEntry {
    device_id: String,
    value: Option<String>,
}

#[derive(Debug, Default)]
struct RegistryInner {
    devices: HashMap<String, DeviceEntry>,
    sources: HashMap<String, SourceEntry>,
}

/// Registry of devices and their signal sources. Value updates are fanned out
/// on a broadcast channel; slow subscribers lag rather than block writers.
pub struct DeviceRegistry {
    inner: RwLock<RegistryInner>,
    feed: broadcast::Sender<StateChange>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        let (feed, _) = broadcast::channel(FEED_CAPACITY);
        Self {
            inner: RwLock::new(RegistryInner::default()),
            feed,
        }
    }

    /// Subscribe to the state change feed.
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.feed.subscribe()
    }

    pub async fn register_device(&self, record: DeviceRecord) -> Result<(), CatalogError> {
        let mut inner = self.inner.write().await;
        if inner.devices.contains_key(&record.device_id) {
            return Err(CatalogError::DeviceExists(record.device_id));
        }

        debug!(
            device_id = %record.device_id,
            sources = record.signal_sources.len(),
            "registering device"
        );

        for source_id in &record.signal_sources {
            inner.sources.insert(
                source_id.clone(),
                SourceEntry {
                    device_id: record.device_id.clone(),
                    value: None,
                },
            );
        }
        inner.devices.insert(
            record.device_id,
            DeviceEntry {
                name: record.name,
                signal_sources: record.signal_sources,
            },
        );
        Ok(())
    }

    /// Binds an additional signal source to an already registered device.
    pub async fn bind_source(&self, device_id: &str, source_id: &str) -> Result<(), CatalogError> {
        let mut inner = self.inner.write().await;
        let Some(device) = inner.devices.get_mut(device_id) else {
            return Err(CatalogError::DeviceNotFound(device_id.to_string()));
        };
        if !device.signal_sources.iter().any(|s| s == source_id) {
            device.signal_sources.push(source_id.to_string());
        }
        inner.sources.insert(
            source_id.to_string(),
            SourceEntry {
                device_id: device_id.to_string(),
                value: None,
            },
        );
        Ok(())
    }

    /// Records a new value for a signal source and broadcasts the change.
    pub async fn set_value(&self, source_id: &str, value: &str) -> Result<StateChange, CatalogError> {
        let mut inner = self.inner.write().await;
        let source = inner
            .sources
            .get_mut(source_id)
            .ok_or_else(|| CatalogError::SourceNotFound(source_id.to_string()))?;
        source.value = Some(value.to_string());

        let change = StateChange {
            source_id: source_id.to_string(),
            value: value.to_string(),
            timestamp: Utc::now(),
        };
        // No subscribers is fine; the watchdog may not be running yet.
        let _ = self.feed.send(change.clone());
        Ok(change)
    }

    pub async fn snapshot(&self) -> CatalogSnapshot {
        let inner = self.inner.read().await;
        let devices = inner
            .devices
            .iter()
            .map(|(device_id, entry)| DeviceRecord {
                device_id: device_id.clone(),
                name: entry.name.clone(),
                signal_sources: entry.signal_sources.clone(),
            })
            .collect();
        let values = inner
            .sources
            .iter()
            .filter_map(|(id, s)| s.value.clone().map(|v| (id.clone(), v)))
            .collect();
        CatalogSnapshot { devices, values }
    }
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DeviceCatalog for DeviceRegistry {
    async fn display_name(&self, device_id: &str) -> Option<String> {
        let inner = self.inner.read().await;
        inner.devices.get(device_id).and_then(|d| d.name.clone())
    }

    async fn signal_sources(&self, device_id: &str) -> Vec<String> {
        let inner = self.inner.read().await;
        inner
            .devices
            .get(device_id)
            .map(|d| d.signal_sources.clone())
            .unwrap_or_default()
    }

    async fn current_value(&self, source_id: &str) -> Option<String> {
        let inner = self.inner.read().await;
        inner.sources.get(source_id).and_then(|s| s.value.clone())
    }

    async fn device_of(&self, source_id: &str) -> Option<String> {
        let inner = self.inner.read().await;
        inner.sources.get(source_id).map(|s| s.device_id.clone())
    }
}
