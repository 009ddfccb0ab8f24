use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::device::{Device, DeviceChanges};
use crate::store::DeviceStore;

/// In-memory implementation of [`DeviceStore`] using a `HashMap`.
/// Substitutable at the store boundary for tests and local runs.
pub struct InMemoryDeviceStore {
    devices: RwLock<HashMap<String, Device>>,
}

impl InMemoryDeviceStore {
    pub fn new() -> Self {
        Self {
            devices: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryDeviceStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DeviceStore for InMemoryDeviceStore {
    async fn get(&self, device_id: &str) -> anyhow::Result<Option<Device>> {
        let devices = self.devices.read().await;
        Ok(devices.get(device_id).cloned())
    }

    async fn put(&self, device: Device) -> anyhow::Result<()> {
        let mut devices = self.devices.write().await;
        devices.insert(device.id.clone(), device);
        Ok(())
    }

    async fn apply_changes(
        &self,
        device_id: &str,
        changes: DeviceChanges,
        modified_at: i64,
    ) -> anyhow::Result<()> {
        let mut devices = self.devices.write().await;

        // Update on an absent key creates a sparse record, matching the
        // upsert semantics of the key-value backends this doubles for.
        let device = devices
            .entry(device_id.to_string())
            .or_insert_with(|| Device {
                id: device_id.to_string(),
                mac: String::new(),
                name: String::new(),
                device_type: String::new(),
                home_id: String::new(),
                created_at: 0,
                modified_at: 0,
            });

        if let Some(name) = changes.name {
            device.name = name;
        }
        if let Some(mac) = changes.mac {
            device.mac = mac;
        }
        if let Some(device_type) = changes.device_type {
            device.device_type = device_type;
        }
        if let Some(home_id) = changes.home_id {
            device.home_id = home_id;
        }
        device.modified_at = modified_at;

        Ok(())
    }

    async fn delete(&self, device_id: &str) -> anyhow::Result<()> {
        let mut devices = self.devices.write().await;
        devices.remove(device_id);
        Ok(())
    }
}
