use async_trait::async_trait;

use crate::device::{Device, DeviceChanges};

/// Key-value storage capability the device service depends on.
/// Implementations can be in-memory, DynamoDB, Redis, etc. All operations
/// are point lookups keyed by device ID.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeviceStore: Send + Sync {
    /// Fetch a device by ID, `None` if absent
    async fn get(&self, device_id: &str) -> anyhow::Result<Option<Device>>;

    /// Insert or fully overwrite a device record
    async fn put(&self, device: Device) -> anyhow::Result<()>;

    /// Apply only the fields set in `changes`, plus the modification
    /// timestamp which is always written. Whether an absent key is created
    /// or rejected is the store's concern, not the caller's.
    async fn apply_changes(
        &self,
        device_id: &str,
        changes: DeviceChanges,
        modified_at: i64,
    ) -> anyhow::Result<()>;

    /// Remove a device record; no-op when the key is absent
    async fn delete(&self, device_id: &str) -> anyhow::Result<()>;
}
