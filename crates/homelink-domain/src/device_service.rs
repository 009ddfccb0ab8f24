use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::device::{
    CreateDeviceInput, DeleteDeviceInput, Device, DeviceChanges, GetDeviceInput, HomeAssignment,
    UpdateDeviceInput,
};
use crate::error::{DomainError, DomainResult};
use crate::store::DeviceStore;

/// Domain service for the device registry. Owns validation, timestamp
/// stamping, and partial-update field selection; all persistence goes
/// through the injected [`DeviceStore`].
pub struct DeviceService {
    store: Arc<dyn DeviceStore>,
}

impl DeviceService {
    pub fn new(store: Arc<dyn DeviceStore>) -> Self {
        Self { store }
    }

    /// Register a device. Create is an upsert: an existing record under the
    /// same ID is silently overwritten and both timestamps restamped.
    pub async fn create_device(&self, input: CreateDeviceInput) -> DomainResult<()> {
        if input.id.is_empty()
            || input.mac.is_empty()
            || input.name.is_empty()
            || input.device_type.is_empty()
        {
            return Err(DomainError::MissingFields);
        }

        let now = Utc::now().timestamp_millis();
        let device = Device {
            id: input.id,
            mac: input.mac,
            name: input.name,
            device_type: input.device_type,
            home_id: input.home_id,
            created_at: now,
            modified_at: now,
        };

        debug!(device_id = %device.id, "Creating device");

        let device_id = device.id.clone();
        self.store.put(device).await?;

        info!(device_id = %device_id, "Device created");
        Ok(())
    }

    /// Get a device by ID
    pub async fn get_device(&self, input: GetDeviceInput) -> DomainResult<Device> {
        if input.id.is_empty() {
            return Err(DomainError::MissingId);
        }

        debug!(device_id = %input.id, "Getting device");

        let device = self
            .store
            .get(&input.id)
            .await?
            .ok_or_else(|| DomainError::DeviceNotFound(input.id.clone()))?;

        Ok(device)
    }

    /// Apply a partial update. Only fields present in the input reach the
    /// store; `modified_at` is refreshed even when no other field is set.
    /// Existence of the target record is not checked here.
    pub async fn update_device(&self, input: UpdateDeviceInput) -> DomainResult<()> {
        if input.id.is_empty() {
            return Err(DomainError::MissingId);
        }

        let changes = DeviceChanges {
            name: input.name,
            mac: input.mac,
            device_type: input.device_type,
            home_id: input.home_id,
        };
        let now = Utc::now().timestamp_millis();

        debug!(
            device_id = %input.id,
            timestamp_only = changes.is_empty(),
            "Updating device"
        );

        self.store.apply_changes(&input.id, changes, now).await?;

        info!(device_id = %input.id, "Device updated");
        Ok(())
    }

    /// Remove a device. Deleting an absent ID is not an error.
    pub async fn delete_device(&self, input: DeleteDeviceInput) -> DomainResult<()> {
        if input.id.is_empty() {
            return Err(DomainError::MissingId);
        }

        debug!(device_id = %input.id, "Deleting device");

        self.store.delete(&input.id).await?;

        info!(device_id = %input.id, "Device deleted");
        Ok(())
    }

    /// Queue-driven variant of update: reassigns the owning household and
    /// refreshes `modified_at`, same semantics as [`Self::update_device`].
    pub async fn assign_home(&self, assignment: HomeAssignment) -> DomainResult<()> {
        self.update_device(UpdateDeviceInput {
            id: assignment.id,
            home_id: Some(assignment.home_id),
            ..Default::default()
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MockDeviceStore;

    fn create_input(id: &str) -> CreateDeviceInput {
        CreateDeviceInput {
            id: id.to_string(),
            mac: "AA:BB:CC:DD:EE:FF".to_string(),
            name: "Thermostat".to_string(),
            device_type: "thermostat".to_string(),
            home_id: "home-123".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_device_success() {
        let mut mock_store = MockDeviceStore::new();

        mock_store
            .expect_put()
            .withf(|device: &Device| {
                device.id == "1"
                    && device.mac == "AA:BB:CC:DD:EE:FF"
                    && device.name == "Thermostat"
                    && device.device_type == "thermostat"
                    && device.home_id == "home-123"
                    && device.created_at > 0
                    && device.created_at == device.modified_at
            })
            .times(1)
            .return_once(|_| Ok(()));

        let service = DeviceService::new(Arc::new(mock_store));

        let result = service.create_device(create_input("1")).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_create_device_missing_fields() {
        // No expectations set: any store call fails the test
        let mock_store = MockDeviceStore::new();
        let service = DeviceService::new(Arc::new(mock_store));

        for input in [
            CreateDeviceInput {
                id: "".to_string(),
                ..create_input("1")
            },
            CreateDeviceInput {
                mac: "".to_string(),
                ..create_input("1")
            },
            CreateDeviceInput {
                name: "".to_string(),
                ..create_input("1")
            },
            CreateDeviceInput {
                device_type: "".to_string(),
                ..create_input("1")
            },
        ] {
            let result = service.create_device(input).await;
            assert!(matches!(result, Err(DomainError::MissingFields)));
        }
    }

    #[tokio::test]
    async fn test_create_device_empty_home_id_is_allowed() {
        let mut mock_store = MockDeviceStore::new();

        mock_store
            .expect_put()
            .withf(|device: &Device| device.home_id.is_empty())
            .times(1)
            .return_once(|_| Ok(()));

        let service = DeviceService::new(Arc::new(mock_store));

        let input = CreateDeviceInput {
            home_id: "".to_string(),
            ..create_input("1")
        };
        assert!(service.create_device(input).await.is_ok());
    }

    #[tokio::test]
    async fn test_create_device_store_error() {
        let mut mock_store = MockDeviceStore::new();

        mock_store
            .expect_put()
            .times(1)
            .return_once(|_| Err(anyhow::anyhow!("table unavailable")));

        let service = DeviceService::new(Arc::new(mock_store));

        let result = service.create_device(create_input("1")).await;
        assert!(matches!(result, Err(DomainError::StorageFailure(_))));
    }

    #[tokio::test]
    async fn test_get_device_success() {
        let mut mock_store = MockDeviceStore::new();

        let stored = Device {
            id: "1".to_string(),
            mac: "AA:BB:CC:DD:EE:FF".to_string(),
            name: "Thermostat".to_string(),
            device_type: "thermostat".to_string(),
            home_id: "home-123".to_string(),
            created_at: 1700000000000,
            modified_at: 1700000000000,
        };

        mock_store
            .expect_get()
            .withf(|id: &str| id == "1")
            .times(1)
            .return_once(move |_| Ok(Some(stored)));

        let service = DeviceService::new(Arc::new(mock_store));

        let device = service
            .get_device(GetDeviceInput { id: "1".to_string() })
            .await
            .unwrap();
        assert_eq!(device.name, "Thermostat");
        assert_eq!(device.created_at, device.modified_at);
    }

    #[tokio::test]
    async fn test_get_device_empty_id() {
        let mock_store = MockDeviceStore::new();
        let service = DeviceService::new(Arc::new(mock_store));

        let result = service.get_device(GetDeviceInput { id: "".to_string() }).await;
        assert!(matches!(result, Err(DomainError::MissingId)));
    }

    #[tokio::test]
    async fn test_get_device_not_found() {
        let mut mock_store = MockDeviceStore::new();

        mock_store.expect_get().times(1).return_once(|_| Ok(None));

        let service = DeviceService::new(Arc::new(mock_store));

        let result = service
            .get_device(GetDeviceInput {
                id: "nonexistent".to_string(),
            })
            .await;
        assert!(matches!(result, Err(DomainError::DeviceNotFound(_))));
    }

    #[tokio::test]
    async fn test_update_device_subset_of_fields() {
        let mut mock_store = MockDeviceStore::new();

        mock_store
            .expect_apply_changes()
            .withf(|id: &str, changes: &DeviceChanges, modified_at: &i64| {
                id == "1"
                    && changes.home_id == Some("home-456".to_string())
                    && changes.name.is_none()
                    && changes.mac.is_none()
                    && changes.device_type.is_none()
                    && *modified_at > 0
            })
            .times(1)
            .return_once(|_, _, _| Ok(()));

        let service = DeviceService::new(Arc::new(mock_store));

        let result = service
            .update_device(UpdateDeviceInput {
                id: "1".to_string(),
                home_id: Some("home-456".to_string()),
                ..Default::default()
            })
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_update_device_timestamp_only() {
        let mut mock_store = MockDeviceStore::new();

        mock_store
            .expect_apply_changes()
            .withf(|_, changes: &DeviceChanges, _| changes.is_empty())
            .times(1)
            .return_once(|_, _, _| Ok(()));

        let service = DeviceService::new(Arc::new(mock_store));

        let result = service
            .update_device(UpdateDeviceInput {
                id: "1".to_string(),
                ..Default::default()
            })
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_update_device_empty_string_clears_field() {
        let mut mock_store = MockDeviceStore::new();

        mock_store
            .expect_apply_changes()
            .withf(|_, changes: &DeviceChanges, _| changes.name == Some("".to_string()))
            .times(1)
            .return_once(|_, _, _| Ok(()));

        let service = DeviceService::new(Arc::new(mock_store));

        let result = service
            .update_device(UpdateDeviceInput {
                id: "1".to_string(),
                name: Some("".to_string()),
                ..Default::default()
            })
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_update_device_empty_id() {
        let mock_store = MockDeviceStore::new();
        let service = DeviceService::new(Arc::new(mock_store));

        let result = service
            .update_device(UpdateDeviceInput {
                id: "".to_string(),
                name: Some("New name".to_string()),
                ..Default::default()
            })
            .await;
        assert!(matches!(result, Err(DomainError::MissingId)));
    }

    #[tokio::test]
    async fn test_update_device_store_error() {
        let mut mock_store = MockDeviceStore::new();

        mock_store
            .expect_apply_changes()
            .times(1)
            .return_once(|_, _, _| Err(anyhow::anyhow!("write throttled")));

        let service = DeviceService::new(Arc::new(mock_store));

        let result = service
            .update_device(UpdateDeviceInput {
                id: "1".to_string(),
                ..Default::default()
            })
            .await;
        assert!(matches!(result, Err(DomainError::StorageFailure(_))));
    }

    #[tokio::test]
    async fn test_delete_device_success() {
        let mut mock_store = MockDeviceStore::new();

        mock_store
            .expect_delete()
            .withf(|id: &str| id == "1")
            .times(1)
            .return_once(|_| Ok(()));

        let service = DeviceService::new(Arc::new(mock_store));

        let result = service
            .delete_device(DeleteDeviceInput { id: "1".to_string() })
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_delete_device_empty_id() {
        let mock_store = MockDeviceStore::new();
        let service = DeviceService::new(Arc::new(mock_store));

        let result = service
            .delete_device(DeleteDeviceInput { id: "".to_string() })
            .await;
        assert!(matches!(result, Err(DomainError::MissingId)));
    }

    #[tokio::test]
    async fn test_assign_home_only_touches_home_id() {
        let mut mock_store = MockDeviceStore::new();

        mock_store
            .expect_apply_changes()
            .withf(|id: &str, changes: &DeviceChanges, _| {
                id == "1"
                    && changes.home_id == Some("home-789".to_string())
                    && changes.name.is_none()
                    && changes.mac.is_none()
                    && changes.device_type.is_none()
            })
            .times(1)
            .return_once(|_, _, _| Ok(()));

        let service = DeviceService::new(Arc::new(mock_store));

        let result = service
            .assign_home(HomeAssignment {
                id: "1".to_string(),
                home_id: "home-789".to_string(),
            })
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_assign_home_empty_id() {
        let mock_store = MockDeviceStore::new();
        let service = DeviceService::new(Arc::new(mock_store));

        let result = service
            .assign_home(HomeAssignment {
                id: "".to_string(),
                home_id: "home-789".to_string(),
            })
            .await;
        assert!(matches!(result, Err(DomainError::MissingId)));
    }
}
