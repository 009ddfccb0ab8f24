use serde::{Deserialize, Serialize};

/// A registered smart-home device as persisted in the registry table.
///
/// Timestamps are milliseconds since the Unix epoch. `created_at` is written
/// once by the create path and never touched again; `modified_at` is
/// refreshed by every successful update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: String,
    pub mac: String,
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: String,
    #[serde(default)]
    pub home_id: String,
    pub created_at: i64,
    pub modified_at: i64,
}

/// Input for registering a device. `home_id` is optional; everything else
/// must be non-empty or the create is rejected before touching the store.
/// Absent fields deserialize to empty strings so the service, not the
/// decode layer, reports them as missing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeviceInput {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub mac: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub device_type: String,
    #[serde(default)]
    pub home_id: String,
}

/// Input for retrieving a device by ID
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GetDeviceInput {
    pub id: String,
}

/// Sparse update request. A field left as `None` is not touched in the
/// stored record; `Some("")` is a real value and clears the field.
/// Unknown fields in the incoming payload are ignored by serde.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDeviceInput {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub mac: Option<String>,
    #[serde(default, rename = "type")]
    pub device_type: Option<String>,
    #[serde(default)]
    pub home_id: Option<String>,
}

/// Input for deleting a device by ID
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeleteDeviceInput {
    pub id: String,
}

/// The restricted update shape delivered over the assignment queue:
/// reassigns a device to a household, nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeAssignment {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub home_id: String,
}

/// The set of field changes handed to the store by the update path.
/// Presence, not truthiness, decides whether a field is written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceChanges {
    pub name: Option<String>,
    pub mac: Option<String>,
    pub device_type: Option<String>,
    pub home_id: Option<String>,
}

impl DeviceChanges {
    /// True when no field is set; the update then only refreshes the
    /// modification timestamp.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.mac.is_none()
            && self.device_type.is_none()
            && self.home_id.is_none()
    }
}
