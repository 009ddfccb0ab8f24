pub mod device;
pub mod device_service;
pub mod error;
pub mod in_memory_device_store;
pub mod store;

pub use device::{
    CreateDeviceInput, DeleteDeviceInput, Device, DeviceChanges, GetDeviceInput, HomeAssignment,
    UpdateDeviceInput,
};
pub use device_service::DeviceService;
pub use error::{DomainError, DomainResult};
pub use in_memory_device_store::InMemoryDeviceStore;
pub use store::DeviceStore;
