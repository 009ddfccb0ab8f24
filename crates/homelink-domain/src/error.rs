use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("missing required fields: id, mac, name, type must be present")]
    MissingFields,

    #[error("missing device ID")]
    MissingId,

    #[error("device not found: {0}")]
    DeviceNotFound(String),

    #[error("storage error: {0}")]
    StorageFailure(#[from] anyhow::Error),
}

pub type DomainResult<T> = Result<T, DomainError>;
