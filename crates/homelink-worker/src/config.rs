use config::{Config, ConfigError, Environment};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct WorkerConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// NATS server URL
    #[serde(default = "default_nats_url")]
    pub nats_url: String,

    /// JetStream stream carrying home-assignment messages
    #[serde(default = "default_nats_stream")]
    pub nats_stream: String,

    /// Durable consumer name
    #[serde(default = "default_nats_consumer")]
    pub nats_consumer: String,

    /// Subject filter for the consumer
    #[serde(default = "default_nats_subject")]
    pub nats_subject: String,

    /// Batch size for each fetch
    #[serde(default = "default_nats_batch_size")]
    pub nats_batch_size: usize,

    /// Max wait time for a batch in seconds
    #[serde(default = "default_nats_batch_wait_secs")]
    pub nats_batch_wait_secs: u64,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_nats_url() -> String {
    "nats://localhost:4222".to_string()
}

fn default_nats_stream() -> String {
    "device_assignments".to_string()
}

fn default_nats_consumer() -> String {
    "homelink-worker".to_string()
}

fn default_nats_subject() -> String {
    "device_assignments.>".to_string()
}

fn default_nats_batch_size() -> usize {
    30
}

fn default_nats_batch_wait_secs() -> u64 {
    5
}

fn default_connect_timeout_secs() -> u64 {
    10
}

impl WorkerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Environment::with_prefix("HOMELINK"))
            .build()?
            .try_deserialize()
    }
}
