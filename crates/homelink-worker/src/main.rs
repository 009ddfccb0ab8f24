mod config;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use homelink_domain::{DeviceService, InMemoryDeviceStore};
use homelink_nats::{create_assignment_processor, AssignmentConsumer, NatsClient};

#[tokio::main]
async fn main() {
    let config = match config::WorkerConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    info!("Starting homelink assignment worker");
    info!("Configuration: {:?}", config);

    let token = CancellationToken::new();
    spawn_signal_handlers(token.clone());

    if let Err(e) = run_worker(token, config).await {
        error!("Worker exiting with error: {:#}", e);
        std::process::exit(1);
    }

    info!("Worker exiting normally");
}

async fn run_worker(ctx: CancellationToken, config: config::WorkerConfig) -> Result<()> {
    let nats = NatsClient::connect(
        &config.nats_url,
        Duration::from_secs(config.connect_timeout_secs),
    )
    .await?;
    nats.ensure_stream(&config.nats_stream).await?;

    let store = Arc::new(InMemoryDeviceStore::new());
    let service = Arc::new(DeviceService::new(store));

    let consumer = AssignmentConsumer::new(
        nats.jetstream(),
        &config.nats_stream,
        &config.nats_consumer,
        &config.nats_subject,
        config.nats_batch_size,
        config.nats_batch_wait_secs,
        create_assignment_processor(service),
    )
    .await?;

    consumer.run(ctx).await
}

fn spawn_signal_handlers(token: CancellationToken) {
    let ctrl_c_token = token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received shutdown signal");
                ctrl_c_token.cancel();
            }
            Err(err) => {
                error!("Error setting up signal handler: {}", err);
            }
        }
    });

    #[cfg(unix)]
    {
        tokio::spawn(async move {
            use tokio::signal::unix::{signal, SignalKind};
            let mut sigterm =
                signal(SignalKind::terminate()).expect("Failed to set up SIGTERM handler");
            sigterm.recv().await;
            info!("Received SIGTERM signal");
            token.cancel();
        });
    }
}
