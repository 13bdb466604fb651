//! Scrapeline Worker - Main Entry Point

use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use scrapeline_core::application::worker::{shutdown_channel, Worker};
use scrapeline_core::config::{FetcherConfig, QueueConfig, WorkerConfig};
use scrapeline_infra_amqp::AmqpQueueConnector;
use scrapeline_infra_browser::CdpPageFetcher;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize logging
    let log_format = std::env::var("SCRAPELINE_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("scrapeline=info"))
        .expect("Failed to create env filter");

    match log_format.as_str() {
        "json" => {
            // Production: JSON structured logging
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        _ => {
            // Development: pretty formatting with colors
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }

    info!("Scrapeline worker v{} starting...", VERSION);

    // 2. Load configuration
    let queue_config = QueueConfig::from_env();
    let fetcher_config = FetcherConfig::from_env();
    let worker_config = WorkerConfig::from_env();

    info!(
        broker = %queue_config.host,
        port = queue_config.port,
        queue = %queue_config.queue,
        browser = %fetcher_config.endpoint,
        "Configuration loaded"
    );

    // 3. Wire adapters
    let connector = Arc::new(AmqpQueueConnector::new(queue_config));
    let fetcher = Arc::new(CdpPageFetcher::new(fetcher_config));

    // 4. Start the consume loop
    let (shutdown_tx, shutdown_rx) = shutdown_channel();
    let worker = Worker::new(connector, fetcher, worker_config);

    let worker_handle = tokio::spawn(async move {
        if let Err(e) = worker.run(shutdown_rx).await {
            tracing::error!(error = ?e, "Worker failed");
        }
    });

    info!("Waiting for jobs. Press Ctrl+C to shut down");

    // 5. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;

    info!("Shutdown signal received. Exiting gracefully...");

    // 6. Stop accepting deliveries and close the subscription. An in-flight
    //    delivery is left unacknowledged on purpose: the broker redelivers
    //    it after the connection drops, favoring re-processing over loss.
    shutdown_tx.shutdown();
    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), worker_handle).await;

    info!("Shutdown complete.");

    Ok(())
}
