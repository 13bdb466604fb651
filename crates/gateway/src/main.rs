// Gateway entry point

use std::sync::Arc;

use anyhow::{Context, Result};
use scrapeline_core::application::Producer;
use scrapeline_core::config::{GatewayConfig, QueueConfig};
use scrapeline_gateway::build_app;
use scrapeline_infra_amqp::AmqpJobQueue;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,scrapeline=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let gateway_config = GatewayConfig::from_env();
    let queue_config = QueueConfig::from_env();
    tracing::info!(
        broker = %queue_config.host,
        queue = %queue_config.queue,
        domain = %gateway_config.allowed_domain,
        "Starting gateway"
    );

    let queue = Arc::new(AmqpJobQueue::new(queue_config));
    let producer = Arc::new(Producer::new(queue, gateway_config.allowed_domain.clone()));

    let app = build_app(producer);

    let addr = format!("0.0.0.0:{}", gateway_config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind gateway address")?;
    tracing::info!(addr = %addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await
        .context("Gateway server error")?;

    Ok(())
}
