// Shared connection helpers

use lapin::options::QueueDeclareOptions;
use lapin::types::FieldTable;
use lapin::{Channel, Connection, ConnectionProperties};
use scrapeline_core::config::QueueConfig;
use scrapeline_core::port::QueueError;
use tracing::debug;

/// Open a broker connection from the configured URI.
pub(crate) async fn open(config: &QueueConfig) -> Result<Connection, QueueError> {
    debug!(host = %config.host, port = config.port, "Connecting to broker");
    Connection::connect(&config.amqp_uri(), ConnectionProperties::default())
        .await
        .map_err(|e| QueueError::Connect(e.to_string()))
}

/// Idempotent durable declare of the named queue.
///
/// Both sides declare before use, so whichever process starts first creates
/// the queue and the other finds it already there.
pub(crate) async fn declare(channel: &Channel, queue: &str) -> Result<(), QueueError> {
    channel
        .queue_declare(
            queue,
            QueueDeclareOptions {
                durable: true,
                ..Default::default()
            },
            FieldTable::default(),
        )
        .await
        .map_err(|e| QueueError::Declare(e.to_string()))?;
    Ok(())
}
