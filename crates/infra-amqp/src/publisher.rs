// Producer-side adapter

use async_trait::async_trait;
use lapin::options::BasicPublishOptions;
use lapin::BasicProperties;
use scrapeline_core::config::QueueConfig;
use scrapeline_core::domain::Job;
use scrapeline_core::port::{JobQueue, QueueError};
use tracing::debug;

/// Delivery mode 2 marks a message persistent so it survives a broker
/// restart (given the durable queue declare).
const PERSISTENT: u8 = 2;

/// Publishes jobs straight to the named durable queue, no exchange
/// indirection.
///
/// Every publish opens its own connection and closes it afterwards;
/// concurrent callers never share one.
pub struct AmqpJobQueue {
    config: QueueConfig,
}

impl AmqpJobQueue {
    pub fn new(config: QueueConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl JobQueue for AmqpJobQueue {
    async fn publish(&self, job: &Job) -> Result<(), QueueError> {
        let payload = job
            .to_payload()
            .map_err(|e| QueueError::Encode(e.to_string()))?;

        let conn = crate::connection::open(&self.config).await?;
        let channel = conn
            .create_channel()
            .await
            .map_err(|e| QueueError::Connect(e.to_string()))?;
        crate::connection::declare(&channel, &self.config.queue).await?;

        channel
            .basic_publish(
                "",
                &self.config.queue,
                BasicPublishOptions::default(),
                &payload,
                BasicProperties::default().with_delivery_mode(PERSISTENT),
            )
            .await
            .map_err(|e| QueueError::Publish(e.to_string()))?
            .await
            .map_err(|e| QueueError::Publish(e.to_string()))?;

        debug!(queue = %self.config.queue, url = %job.url, "Message published");

        // The message is already on the broker; close failures are ignored.
        let _ = conn.close(200, "publish done").await;
        Ok(())
    }

    async fn ping(&self) -> Result<(), QueueError> {
        let conn = crate::connection::open(&self.config).await?;
        let _ = conn.close(200, "ping").await;
        Ok(())
    }
}
