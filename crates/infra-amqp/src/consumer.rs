// Consumer-side adapter

use async_trait::async_trait;
use futures::StreamExt;
use lapin::acker::Acker;
use lapin::options::{BasicAckOptions, BasicConsumeOptions, BasicNackOptions, BasicQosOptions};
use lapin::types::FieldTable;
use lapin::Connection;
use scrapeline_core::config::QueueConfig;
use scrapeline_core::port::{Acknowledger, Delivery, JobStream, QueueConnector, QueueError};
use tracing::info;
use uuid::Uuid;

/// Establishes prefetch-1 subscriptions on the named durable queue.
pub struct AmqpQueueConnector {
    config: QueueConfig,
}

impl AmqpQueueConnector {
    pub fn new(config: QueueConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl QueueConnector for AmqpQueueConnector {
    async fn subscribe(&self) -> Result<Box<dyn JobStream>, QueueError> {
        let conn = crate::connection::open(&self.config).await?;
        let channel = conn
            .create_channel()
            .await
            .map_err(|e| QueueError::Connect(e.to_string()))?;
        crate::connection::declare(&channel, &self.config.queue).await?;

        // At most one unacknowledged delivery in flight per worker.
        channel
            .basic_qos(1, BasicQosOptions::default())
            .await
            .map_err(|e| QueueError::Connect(e.to_string()))?;

        let tag = format!("scrapeline-worker-{}", Uuid::new_v4());
        let consumer = channel
            .basic_consume(
                &self.config.queue,
                &tag,
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(|e| QueueError::Consume(e.to_string()))?;

        info!(queue = %self.config.queue, consumer_tag = %tag, "Consuming");

        Ok(Box::new(AmqpJobStream {
            _connection: conn,
            consumer,
        }))
    }
}

/// Wraps the lapin consumer; dropping the stream drops the connection and
/// with it the channel, which releases any unacked delivery back to the
/// broker.
struct AmqpJobStream {
    // Held so the connection outlives the consumer.
    _connection: Connection,
    consumer: lapin::Consumer,
}

#[async_trait]
impl JobStream for AmqpJobStream {
    async fn next_delivery(&mut self) -> Result<Option<Delivery>, QueueError> {
        match self.consumer.next().await {
            Some(Ok(delivery)) => Ok(Some(Delivery {
                payload: delivery.data,
                redelivered: delivery.redelivered,
                acker: Box::new(AmqpAcknowledger {
                    acker: delivery.acker,
                }),
            })),
            Some(Err(e)) => Err(QueueError::Consume(e.to_string())),
            None => Ok(None),
        }
    }
}

struct AmqpAcknowledger {
    acker: Acker,
}

#[async_trait]
impl Acknowledger for AmqpAcknowledger {
    async fn ack(self: Box<Self>) -> Result<(), QueueError> {
        self.acker
            .ack(BasicAckOptions::default())
            .await
            .map_err(|e| QueueError::Ack(e.to_string()))
    }

    async fn nack(self: Box<Self>, requeue: bool) -> Result<(), QueueError> {
        self.acker
            .nack(BasicNackOptions {
                requeue,
                ..Default::default()
            })
            .await
            .map_err(|e| QueueError::Ack(e.to_string()))
    }
}
