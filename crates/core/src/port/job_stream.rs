// Queue Consumer Port
// Abstraction over the broker's delivery stream

use async_trait::async_trait;

use super::job_queue::QueueError;

/// One broker-to-consumer handoff of a queued message.
///
/// The acknowledger is consumed by `ack`/`nack`, so a delivery is settled
/// at most once by construction.
pub struct Delivery {
    pub payload: Vec<u8>,
    /// Set when the broker already attempted this delivery and got no
    /// acknowledgment.
    pub redelivered: bool,
    pub acker: Box<dyn Acknowledger>,
}

/// Settles a single in-flight delivery.
#[async_trait]
pub trait Acknowledger: Send {
    /// Positive acknowledgment: the broker removes the message.
    async fn ack(self: Box<Self>) -> Result<(), QueueError>;

    /// Negative acknowledgment. `requeue = true` asks the broker to
    /// redeliver later; `false` discards the message permanently.
    async fn nack(self: Box<Self>, requeue: bool) -> Result<(), QueueError>;
}

/// An established subscription delivering one job at a time.
#[async_trait]
pub trait JobStream: Send {
    /// Await the next delivery.
    ///
    /// `Ok(None)` means the stream ended (connection or channel closed);
    /// the caller is expected to resubscribe.
    async fn next_delivery(&mut self) -> Result<Option<Delivery>, QueueError>;
}

/// Consumer-side queue port: establishes subscriptions.
///
/// Implementations declare the durable queue idempotently and set the
/// prefetch limit to 1 before consuming, so a worker never holds more than
/// one unacknowledged delivery.
#[async_trait]
pub trait QueueConnector: Send + Sync {
    async fn subscribe(&self) -> Result<Box<dyn JobStream>, QueueError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Recorded settlement of one delivery.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Settlement {
        Ack,
        Nack { requeue: bool },
    }

    /// Acknowledger that records how its delivery was settled.
    pub struct RecordingAcker {
        log: Arc<Mutex<Vec<Settlement>>>,
    }

    impl RecordingAcker {
        pub fn new(log: Arc<Mutex<Vec<Settlement>>>) -> Self {
            Self { log }
        }
    }

    #[async_trait]
    impl Acknowledger for RecordingAcker {
        async fn ack(self: Box<Self>) -> Result<(), QueueError> {
            self.log.lock().unwrap().push(Settlement::Ack);
            Ok(())
        }

        async fn nack(self: Box<Self>, requeue: bool) -> Result<(), QueueError> {
            self.log.lock().unwrap().push(Settlement::Nack { requeue });
            Ok(())
        }
    }

    /// Stream serving a fixed script of deliveries, then ending.
    pub struct ScriptedJobStream {
        deliveries: VecDeque<Delivery>,
    }

    impl ScriptedJobStream {
        pub fn new(deliveries: Vec<Delivery>) -> Self {
            Self {
                deliveries: deliveries.into(),
            }
        }
    }

    #[async_trait]
    impl JobStream for ScriptedJobStream {
        async fn next_delivery(&mut self) -> Result<Option<Delivery>, QueueError> {
            Ok(self.deliveries.pop_front())
        }
    }
}
