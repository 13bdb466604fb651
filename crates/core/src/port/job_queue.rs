// Job Queue Port (producer side)
// Abstraction over the durable broker's publish path

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::Job;

/// Errors crossing the queue boundary.
///
/// Adapters convert driver errors into these variants carrying message
/// strings, so core stays free of broker client types.
#[derive(Error, Debug)]
pub enum QueueError {
    #[error("broker connection failed: {0}")]
    Connect(String),

    #[error("queue declare failed: {0}")]
    Declare(String),

    #[error("publish failed: {0}")]
    Publish(String),

    #[error("consume failed: {0}")]
    Consume(String),

    #[error("acknowledgment failed: {0}")]
    Ack(String),

    #[error("job payload could not be encoded: {0}")]
    Encode(String),
}

/// Producer-side queue port.
///
/// Implementations:
/// - AmqpJobQueue: publishes to a named durable AMQP queue
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Publish one job as a durable message.
    ///
    /// Exactly one message is enqueued per successful call, and the message
    /// must survive a broker restart.
    ///
    /// # Errors
    /// - QueueError::Connect if the broker is unreachable
    /// - QueueError::Publish if the broker refused the message
    async fn publish(&self, job: &Job) -> Result<(), QueueError>;

    /// Open and immediately close a connection.
    ///
    /// Used by the health probe only; not part of the job flow.
    async fn ping(&self) -> Result<(), QueueError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Recording queue mock.
    pub struct MockJobQueue {
        reachable: bool,
        published: Arc<Mutex<Vec<Job>>>,
    }

    impl MockJobQueue {
        pub fn new_reachable() -> Self {
            Self {
                reachable: true,
                published: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn new_unreachable() -> Self {
            Self {
                reachable: false,
                published: Arc::new(Mutex::new(Vec::new())),
            }
        }

        /// Jobs published so far, in order.
        pub fn published(&self) -> Vec<Job> {
            self.published.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl JobQueue for MockJobQueue {
        async fn publish(&self, job: &Job) -> Result<(), QueueError> {
            if !self.reachable {
                return Err(QueueError::Connect("mock broker offline".to_string()));
            }
            self.published.lock().unwrap().push(job.clone());
            Ok(())
        }

        async fn ping(&self) -> Result<(), QueueError> {
            if self.reachable {
                Ok(())
            } else {
                Err(QueueError::Connect("mock broker offline".to_string()))
            }
        }
    }
}
