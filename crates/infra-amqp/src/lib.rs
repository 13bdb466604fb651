// AMQP Infrastructure - lapin adapters for the queue ports
// Driver errors are converted to core QueueError variants at this boundary;
// lapin types never cross into core.

mod connection;
mod consumer;
mod publisher;

pub use consumer::AmqpQueueConnector;
pub use publisher::AmqpJobQueue;
