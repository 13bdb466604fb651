// Application Layer - Use Cases

pub mod producer;
pub mod reconnect;
pub mod worker;

// Re-exports
pub use producer::{Accepted, Producer, SubmitError};
pub use reconnect::ReconnectPolicy;
pub use worker::{shutdown_channel, ShutdownSender, ShutdownToken, Worker};
