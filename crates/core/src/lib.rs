// Scrapeline Core - Domain Logic & Ports
// No infrastructure dependencies: the AMQP and browser clients live in the
// infra crates and plug in through the port traits.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod port;

pub use error::{AppError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
