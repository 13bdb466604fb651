// Central Error Type for the Application

use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("queue error: {0}")]
    Queue(#[from] crate::port::QueueError),

    #[error("fetch error: {0}")]
    Fetch(#[from] crate::port::FetchError),

    #[error("payload error: {0}")]
    Payload(#[from] crate::domain::PayloadError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
