// Page Fetcher Port
// Abstraction over the browser automation engine

use async_trait::async_trait;
use thiserror::Error;

/// Fetch failures.
///
/// A settle timeout is not among them: adapters treat it as a soft
/// condition, log a warning and return whatever content is present at the
/// deadline.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("browser session error: {0}")]
    Session(String),

    #[error("navigation failed: {0}")]
    Navigation(String),
}

/// Renders a page in a sandboxed browser context and returns the document
/// text.
///
/// The call is synchronous from the worker's point of view: it blocks the
/// processing loop, and with prefetch 1 there is never more than one fetch
/// in flight per worker.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// Mock fetcher behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Always return the given document
        Success(String),
        /// Always fail with message
        Fail(String),
        /// Fail the first N calls, then return the given document
        FailThenSucceed { failures: u32, document: String },
    }

    /// Mock Page Fetcher for testing
    pub struct MockPageFetcher {
        behavior: MockBehavior,
        calls: Mutex<u32>,
    }

    impl MockPageFetcher {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior,
                calls: Mutex::new(0),
            }
        }

        pub fn new_success(document: impl Into<String>) -> Self {
            Self::new(MockBehavior::Success(document.into()))
        }

        pub fn new_fail(message: impl Into<String>) -> Self {
            Self::new(MockBehavior::Fail(message.into()))
        }

        pub fn call_count(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl PageFetcher for MockPageFetcher {
        async fn fetch(&self, _url: &str) -> Result<String, FetchError> {
            let call = {
                let mut calls = self.calls.lock().unwrap();
                *calls += 1;
                *calls
            };

            match &self.behavior {
                MockBehavior::Success(document) => Ok(document.clone()),
                MockBehavior::Fail(message) => Err(FetchError::Navigation(message.clone())),
                MockBehavior::FailThenSucceed { failures, document } => {
                    if call <= *failures {
                        Err(FetchError::Navigation(format!(
                            "transient fault on attempt {call}"
                        )))
                    } else {
                        Ok(document.clone())
                    }
                }
            }
        }
    }
}
