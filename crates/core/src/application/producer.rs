// Submit Use Case

use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info};
use url::Url;

use crate::domain::Job;
use crate::port::{JobQueue, QueueError};

/// Confirmation returned for an accepted submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accepted {
    pub url: String,
}

/// Rejection reasons surfaced to the submitter.
#[derive(Error, Debug)]
pub enum SubmitError {
    /// The URL is not an absolute http(s) URL on the target domain.
    #[error("url does not belong to {domain}: {url}")]
    InvalidDomain { url: String, domain: String },

    /// The broker could not be reached or refused the publish.
    #[error("queue unavailable")]
    QueueUnavailable(#[source] QueueError),
}

/// Validates submissions and publishes them as durable jobs.
///
/// Validation failures never touch the queue; publish failures surface
/// immediately without internal retries - the caller decides what the
/// submitter sees.
pub struct Producer {
    queue: Arc<dyn JobQueue>,
    allowed_domain: String,
}

impl Producer {
    pub fn new(queue: Arc<dyn JobQueue>, allowed_domain: impl Into<String>) -> Self {
        Self {
            queue,
            allowed_domain: allowed_domain.into().to_ascii_lowercase(),
        }
    }

    /// Validate a submitted URL and enqueue it.
    ///
    /// Exactly one durable message is published per successful call. There
    /// is no deduplication: resubmitting the same URL enqueues a second
    /// job.
    pub async fn submit(&self, url: &str) -> Result<Accepted, SubmitError> {
        if !self.is_allowed(url) {
            info!(url = %url, domain = %self.allowed_domain, "Rejected submission for foreign domain");
            return Err(SubmitError::InvalidDomain {
                url: url.to_string(),
                domain: self.allowed_domain.clone(),
            });
        }

        let job = Job::new(url);
        self.queue.publish(&job).await.map_err(|e| {
            error!(url = %url, error = %e, "Publish failed");
            SubmitError::QueueUnavailable(e)
        })?;

        info!(url = %url, "Job queued");
        Ok(Accepted {
            url: url.to_string(),
        })
    }

    /// Health probe: open and close a broker connection.
    pub async fn ping(&self) -> Result<(), QueueError> {
        self.queue.ping().await
    }

    /// Absolute http(s) URL whose host is the target domain or one of its
    /// subdomains, case-insensitive.
    fn is_allowed(&self, url: &str) -> bool {
        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(_) => return false,
        };
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return false;
        }
        let host = match parsed.host_str() {
            Some(host) => host.to_ascii_lowercase(),
            None => return false,
        };
        host == self.allowed_domain || host.ends_with(&format!(".{}", self.allowed_domain))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::job_queue::mocks::MockJobQueue;

    fn producer(queue: Arc<MockJobQueue>) -> Producer {
        Producer::new(queue, "avito.ru")
    }

    #[tokio::test]
    async fn valid_submission_publishes_exactly_one_job() {
        let queue = Arc::new(MockJobQueue::new_reachable());
        let producer = producer(queue.clone());

        let accepted = producer
            .submit("https://www.avito.ru/items/123")
            .await
            .unwrap();
        assert_eq!(accepted.url, "https://www.avito.ru/items/123");

        let published = queue.published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].url, "https://www.avito.ru/items/123");
    }

    #[tokio::test]
    async fn published_payload_round_trips() {
        let queue = Arc::new(MockJobQueue::new_reachable());
        let producer = producer(queue.clone());

        producer
            .submit("https://www.avito.ru/items/123")
            .await
            .unwrap();

        let payload = queue.published()[0].to_payload().unwrap();
        let decoded = Job::from_payload(&payload).unwrap();
        assert_eq!(decoded.url, "https://www.avito.ru/items/123");
    }

    #[tokio::test]
    async fn foreign_domain_is_rejected_without_queue_interaction() {
        let queue = Arc::new(MockJobQueue::new_reachable());
        let producer = producer(queue.clone());

        let err = producer.submit("https://example.com/page").await.unwrap_err();
        assert!(matches!(err, SubmitError::InvalidDomain { .. }));
        assert!(queue.published().is_empty());
    }

    #[tokio::test]
    async fn unreachable_broker_surfaces_queue_unavailable() {
        let queue = Arc::new(MockJobQueue::new_unreachable());
        let producer = producer(queue.clone());

        let err = producer
            .submit("https://www.avito.ru/items/123")
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::QueueUnavailable(_)));
        assert!(queue.published().is_empty());
    }

    #[tokio::test]
    async fn resubmission_enqueues_a_second_job() {
        let queue = Arc::new(MockJobQueue::new_reachable());
        let producer = producer(queue.clone());

        producer.submit("https://avito.ru/a").await.unwrap();
        producer.submit("https://avito.ru/a").await.unwrap();
        assert_eq!(queue.published().len(), 2);
    }

    #[tokio::test]
    async fn domain_check_edge_cases() {
        let queue = Arc::new(MockJobQueue::new_reachable());
        let producer = producer(queue.clone());

        // Apex domain and subdomains pass, case-insensitively.
        assert!(producer.submit("https://avito.ru/x").await.is_ok());
        assert!(producer.submit("https://M.AVITO.RU/x").await.is_ok());

        // Lookalike host: the allowed domain appears as a substring but is
        // not a suffix of the host.
        assert!(producer
            .submit("https://avito.ru.evil.example/x")
            .await
            .is_err());
        // Suffix without a dot boundary.
        assert!(producer.submit("https://notavito.ru/x").await.is_err());
        // Not an absolute URL.
        assert!(producer.submit("avito.ru/items/123").await.is_err());
        // Wrong scheme.
        assert!(producer.submit("ftp://avito.ru/items/123").await.is_err());
    }

    #[tokio::test]
    async fn ping_reflects_broker_reachability() {
        let up = producer(Arc::new(MockJobQueue::new_reachable()));
        assert!(up.ping().await.is_ok());

        let down = producer(Arc::new(MockJobQueue::new_unreachable()));
        assert!(down.ping().await.is_err());
    }
}
