// Consumer Worker - dequeue/process/acknowledge loop

mod shutdown;

pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};

use std::collections::HashMap;
use std::sync::Arc;

use tokio::time::sleep;
use tracing::{error, info, trace, warn};

use crate::application::reconnect::ReconnectPolicy;
use crate::config::WorkerConfig;
use crate::domain::Job;
use crate::error::{AppError, Result};
use crate::port::{Delivery, JobStream, PageFetcher, QueueConnector, QueueError};

/// Why the drain loop handed control back.
#[derive(Debug, PartialEq, Eq)]
enum DrainExit {
    /// Stream or channel died; reconnect.
    ConnectionLost,
    /// Shutdown was signalled; stop consuming.
    Shutdown,
}

/// Worker: owns one connection and processes one delivery at a time.
///
/// The whole loop runs on a single task. The delivery wait, the fetch and
/// the acknowledgment happen sequentially on that task, so at most one
/// delivery is ever in flight per worker.
///
/// Multiple workers may run against the same queue; the broker's
/// per-message single-delivery guarantee is the only coordination between
/// them.
pub struct Worker {
    connector: Arc<dyn QueueConnector>,
    fetcher: Arc<dyn PageFetcher>,
    reconnect: ReconnectPolicy,
    redelivery_cap: Option<u32>,
}

impl Worker {
    pub fn new(
        connector: Arc<dyn QueueConnector>,
        fetcher: Arc<dyn PageFetcher>,
        config: WorkerConfig,
    ) -> Self {
        Self {
            connector,
            fetcher,
            reconnect: config.reconnect,
            redelivery_cap: config.redelivery_cap,
        }
    }

    /// Run until shutdown or, for a bounded reconnect policy, until the
    /// attempt budget is exhausted.
    pub async fn run(&self, mut shutdown: ShutdownToken) -> Result<()> {
        info!("Worker started");
        let mut attempt: u32 = 0;
        loop {
            if shutdown.is_shutdown() {
                break;
            }

            match self.connector.subscribe().await {
                Ok(stream) => {
                    info!("Subscribed, waiting for jobs");
                    attempt = 0;
                    match self.drain(stream, &mut shutdown).await {
                        DrainExit::Shutdown => break,
                        DrainExit::ConnectionLost => warn!("Connection lost"),
                    }
                }
                Err(e) => {
                    error!(error = %e, "Could not subscribe to queue");
                }
            }

            let delay = match self.reconnect.delay(attempt) {
                Some(delay) => delay,
                None => {
                    error!(attempts = attempt, "Reconnect attempt budget exhausted");
                    return Err(AppError::Internal(
                        "reconnect attempt budget exhausted".to_string(),
                    ));
                }
            };
            attempt += 1;
            info!(delay_secs = delay.as_secs_f64(), "Retrying connection");
            tokio::select! {
                _ = sleep(delay) => {}
                _ = shutdown.wait() => {
                    info!("Worker interrupted during reconnect wait");
                    break;
                }
            }
        }
        info!("Worker stopped");
        Ok(())
    }

    /// Consume deliveries until the stream dies or shutdown is signalled.
    async fn drain(&self, mut stream: Box<dyn JobStream>, shutdown: &mut ShutdownToken) -> DrainExit {
        // Per-process failure counts, only maintained when a redelivery cap
        // is configured.
        let mut fetch_failures: HashMap<String, u32> = HashMap::new();

        loop {
            let next = tokio::select! {
                next = stream.next_delivery() => next,
                _ = shutdown.wait() => {
                    info!("Shutdown signalled, closing subscription");
                    return DrainExit::Shutdown;
                }
            };

            match next {
                Ok(Some(delivery)) => {
                    if let Err(e) = self.process(delivery, &mut fetch_failures).await {
                        // The settlement never reached the broker, so the
                        // job will be redelivered; the channel state is
                        // unknown, start over.
                        error!(error = %e, "Acknowledgment failed, resubscribing");
                        return DrainExit::ConnectionLost;
                    }
                }
                Ok(None) => {
                    warn!("Delivery stream ended");
                    return DrainExit::ConnectionLost;
                }
                Err(e) => {
                    error!(error = %e, "Delivery stream error");
                    return DrainExit::ConnectionLost;
                }
            }
        }
    }

    /// Handle one delivery: decode, fetch, settle.
    ///
    /// Every path settles the delivery exactly once. Returns an error only
    /// when the settlement itself could not reach the broker.
    async fn process(
        &self,
        delivery: Delivery,
        fetch_failures: &mut HashMap<String, u32>,
    ) -> std::result::Result<(), QueueError> {
        let Delivery {
            payload,
            redelivered,
            acker,
        } = delivery;

        let job = match Job::from_payload(&payload) {
            Ok(job) => job,
            Err(e) => {
                // Poison: the payload can never become valid, so requeueing
                // would only loop it forever.
                error!(error = %e, "Discarding unprocessable payload");
                return acker.nack(false).await;
            }
        };

        info!(url = %job.url, redelivered = redelivered, "Processing scrape job");

        match self.fetcher.fetch(&job.url).await {
            Ok(document) => {
                info!(url = %job.url, bytes = document.len(), "Page captured");
                trace!(url = %job.url, document = %document, "Captured document");
                if self.redelivery_cap.is_some() {
                    fetch_failures.remove(&job.url);
                }
                acker.ack().await?;
                info!(url = %job.url, "Job done");
                Ok(())
            }
            Err(e) => {
                let discard = match self.redelivery_cap {
                    Some(cap) => {
                        let failures = fetch_failures.entry(job.url.clone()).or_insert(0);
                        *failures += 1;
                        *failures >= cap
                    }
                    None => false,
                };

                if discard {
                    error!(url = %job.url, error = %e, "Fetch failed, redelivery cap reached, discarding job");
                    acker.nack(false).await
                } else {
                    error!(url = %job.url, error = %e, "Fetch failed, requeueing job");
                    acker.nack(true).await
                }
            }
        }
    }
}
