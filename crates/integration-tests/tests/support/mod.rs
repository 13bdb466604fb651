// In-memory stand-in for the external AMQP broker.
//
// Implements both queue ports with redelivery, unacked tracking and failure
// injection, so the pipeline can be exercised end to end without a broker
// process.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use scrapeline_core::domain::Job;
use scrapeline_core::port::{
    Acknowledger, Delivery, JobQueue, JobStream, QueueConnector, QueueError,
};

#[derive(Clone)]
struct Message {
    payload: Vec<u8>,
    redelivered: bool,
}

#[derive(Default)]
struct BrokerState {
    unreachable: bool,
    /// Next N subscribe calls fail before one succeeds.
    subscribe_failures: u32,
    /// Per-subscribe delivery budgets; a stream whose budget runs out ends,
    /// simulating connection loss. Empty queue = unlimited streams.
    stream_limits: VecDeque<usize>,
    ready: VecDeque<Message>,
    unacked: usize,
    max_unacked: usize,
    redelivered_deliveries: usize,
    acked: Vec<Vec<u8>>,
    discarded: Vec<Vec<u8>>,
    published: usize,
}

pub struct InMemoryBroker {
    state: Arc<Mutex<BrokerState>>,
}

impl InMemoryBroker {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Arc::new(Mutex::new(BrokerState::default())),
        })
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.state.lock().unwrap().unreachable = !reachable;
    }

    pub fn fail_next_subscribes(&self, count: u32) {
        self.state.lock().unwrap().subscribe_failures = count;
    }

    pub fn limit_next_stream(&self, deliveries: usize) {
        self.state.lock().unwrap().stream_limits.push_back(deliveries);
    }

    /// Enqueue arbitrary bytes, bypassing job encoding (poison injection).
    pub fn push_raw(&self, payload: &[u8]) {
        self.state.lock().unwrap().ready.push_back(Message {
            payload: payload.to_vec(),
            redelivered: false,
        });
    }

    pub fn queue_len(&self) -> usize {
        self.state.lock().unwrap().ready.len()
    }

    /// Payloads currently waiting in the queue, in delivery order.
    pub fn ready_payloads(&self) -> Vec<Vec<u8>> {
        self.state
            .lock()
            .unwrap()
            .ready
            .iter()
            .map(|m| m.payload.clone())
            .collect()
    }

    /// No messages waiting and none in flight.
    pub fn is_idle(&self) -> bool {
        let state = self.state.lock().unwrap();
        state.ready.is_empty() && state.unacked == 0
    }

    pub fn published_count(&self) -> usize {
        self.state.lock().unwrap().published
    }

    pub fn acked_count(&self) -> usize {
        self.state.lock().unwrap().acked.len()
    }

    pub fn discarded(&self) -> Vec<Vec<u8>> {
        self.state.lock().unwrap().discarded.clone()
    }

    /// Highest number of simultaneously unacked deliveries ever observed.
    pub fn max_unacked(&self) -> usize {
        self.state.lock().unwrap().max_unacked
    }

    /// How many deliveries carried the redelivered flag.
    pub fn redelivered_deliveries(&self) -> usize {
        self.state.lock().unwrap().redelivered_deliveries
    }
}

#[async_trait]
impl JobQueue for InMemoryBroker {
    async fn publish(&self, job: &Job) -> Result<(), QueueError> {
        let payload = job
            .to_payload()
            .map_err(|e| QueueError::Encode(e.to_string()))?;
        let mut state = self.state.lock().unwrap();
        if state.unreachable {
            return Err(QueueError::Connect("broker offline".to_string()));
        }
        state.ready.push_back(Message {
            payload,
            redelivered: false,
        });
        state.published += 1;
        Ok(())
    }

    async fn ping(&self) -> Result<(), QueueError> {
        if self.state.lock().unwrap().unreachable {
            Err(QueueError::Connect("broker offline".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl QueueConnector for InMemoryBroker {
    async fn subscribe(&self) -> Result<Box<dyn JobStream>, QueueError> {
        let mut state = self.state.lock().unwrap();
        if state.unreachable {
            return Err(QueueError::Connect("broker offline".to_string()));
        }
        if state.subscribe_failures > 0 {
            state.subscribe_failures -= 1;
            return Err(QueueError::Connect("broker offline".to_string()));
        }
        let remaining = state.stream_limits.pop_front();
        Ok(Box::new(InMemoryStream {
            state: self.state.clone(),
            remaining,
        }))
    }
}

struct InMemoryStream {
    state: Arc<Mutex<BrokerState>>,
    /// Deliveries left before this stream simulates connection loss.
    remaining: Option<usize>,
}

#[async_trait]
impl JobStream for InMemoryStream {
    async fn next_delivery(&mut self) -> Result<Option<Delivery>, QueueError> {
        loop {
            {
                let mut state = self.state.lock().unwrap();
                if self.remaining == Some(0) || state.unreachable {
                    return Ok(None);
                }
                if let Some(message) = state.ready.pop_front() {
                    state.unacked += 1;
                    state.max_unacked = state.max_unacked.max(state.unacked);
                    if message.redelivered {
                        state.redelivered_deliveries += 1;
                    }
                    if let Some(remaining) = self.remaining.as_mut() {
                        *remaining -= 1;
                    }
                    return Ok(Some(Delivery {
                        payload: message.payload.clone(),
                        redelivered: message.redelivered,
                        acker: Box::new(InMemoryAcker {
                            state: self.state.clone(),
                            payload: message.payload,
                        }),
                    }));
                }
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    }
}

struct InMemoryAcker {
    state: Arc<Mutex<BrokerState>>,
    payload: Vec<u8>,
}

#[async_trait]
impl Acknowledger for InMemoryAcker {
    async fn ack(self: Box<Self>) -> Result<(), QueueError> {
        let mut state = self.state.lock().unwrap();
        state.unacked -= 1;
        state.acked.push(self.payload);
        Ok(())
    }

    async fn nack(self: Box<Self>, requeue: bool) -> Result<(), QueueError> {
        let mut state = self.state.lock().unwrap();
        state.unacked -= 1;
        if requeue {
            state.ready.push_back(Message {
                payload: self.payload,
                redelivered: true,
            });
        } else {
            state.discarded.push(self.payload);
        }
        Ok(())
    }
}

/// Poll until `condition` holds, panicking after five seconds.
pub async fn wait_until(condition: impl Fn() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not met within 5s"
        );
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
}
