// Consume-loop interrupt plumbing

use tokio::sync::watch;

/// Receiving half of the interrupt signal.
///
/// Cloneable so every worker task can watch the same signal. Once set, the
/// signal never clears: a worker that observes it stops accepting
/// deliveries and closes its subscription.
#[derive(Clone)]
pub struct ShutdownToken {
    rx: watch::Receiver<bool>,
}

impl ShutdownToken {
    /// True once shutdown has been requested.
    pub fn is_shutdown(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve when shutdown is requested (or the sender is dropped).
    pub async fn wait(&mut self) {
        let _ = self.rx.changed().await;
    }
}

/// Sending half, held by the process entry point.
pub struct ShutdownSender {
    tx: watch::Sender<bool>,
}

impl ShutdownSender {
    /// Ask every watching worker to stop after its current delivery.
    pub fn shutdown(&self) {
        let _ = self.tx.send(true);
    }
}

pub fn shutdown_channel() -> (ShutdownSender, ShutdownToken) {
    let (tx, rx) = watch::channel(false);
    (ShutdownSender { tx }, ShutdownToken { rx })
}
