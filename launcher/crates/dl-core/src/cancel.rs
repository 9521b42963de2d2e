use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

/// Cooperative cancellation for a single launch step or probe run.
///
/// Unlike a broadcast, the flag is sticky: a guard created after `cancel()`
/// observes the cancellation immediately.
#[derive(Clone)]
pub struct CancelSignal {
    cancel_tx: Arc<watch::Sender<bool>>,
}

impl CancelSignal {
    pub fn new() -> Self {
        let (cancel_tx, _) = watch::channel(false);
        Self {
            cancel_tx: Arc::new(cancel_tx),
        }
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        if !self.cancel_tx.send_replace(true) {
            debug!("Cancellation requested");
        }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel_tx.borrow()
    }

    pub fn guard(&self) -> CancelGuard {
        CancelGuard {
            cancel_rx: self.cancel_tx.subscribe(),
        }
    }
}

impl Default for CancelSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving side handed to workers.
pub struct CancelGuard {
    cancel_rx: watch::Receiver<bool>,
}

impl CancelGuard {
    /// Resolves once cancellation is requested.
    ///
    /// Never resolves if every `CancelSignal` is dropped without cancelling.
    pub async fn cancelled(&mut self) {
        if self.cancel_rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel_rx.borrow()
    }
}
