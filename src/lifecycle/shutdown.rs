//! Stop flag shared by the listeners and the reload loop.
//!
//! # Design Decisions
//! - Backed by a `watch` channel holding a single bool, so a task that starts
//!   waiting after the trigger still sees it
//! - Triggering is idempotent; dropping every handle also releases waiters

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;

/// Cloneable handle to the process stop flag.
#[derive(Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Raise the flag. Later calls are no-ops.
    pub fn trigger(&self) {
        let raised = self.tx.send_if_modified(|stopped| !std::mem::replace(stopped, true));
        if raised {
            tracing::info!("Shutdown triggered");
        }
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Future that resolves once the flag is raised.
    ///
    /// Owns its receiver, so it can be handed to `with_graceful_shutdown`
    /// or moved into a spawned task.
    pub fn wait(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut rx = self.tx.subscribe();
        async move {
            let _ = rx.wait_for(|stopped| *stopped).await;
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
