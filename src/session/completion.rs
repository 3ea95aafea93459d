//! One-shot completion signal for awaited interaction results
//!
//! Lets business logic turn an asynchronous control activation into a single
//! awaited value: the caller keeps the receiver, control callbacks hold
//! clones of the resolver. The first resolution wins; later ones are no-ops.

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::oneshot;

/// Clonable resolver half of a one-shot completion
pub struct Completion<T> {
    tx: Arc<Mutex<Option<oneshot::Sender<T>>>>,
}

impl<T> Clone for Completion<T> {
    fn clone(&self) -> Self {
        Self {
            tx: Arc::clone(&self.tx),
        }
    }
}

impl<T: Send + 'static> Completion<T> {
    /// Create a completion and the receiver the caller awaits
    pub fn channel() -> (Self, oneshot::Receiver<T>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                tx: Arc::new(Mutex::new(Some(tx))),
            },
            rx,
        )
    }

    /// Resolve with `value`; returns false if already resolved or abandoned
    pub fn resolve(&self, value: T) -> bool {
        match self.tx.lock().take() {
            Some(tx) => tx.send(value).is_ok(),
            None => false,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.tx.lock().is_none()
    }
}
