use super::TraversalError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation shared between a traversal and its owner.
///
/// Checked between stages and while walking directories. An in-flight clone or
/// publish is never interrupted; the check after it returns observes the flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn check(&self) -> Result<(), TraversalError> {
        if self.is_cancelled() {
            Err(TraversalError::Cancelled)
        } else {
            Ok(())
        }
    }
}
