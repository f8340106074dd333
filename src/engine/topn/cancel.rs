use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::engine::errors::{TopNError, TopNResult};

/// Cooperative cancellation flag shared between a caller and bucket workers.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Fails with `Cancelled` once [`cancel`](Self::cancel) has been called.
    pub fn check(&self, what: &str) -> TopNResult<()> {
        if self.is_cancelled() {
            Err(TopNError::Cancelled(what.to_string()))
        } else {
            Ok(())
        }
    }
}
