use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::error::{AppError, AppResult};

/// Caps the number of outbound requests in flight at once
///
/// Shared by every provider clone; a permit is held for the duration of one
/// HTTP exchange.
#[derive(Clone, Debug)]
pub struct RequestLimiter {
    permits: Arc<Semaphore>,
}

impl RequestLimiter {
    pub fn new(capacity: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(capacity.max(1))),
        }
    }

    /// Waits for a free slot
    pub async fn acquire(&self) -> AppResult<OwnedSemaphorePermit> {
        self.permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| AppError::Internal(format!("Request limiter closed: {}", e)))
    }

    #[cfg(test)]
    fn available(&self) -> usize {
        self.permits.available_permits()
    }
}
