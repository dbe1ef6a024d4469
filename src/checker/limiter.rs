// src/checker/limiter.rs
// =============================================================================
// Admission limiter: caps how many link checks are in flight at once.
//
// Backed by tokio's Semaphore, which hands out permits in FIFO order. A
// permit is held for the whole check of one link, backoff sleeps included,
// so a link waiting to retry still occupies its slot.
// =============================================================================

use std::sync::Arc;

use tokio::sync::{AcquireError, OwnedSemaphorePermit, Semaphore};

#[derive(Debug, Clone)]
pub struct AdmissionLimiter {
    permits: Arc<Semaphore>,
    capacity: usize,
}

impl AdmissionLimiter {
    // `capacity` must be at least 1; the CLI rejects 0.
    pub fn new(capacity: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // Waits for a free slot. The slot is released when the permit is dropped.
    pub async fn acquire(&self) -> Result<OwnedSemaphorePermit, AcquireError> {
        self.permits.clone().acquire_owned().await
    }
}
