//! Ticket pools bounding concurrent downloads and saves.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use super::types::{JobError, PoolStatus};
use crate::metrics::TICKETS_IN_USE;

/// Tracks statistics for a ticket pool.
#[derive(Default)]
struct PoolStats {
    active: AtomicU64,
    queued: AtomicU64,
    total_processed: AtomicU64,
    total_failed: AtomicU64,
}

/// A fixed number of tickets; holding one admits a job into the pool.
#[derive(Clone)]
pub(crate) struct TicketPool {
    name: &'static str,
    capacity: usize,
    semaphore: Arc<Semaphore>,
    stats: Arc<PoolStats>,
}

impl TicketPool {
    pub fn new(name: &'static str, capacity: usize) -> Self {
        Self {
            name,
            capacity,
            semaphore: Arc::new(Semaphore::new(capacity)),
            stats: Arc::new(PoolStats::default()),
        }
    }

    /// Wait for a free ticket.
    pub async fn acquire(&self) -> Result<Ticket, JobError> {
        self.stats.queued.fetch_add(1, Ordering::Relaxed);
        let permit = Arc::clone(&self.semaphore).acquire_owned().await;
        self.stats.queued.fetch_sub(1, Ordering::Relaxed);

        let permit = permit.map_err(|_| JobError::PoolClosed)?;
        self.stats.active.fetch_add(1, Ordering::Relaxed);
        TICKETS_IN_USE.with_label_values(&[self.name]).inc();

        Ok(Ticket {
            _permit: permit,
            pool: self.clone(),
        })
    }

    pub fn record_outcome(&self, succeeded: bool) {
        let counter = if succeeded {
            &self.stats.total_processed
        } else {
            &self.stats.total_failed
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn status(&self) -> PoolStatus {
        PoolStatus {
            name: self.name.to_string(),
            active_jobs: self.stats.active.load(Ordering::Relaxed) as usize,
            max_concurrent: self.capacity,
            queued_jobs: self.stats.queued.load(Ordering::Relaxed) as usize,
            total_processed: self.stats.total_processed.load(Ordering::Relaxed),
            total_failed: self.stats.total_failed.load(Ordering::Relaxed),
        }
    }
}

/// A held ticket. Dropping it returns the ticket to its pool.
pub(crate) struct Ticket {
    _permit: OwnedSemaphorePermit,
    pool: TicketPool,
}

impl Drop for Ticket {
    fn drop(&mut self) {
        self.pool.stats.active.fetch_sub(1, Ordering::Relaxed);
        TICKETS_IN_USE.with_label_values(&[self.pool.name]).dec();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_tickets_are_bounded_and_returned() {
        let pool = TicketPool::new("test", 2);

        let a = pool.acquire().await.unwrap();
        let _b = pool.acquire().await.unwrap();
        assert_eq!(pool.status().active_jobs, 2);

        let waiter = {
            let pool = pool.clone();
            tokio::spawn(async move { pool.acquire().await.map(|_| ()) })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());
        assert_eq!(pool.status().queued_jobs, 1);

        drop(a);
        waiter.await.unwrap().unwrap();
        assert_eq!(pool.status().queued_jobs, 0);
        assert_eq!(pool.status().active_jobs, 1);
    }

    #[tokio::test]
    async fn test_ticket_released_on_panic() {
        let pool = TicketPool::new("test", 1);

        let held = pool.clone();
        let result = tokio::spawn(async move {
            let _ticket = held.acquire().await.unwrap();
            panic!("job blew up");
        })
        .await;
        assert!(result.unwrap_err().is_panic());

        assert_eq!(pool.status().active_jobs, 0);
        let _ticket = pool.acquire().await.unwrap();
    }

    #[test]
    fn test_outcomes_are_counted() {
        let pool = TicketPool::new("save", 3);
        pool.record_outcome(true);
        pool.record_outcome(true);
        pool.record_outcome(false);

        let status = pool.status();
        assert_eq!(status.name, "save");
        assert_eq!(status.max_concurrent, 3);
        assert_eq!(status.total_processed, 2);
        assert_eq!(status.total_failed, 1);
    }
}
