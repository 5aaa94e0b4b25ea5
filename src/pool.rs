//! Bounded worker pool shared across operations.
//!
//! Workers run as tokio tasks; the pool only bounds how many may be in flight.
//! An operation reserves one slot per backend path up front and the slots are
//! returned when the last of its workers exits, even if that happens long
//! after the caller got its answer.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::config::PoolExhaustion;
use crate::error::PoolExhausted;

/// A fixed number of worker slots, cheap to clone and share.
///
/// # Examples
///
/// ```rust
/// use status_race::WorkerPool;
///
/// let pool = WorkerPool::new(4);
/// let shared = pool.clone();
/// assert_eq!(shared.size(), 4);
/// assert_eq!(shared.available(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct WorkerPool {
    slots: Arc<Semaphore>,
    size: usize,
}

/// Slots held by one operation's workers.
///
/// Shared between the workers through an `Arc`; dropping the last clone frees
/// the slots.
#[derive(Debug)]
pub struct Reservation {
    _permit: OwnedSemaphorePermit,
    slots: usize,
}

impl Reservation {
    /// Number of slots held.
    pub fn slots(&self) -> usize {
        self.slots
    }
}

impl WorkerPool {
    /// Create a pool with `size` slots.
    ///
    /// # Panics
    ///
    /// Panics if `size` exceeds [`ConfigError::MAX_POOL_SIZE`]. Handler
    /// constructors check this before building a pool.
    ///
    /// [`ConfigError::MAX_POOL_SIZE`]: crate::ConfigError::MAX_POOL_SIZE
    pub fn new(size: usize) -> Self {
        Self {
            slots: Arc::new(Semaphore::new(size)),
            size,
        }
    }

    /// Total number of slots.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Slots not currently reserved.
    pub fn available(&self) -> usize {
        self.slots.available_permits()
    }

    /// Reserve `slots` slots as a single unit.
    ///
    /// All slots are taken at once so two operations can never each hold half
    /// of what they need. With [`PoolExhaustion::Wait`] this suspends until
    /// enough slots are free; with [`PoolExhaustion::Reject`] it fails fast.
    pub async fn reserve(
        &self,
        slots: usize,
        policy: PoolExhaustion,
    ) -> Result<Reservation, PoolExhausted> {
        let exhausted = PoolExhausted {
            requested: slots,
            available: self.available(),
        };
        let count = u32::try_from(slots).map_err(|_| exhausted)?;

        let permit = match policy {
            PoolExhaustion::Wait => Arc::clone(&self.slots)
                .acquire_many_owned(count)
                .await
                .map_err(|_| exhausted)?,
            PoolExhaustion::Reject => Arc::clone(&self.slots)
                .try_acquire_many_owned(count)
                .map_err(|_| exhausted)?,
        };

        Ok(Reservation {
            _permit: permit,
            slots,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_reservation_returns_slots_on_drop() {
        let pool = WorkerPool::new(4);
        let reservation = pool.reserve(2, PoolExhaustion::Wait).await.unwrap();
        assert_eq!(reservation.slots(), 2);
        assert_eq!(pool.available(), 2);

        let shared = Arc::new(reservation);
        let clone = Arc::clone(&shared);
        drop(shared);
        assert_eq!(pool.available(), 2);
        drop(clone);
        assert_eq!(pool.available(), 4);
    }

    #[tokio::test]
    async fn test_reject_when_exhausted() {
        let pool = WorkerPool::new(3);
        let _held = pool.reserve(2, PoolExhaustion::Reject).await.unwrap();

        let err = pool.reserve(2, PoolExhaustion::Reject).await.unwrap_err();
        assert_eq!(
            err,
            PoolExhausted {
                requested: 2,
                available: 1
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_blocks_until_released() {
        let pool = WorkerPool::new(2);
        let held = pool.reserve(2, PoolExhaustion::Wait).await.unwrap();

        let waiter = {
            let pool = pool.clone();
            tokio::spawn(async move { pool.reserve(2, PoolExhaustion::Wait).await })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!waiter.is_finished());

        drop(held);
        let second = waiter.await.unwrap().unwrap();
        assert_eq!(second.slots(), 2);
    }
}
