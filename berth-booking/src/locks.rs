use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use berth_core::CruiseNumber;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Held for the duration of one cruise's read-decide-append.
pub type CruiseGuard = OwnedMutexGuard<()>;

/// One fair (FIFO) async mutex per cruise.
///
/// The outer std mutex only guards the map lookup and is never held across an await,
/// so bookings for different cruises never wait on each other.
#[derive(Default)]
pub struct CruiseLocks {
    locks: Mutex<HashMap<CruiseNumber, Arc<AsyncMutex<()>>>>,
}

impl CruiseLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `cruise_number`. Dropping the future before it
    /// resolves leaves no trace.
    pub async fn acquire(&self, cruise_number: CruiseNumber) -> CruiseGuard {
        self.lock_for(cruise_number).lock_owned().await
    }

    pub fn len(&self) -> usize {
        self.table().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock_for(&self, cruise_number: CruiseNumber) -> Arc<AsyncMutex<()>> {
        self.table()
            .entry(cruise_number)
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    fn table(&self) -> std::sync::MutexGuard<'_, HashMap<CruiseNumber, Arc<AsyncMutex<()>>>> {
        // The map holds no invariant a panicking holder could break.
        self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_same_cruise_is_exclusive() {
        let locks = CruiseLocks::new();
        let guard = locks.acquire(1).await;

        let blocked = timeout(Duration::from_millis(20), locks.acquire(1)).await;
        assert!(blocked.is_err());

        drop(guard);
        let reacquired = timeout(Duration::from_millis(20), locks.acquire(1)).await;
        assert!(reacquired.is_ok());
    }

    #[tokio::test]
    async fn test_different_cruises_are_independent() {
        let locks = CruiseLocks::new();
        let _first = locks.acquire(1).await;

        let other = timeout(Duration::from_millis(20), locks.acquire(2)).await;
        assert!(other.is_ok());
        assert_eq!(locks.len(), 2);
    }
}
