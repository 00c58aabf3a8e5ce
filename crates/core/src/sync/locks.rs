//! Per-account mutual exclusion for sync passes.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockMap = DashMap<String, Arc<Mutex<()>>>;

/// Registry handing out one async mutex per account id.
///
/// Entries live only while a pass holds or waits for them; the last guard
/// to drop removes its entry.
#[derive(Debug, Default, Clone)]
pub struct AccountLocks {
    locks: Arc<LockMap>,
}

/// Exclusive access to one account, released on drop
#[derive(Debug)]
pub struct AccountLockGuard {
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<LockMap>,
    account_id: String,
}

impl Drop for AccountLockGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Waiters hold their own clone of the mutex, so a count of one means
        // only the map still references it.
        self.locks.remove_if(&self.account_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}

impl AccountLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `account_id`.
    pub async fn acquire(&self, account_id: &str) -> AccountLockGuard {
        // Clone the Arc out so the DashMap shard lock is not held across the await.
        let lock = self.locks.entry(account_id.to_string()).or_default().clone();
        let guard = lock.lock_owned().await;
        AccountLockGuard {
            guard: Some(guard),
            locks: Arc::clone(&self.locks),
            account_id: account_id.to_string(),
        }
    }

    /// Number of accounts currently locked or waited on
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
