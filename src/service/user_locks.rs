// ABOUTME: One async mutex per user so operations on the same clone never overlap

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

#[derive(Debug, Default, Clone)]
pub struct UserLocks {
    locks: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries nobody holds or waits on are pruned here, so the map tracks active users only.
    fn lock_for(&self, user: &str) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        Arc::clone(locks.entry(user.to_string()).or_default())
    }

    #[cfg(test)]
    fn tracked_users(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Waits for the user's lock. Dropping the guard releases it.
    pub async fn acquire(&self, user: &str) -> OwnedMutexGuard<()> {
        self.lock_for(user).lock_owned().await
    }
}
