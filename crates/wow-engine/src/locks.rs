use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use wow_types::RowId;

/// Per-wish async locks.
///
/// Serializes donation-counter increments for one wish when the store cannot
/// do the read-modify-write atomically. Different wishes never contend.
#[derive(Default)]
pub struct WishLocks {
    locks: DashMap<RowId, Arc<Mutex<()>>>,
}

impl WishLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `wish_id`. Released when the guard drops.
    pub async fn lock(&self, wish_id: RowId) -> OwnedMutexGuard<()> {
        let lock = Arc::clone(self.locks.entry(wish_id).or_default().value());
        lock.lock_owned().await
    }

    /// Number of wishes that have ever been locked.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_wish_is_exclusive() {
        let locks = Arc::new(WishLocks::new());
        let guard = locks.lock(1).await;

        let contender = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _g = locks.lock(1).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn different_wishes_do_not_contend() {
        let locks = WishLocks::new();
        let _a = locks.lock(1).await;
        let _b = locks.lock(2).await;
        assert_eq!(locks.len(), 2);
    }
}
