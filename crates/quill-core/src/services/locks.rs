use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Entries are pruned once the table grows past this many keys.
const PRUNE_THRESHOLD: usize = 1024;

/// One async mutex per key, created on demand.
///
/// Holders of different keys never contend.
#[derive(Default)]
pub(crate) struct KeyedLocks {
    table: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl KeyedLocks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `key`.
    pub(crate) async fn lock(&self, key: &str) -> OwnedMutexGuard<()> {
        let slot = {
            // The std mutex is held only for map bookkeeping, never across an await.
            let mut table = self.table.lock().unwrap_or_else(|e| e.into_inner());
            if table.len() >= PRUNE_THRESHOLD {
                // Count of one means only the table references it: no holder, no waiter.
                table.retain(|_, slot| Arc::strong_count(slot) > 1);
            }
            table.entry(key.to_string()).or_default().clone()
        };
        slot.lock_owned().await
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.table.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_key_is_exclusive() {
        let locks = Arc::new(KeyedLocks::new());
        let guard = locks.lock("a").await;

        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _g = locks.lock("a").await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn test_different_keys_do_not_block() {
        let locks = KeyedLocks::new();
        let _a = locks.lock("a").await;
        let _b = locks.lock("b").await;
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn test_idle_entries_are_pruned() {
        let locks = KeyedLocks::new();
        for i in 0..PRUNE_THRESHOLD {
            let _g = locks.lock(&format!("k{i}")).await;
        }
        let _g = locks.lock("fresh").await;
        assert_eq!(locks.len(), 1);
    }
}
