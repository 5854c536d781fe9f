//! Per-key async locks
//!
//! Writes and persistent reads of the same storage key run one at a time;
//! different keys never wait on each other. Entries are dropped from the
//! table as soon as nobody holds or waits for them.

use bridge_traits::StorageKey;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type LockTable = HashMap<StorageKey, Arc<AsyncMutex<()>>>;

#[derive(Clone, Default)]
pub struct KeyLocks {
    table: Arc<Mutex<LockTable>>,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self) -> MutexGuard<'_, LockTable> {
        self.table
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Wait for exclusive access to `key`.
    ///
    /// Dropping the returned future before it resolves still releases the
    /// key's table entry.
    pub async fn lock(&self, key: &StorageKey) -> KeyGuard {
        let slot = Slot {
            table: Arc::clone(&self.table),
            key: key.clone(),
        };
        let mutex = Arc::clone(self.table().entry(key.clone()).or_default());
        let guard = mutex.lock_owned().await;

        KeyGuard { _guard: guard, _slot: slot }
    }

    /// Number of keys currently held or waited on.
    pub fn active(&self) -> usize {
        self.table().len()
    }
}

/// Exclusive access to one key, released on drop.
pub struct KeyGuard {
    // Field order matters: the mutex is released before the slot is checked.
    _guard: OwnedMutexGuard<()>,
    _slot: Slot,
}

/// A holder's or waiter's claim on a table entry.
struct Slot {
    table: Arc<Mutex<LockTable>>,
    key: StorageKey,
}

impl Drop for Slot {
    fn drop(&mut self) {
        let mut table = self
            .table
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // Only the table's own reference left: nobody holds or waits.
        if table
            .get(&self.key)
            .is_some_and(|mutex| Arc::strong_count(mutex) == 1)
        {
            table.remove(&self.key);
        }
    }
}
