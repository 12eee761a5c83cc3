//! Keyed in-process lock registry
//!
//! Serializes reconciliations that share a mutex key inside one process.
//! The registry is explicit state passed by reference into the reconciler
//! rather than a process global, which keeps it injectable and testable.
//! Locks are advisory and process-local: they cannot fence out another
//! process or an out-of-band caller of the remote API.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registry of named async locks, created on first use and never removed.
#[derive(Debug, Default)]
pub struct KeyedLocks {
    locks: parking_lot::Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for `key`, waiting until the current holder (if
    /// any) releases. Only callers sharing the exact same key contend.
    pub async fn lock(&self, key: &str) -> OwnedMutexGuard<()> {
        let mutex = {
            let mut locks = self.locks.lock();
            locks
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        mutex.lock_owned().await
    }
}
