use std::collections::HashMap;
use std::sync::Arc;

use fabula_core::ResourceId;
use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// At-most-one in-flight upload per resource key.
///
/// The backend's resource record is last-write-wins, so two concurrent
/// uploads of the same `(book, scene, kind)` would race each other's
/// notifications. Duplicate callers serialize on the key instead: the second
/// waits until the first releases its guard, then runs normally.
#[derive(Clone, Debug, Default)]
pub struct InflightMap {
    entries: Arc<Mutex<HashMap<ResourceId, Arc<AsyncMutex<()>>>>>,
}

/// Held for the duration of one escalation-controller invocation.
#[derive(Debug)]
pub struct InflightGuard {
    _permit: OwnedMutexGuard<()>,
}

impl InflightMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the guard for `id`, waiting while another upload holds it.
    pub async fn acquire(&self, id: &ResourceId) -> InflightGuard {
        let entry = {
            let mut entries = self.entries.lock();
            // Drop keys nobody holds or waits on; waiters keep their entry
            // alive through their own Arc clone.
            entries.retain(|_, m| Arc::strong_count(m) > 1 || m.try_lock().is_err());
            Arc::clone(entries.entry(id.clone()).or_default())
        };

        InflightGuard {
            _permit: entry.lock_owned().await,
        }
    }

    #[cfg(test)]
    fn tracked_keys(&self) -> usize {
        self.entries.lock().len()
    }
}
