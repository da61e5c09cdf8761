use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::ResourceKind;

/// Unix timestamp in milliseconds, strictly increasing across calls within
/// this process.
///
/// Each upload attempt must produce a fresh storage key even when attempts
/// run back-to-back (e.g. under test schedulers where no wall time passes
/// between them), so the wall clock is bumped past the last issued value when
/// it has not advanced on its own.
pub fn unique_unix_millis() -> u64 {
    static LAST: AtomicU64 = AtomicU64::new(0);

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX));

    let mut prev = LAST.load(Ordering::Relaxed);
    loop {
        let next = now.max(prev + 1);
        match LAST.compare_exchange_weak(prev, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(observed) => prev = observed,
        }
    }
}

/// Object-storage key for one upload attempt.
///
/// Layout: `storybook/{kind}s/{kind}_{sceneNumber}_{epochMillis}.{ext}`.
/// A key is minted per attempt and never reused — retries get a fresh key
/// along with their fresh presigned URL.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StorageKey {
    key: String,
}

impl StorageKey {
    /// Mint a key for the next upload attempt of `(kind, scene_number)`.
    #[must_use]
    pub fn generate(kind: ResourceKind, scene_number: u32) -> Self {
        Self::with_timestamp(kind, scene_number, unique_unix_millis())
    }

    /// Build a key with an explicit timestamp.
    #[must_use]
    pub fn with_timestamp(kind: ResourceKind, scene_number: u32, unix_millis: u64) -> Self {
        Self {
            key: format!(
                "storybook/{kind}s/{kind}_{scene_number}_{unix_millis}.{ext}",
                ext = kind.extension(),
            ),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.key
    }
}

impl std::fmt::Display for StorageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.key)
    }
}
