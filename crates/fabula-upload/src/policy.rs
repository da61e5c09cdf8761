use std::time::Duration;

/// Linear backoff between client-side upload attempts.
///
/// Attempts restart the whole presign→fetch→put cycle, so delays grow
/// linearly (3 s, 6 s, 9 s …) rather than exponentially — assets are of
/// bounded, modest size and the presigned credentials are re-minted each
/// time anyway.
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(3),
        }
    }
}

impl RetryPolicy {
    /// `max_attempts` is clamped to at least one — a pipeline that never
    /// attempts cannot report a meaningful failure.
    #[must_use]
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Delay inserted after failed 0-based `attempt`: `base × (attempt + 1)`.
    ///
    /// No delay is inserted after the final attempt — exhaustion surfaces
    /// immediately.
    #[must_use]
    pub fn delay_after_attempt(&self, attempt: u32) -> Duration {
        self.base_delay * (attempt + 1)
    }
}
