//! Quiet-period trigger for search-as-you-type.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Default quiet period before a typed search runs.
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Runs an action only after no newer trigger arrived for the quiet period.
///
/// Clones share the trigger sequence, so a trigger from any clone
/// supersedes pending triggers from all of them.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    generation: Arc<AtomicU64>,
}

impl Debouncer {
    /// Creates a debouncer with the given quiet period.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Returns the quiet period.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Waits for the quiet period, then runs `action` unless another
    /// trigger arrived meanwhile. Returns `None` for a superseded trigger.
    pub async fn run<F, Fut, T>(&self, action: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let mine = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.delay).await;

        if self.generation.load(Ordering::SeqCst) != mine {
            tracing::trace!(generation = mine, "debounced trigger superseded");
            return None;
        }
        Some(action().await)
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_DEBOUNCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_single_trigger_runs_after_delay() {
        let debouncer = Debouncer::default();
        let started = tokio::time::Instant::now();

        let result = debouncer.run(|| async { 42 }).await;

        assert_eq!(result, Some(42));
        assert!(started.elapsed() >= DEFAULT_SEARCH_DEBOUNCE);
    }

    #[tokio::test(start_paused = true)]
    async fn test_later_trigger_supersedes_earlier() {
        let debouncer = Debouncer::new(Duration::from_millis(300));

        let first = tokio::spawn({
            let debouncer = debouncer.clone();
            async move { debouncer.run(|| async { "Іва" }).await }
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        let second = tokio::spawn({
            let debouncer = debouncer.clone();
            async move { debouncer.run(|| async { "Іван" }).await }
        });

        assert_eq!(first.await.unwrap(), None);
        assert_eq!(second.await.unwrap(), Some("Іван"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_spaced_triggers_all_run() {
        let debouncer = Debouncer::new(Duration::from_millis(300));

        assert_eq!(debouncer.run(|| async { 1 }).await, Some(1));
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(debouncer.run(|| async { 2 }).await, Some(2));
    }
}
