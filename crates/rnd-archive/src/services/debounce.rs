//! Debouncer - Coalesces bursts of input into a single action
//!
//! A single pending deadline is pushed back on every trigger; the owner
//! awaits [`Debouncer::wait`] on that deadline and acts once it passes.

use std::time::Duration;
use tokio::time::{sleep_until, Instant};

/// Delay between the last keystroke and the search it causes
pub const DEFAULT_SEARCH_DELAY: Duration = Duration::from_millis(300);

#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Restart the timer
    pub fn trigger(&mut self) {
        self.deadline = Some(Instant::now() + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Clear the deadline if it has passed; returns whether it fired
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Resolve at `deadline`; never resolves for `None`
    pub async fn wait(deadline: Option<Instant>) {
        match deadline {
            Some(deadline) => sleep_until(deadline).await,
            None => std::future::pending().await,
        }
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_trigger_pushes_deadline_back() {
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        debouncer.trigger();
        let first = debouncer.deadline().unwrap();

        tokio::time::advance(Duration::from_millis(200)).await;
        debouncer.trigger();
        let second = debouncer.deadline().unwrap();

        assert_eq!(second - first, Duration::from_millis(200));
        assert!(!debouncer.take_due(Instant::now()));

        tokio::time::advance(Duration::from_millis(300)).await;
        assert!(debouncer.take_due(Instant::now()));
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_resolves_at_deadline() {
        let mut debouncer = Debouncer::default();
        debouncer.trigger();
        let start = Instant::now();

        Debouncer::wait(debouncer.deadline()).await;

        assert_eq!(Instant::now() - start, DEFAULT_SEARCH_DELAY);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_clears_pending() {
        let mut debouncer = Debouncer::default();
        debouncer.trigger();
        debouncer.cancel();

        assert!(!debouncer.is_pending());
        let waited = tokio::time::timeout(Duration::from_secs(10), Debouncer::wait(None)).await;
        assert!(waited.is_err());
    }
}
