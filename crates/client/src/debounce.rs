//! Trailing-edge debouncing for rapid input streams.
//!
//! Typing in the store search box produces a value per keystroke; only the
//! value that has gone quiet for the configured window should reach the
//! network. Each [`Debouncer::update`] cancels the previous pending timer,
//! so intermediate values are never published.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Debounces a stream of values, publishing each value only after it has
/// been the latest for `delay`.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    tx: watch::Sender<T>,
    pending: Option<JoinHandle<()>>,
}

impl<T: Clone + Send + Sync + 'static> Debouncer<T> {
    /// Create a debouncer whose settled stream starts at `initial`.
    #[must_use]
    pub fn new(delay: Duration, initial: T) -> Self {
        let (tx, _) = watch::channel(initial);
        Self {
            delay,
            tx,
            pending: None,
        }
    }

    /// Feed the latest value. Any not-yet-published previous value is
    /// dropped; this value is published after `delay` of quiet.
    pub fn update(&mut self, value: T) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
        let tx = self.tx.clone();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tx.send_replace(value);
        }));
    }

    /// The settled-value stream. `borrow` reads the last published value;
    /// `changed` wakes when a new value settles.
    #[must_use]
    pub fn settled(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_only_quiet_value_is_published() {
        let mut debouncer = Debouncer::new(Duration::from_millis(500), String::new());
        let mut settled = debouncer.settled();

        // A burst of keystrokes, each within the window.
        for text in ["c", "co", "cof", "coffee"] {
            debouncer.update(text.to_string());
            tokio::time::advance(Duration::from_millis(100)).await;
        }
        assert_eq!(*settled.borrow(), "");

        tokio::time::advance(Duration::from_millis(500)).await;
        settled.changed().await.expect("sender alive");
        assert_eq!(*settled.borrow_and_update(), "coffee");
    }

    #[tokio::test(start_paused = true)]
    async fn test_intermediate_values_never_settle() {
        let mut debouncer = Debouncer::new(Duration::from_millis(500), 0_u32);
        let mut settled = debouncer.settled();

        debouncer.update(1);
        tokio::time::advance(Duration::from_millis(499)).await;
        debouncer.update(2);
        tokio::time::advance(Duration::from_millis(501)).await;

        settled.changed().await.expect("sender alive");
        // 1 was cancelled one tick short of publishing.
        assert_eq!(*settled.borrow_and_update(), 2);
        assert!(!settled.has_changed().expect("sender alive"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_distinct_quiet_periods_publish_each_value() {
        let mut debouncer = Debouncer::new(Duration::from_millis(500), String::new());
        let mut settled = debouncer.settled();

        debouncer.update("bakery".to_string());
        tokio::time::advance(Duration::from_millis(600)).await;
        settled.changed().await.expect("sender alive");
        assert_eq!(*settled.borrow_and_update(), "bakery");

        debouncer.update("grocery".to_string());
        tokio::time::advance(Duration::from_millis(600)).await;
        settled.changed().await.expect("sender alive");
        assert_eq!(*settled.borrow_and_update(), "grocery");
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending_publish() {
        let mut debouncer = Debouncer::new(Duration::from_millis(500), 0_u32);
        let settled = debouncer.settled();

        debouncer.update(7);
        drop(debouncer);
        tokio::time::advance(Duration::from_secs(1)).await;
        tokio::task::yield_now().await;

        assert_eq!(*settled.borrow(), 0);
    }
}
