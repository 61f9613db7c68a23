//! Trailing-edge debounced text filter
//!
//! Raw input only becomes the active filter after a quiet period with no
//! further input. Each new input aborts the pending settle timer, so a burst
//! of keystrokes settles once, to its last value.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Debug, Default)]
struct FilterState {
    /// Last raw input
    raw: String,

    /// Lowercased text the predicate currently uses
    settled: String,

    /// Number of settles so far
    settles: u64,
}

impl FilterState {
    fn settle(&mut self, text: &str) {
        self.settled = text.to_lowercase();
        self.settles += 1;
    }
}

/// Case-insensitive substring filter fed by a debounced text stream
pub struct DebouncedFilter {
    quiet: Duration,
    state: Arc<Mutex<FilterState>>,
    pending: Mutex<Option<JoinHandle<()>>>,
    settled_tx: Arc<watch::Sender<u64>>,
}

impl DebouncedFilter {
    pub fn new(quiet: Duration) -> Self {
        let (settled_tx, _) = watch::channel(0);
        Self {
            quiet,
            state: Arc::new(Mutex::new(FilterState::default())),
            pending: Mutex::new(None),
            settled_tx: Arc::new(settled_tx),
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet
    }

    /// Record raw input and re-arm the settle timer
    ///
    /// Must be called from within a Tokio runtime.
    pub fn on_input(&self, text: impl Into<String>) {
        let text = text.into();
        self.state.lock().raw = text.clone();

        let state = Arc::clone(&self.state);
        let settled_tx = Arc::clone(&self.settled_tx);
        let quiet = self.quiet;

        let timer = tokio::spawn(async move {
            tokio::time::sleep(quiet).await;
            let count = {
                let mut state = state.lock();
                state.settle(&text);
                state.settles
            };
            debug!(query = %text, "search input settled");
            settled_tx.send_replace(count);
        });

        if let Some(previous) = self.pending.lock().replace(timer) {
            previous.abort();
        }
    }

    /// Settle the last raw input immediately, cancelling the timer
    pub fn flush(&self) {
        if let Some(pending) = self.pending.lock().take() {
            pending.abort();
        }

        let count = {
            let mut state = self.state.lock();
            if state.raw.to_lowercase() == state.settled {
                return;
            }
            let raw = state.raw.clone();
            state.settle(&raw);
            state.settles
        };
        self.settled_tx.send_replace(count);
    }

    /// Case-insensitive substring test against the settled text
    pub fn matches(&self, name: &str) -> bool {
        let state = self.state.lock();
        state.settled.is_empty() || name.to_lowercase().contains(&state.settled)
    }

    /// Keep the items whose name matches, preserving order
    pub fn apply<T: Clone>(&self, items: &[T], name_of: impl Fn(&T) -> &str) -> Vec<T> {
        let state = self.state.lock();
        if state.settled.is_empty() {
            return items.to_vec();
        }
        items
            .iter()
            .filter(|item| name_of(item).to_lowercase().contains(&state.settled))
            .cloned()
            .collect()
    }

    pub fn settled_text(&self) -> String {
        self.state.lock().settled.clone()
    }

    pub fn raw_text(&self) -> String {
        self.state.lock().raw.clone()
    }

    pub fn settle_count(&self) -> u64 {
        self.state.lock().settles
    }

    /// Whether raw input is waiting for its quiet period
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }

    /// Receiver notified with the settle count after every settle
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.settled_tx.subscribe()
    }
}

impl Drop for DebouncedFilter {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.get_mut().take() {
            pending.abort();
        }
    }
}
