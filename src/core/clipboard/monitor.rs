use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::history::ingest_locked;
use super::state::ClipboardState;
use crate::shared::errors::{EngineError, EngineResult};

/// Fixed clipboard poll cadence
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Log every Nth consecutive read failure to avoid spam
const READ_ERROR_LOG_EVERY: u32 = 10;

/// Result of one poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Change token matches the baseline
    Unchanged,
    /// Clipboard changed but holds no text
    Empty,
    /// Clipboard changed but the text equals the current head
    Duplicate,
    /// A new entry was added
    Ingested,
    /// Reading the clipboard failed; retried on the next change
    ReadFailed,
}

/// Clipboard monitor that polls the OS change token
#[derive(Clone)]
pub struct ClipboardMonitor {
    state: ClipboardState,
    started: Arc<AtomicBool>,
    consecutive_errors: Arc<AtomicU32>,
}

impl ClipboardMonitor {
    pub fn new(state: ClipboardState) -> Self {
        Self {
            state,
            started: Arc::new(AtomicBool::new(false)),
            consecutive_errors: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Start the periodic poll on the current tokio runtime.
    ///
    /// Idempotent: returns `Ok(true)` when this call started the loop and
    /// `Ok(false)` if it was already running.
    pub fn start(&self) -> EngineResult<bool> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Ok(false);
        }

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                self.started.store(false, Ordering::SeqCst);
                return Err(EngineError::Runtime(format!("Clipboard monitor needs a tokio runtime: {}", e)));
            }
        };

        let monitor = self.clone();
        runtime.spawn(async move {
            info!(interval_ms = POLL_INTERVAL.as_millis() as u64, "Started clipboard monitoring");

            let mut ticker = interval(POLL_INTERVAL);
            // A slow tick delays the next one instead of bursting to catch up
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                monitor.tick();
            }
        });

        Ok(true)
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// One poll: compare the change token, read and ingest on change.
    ///
    /// Runs entirely inside the serialized state, so a concurrent
    /// `copy_to_clipboard` either lands before this check (and its token is the
    /// baseline) or after it.
    pub fn tick(&self) -> TickOutcome {
        let mut state = self.state.lock();

        let token = state.pasteboard.change_token();
        if token == state.last_seen_token {
            return TickOutcome::Unchanged;
        }
        state.last_seen_token = token;

        let text = match state.pasteboard.read_text() {
            Ok(Some(text)) if !text.is_empty() => text,
            Ok(_) => {
                debug!("Clipboard changed but holds no text");
                self.consecutive_errors.store(0, Ordering::Relaxed);
                return TickOutcome::Empty;
            }
            Err(e) => {
                let errors = self.consecutive_errors.fetch_add(1, Ordering::Relaxed) + 1;
                if errors == 1 || errors % READ_ERROR_LOG_EVERY == 0 {
                    warn!(error = %e, consecutive = errors, "Failed to read clipboard");
                }
                return TickOutcome::ReadFailed;
            }
        };
        self.consecutive_errors.store(0, Ordering::Relaxed);

        let source_hint = state.pasteboard.foreground_app();
        if ingest_locked(&mut state, &text, source_hint) {
            TickOutcome::Ingested
        } else {
            TickOutcome::Duplicate
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clipboard::history::ClipboardHistory;
    use crate::core::clipboard::state::SharedState;
    use crate::core::clipboard::store::InMemoryStore;
    use crate::shared::emit::HistoryObservers;
    use crate::system::pasteboard::{MemoryPasteboard, Pasteboard};

    fn setup() -> (ClipboardMonitor, ClipboardHistory, MemoryPasteboard) {
        let pasteboard = MemoryPasteboard::new();
        let state = ClipboardState::new(SharedState {
            entries: Vec::new(),
            last_seen_token: pasteboard.change_token(),
            max_history_items: 50,
            pasteboard: Box::new(pasteboard.clone()),
            store: Arc::new(InMemoryStore::new()),
            observers: HistoryObservers::new(),
        });
        (
            ClipboardMonitor::new(state.clone()),
            ClipboardHistory::new(state),
            pasteboard,
        )
    }

    #[test]
    fn test_unchanged_token_is_noop() {
        let (monitor, history, _) = setup();

        assert_eq!(monitor.tick(), TickOutcome::Unchanged);
        assert!(history.is_empty());
    }

    #[test]
    fn test_external_copy_is_ingested_with_source() {
        let (monitor, history, pasteboard) = setup();

        pasteboard.external_copy("hello", Some("com.apple.TextEdit"));

        assert_eq!(monitor.tick(), TickOutcome::Ingested);
        assert_eq!(monitor.tick(), TickOutcome::Unchanged);

        let entries = history.snapshot();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].content(), "hello");
        assert_eq!(entries[0].source_hint(), Some("com.apple.TextEdit"));
    }

    #[test]
    fn test_empty_clipboard_is_skipped() {
        let (monitor, history, pasteboard) = setup();

        pasteboard.external_clear();
        assert_eq!(monitor.tick(), TickOutcome::Empty);

        pasteboard.external_copy("", None);
        assert_eq!(monitor.tick(), TickOutcome::Empty);

        assert!(history.is_empty());
    }

    #[test]
    fn test_same_text_copied_again_is_duplicate() {
        let (monitor, history, pasteboard) = setup();

        pasteboard.external_copy("again", None);
        monitor.tick();
        pasteboard.external_copy("again", None);

        assert_eq!(monitor.tick(), TickOutcome::Duplicate);
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_copy_back_is_not_reingested() {
        let (monitor, history, pasteboard) = setup();

        pasteboard.external_copy("first", None);
        monitor.tick();
        pasteboard.external_copy("second", None);
        monitor.tick();

        let older = history.snapshot()[1].clone();
        history.copy_to_clipboard(&older).expect("copy back");

        assert_eq!(monitor.tick(), TickOutcome::Unchanged);
        let contents: Vec<String> = history.snapshot().iter().map(|e| e.content().to_string()).collect();
        assert_eq!(contents, vec!["second", "first"]);
    }

    #[test]
    fn test_external_recopy_after_copy_back_is_ingested() {
        let (monitor, history, pasteboard) = setup();

        pasteboard.external_copy("B", None);
        monitor.tick();
        pasteboard.external_copy("A", None);
        monitor.tick();

        let older = history.snapshot()[1].clone();
        history.copy_to_clipboard(&older).expect("copy back");
        assert_eq!(monitor.tick(), TickOutcome::Unchanged);

        pasteboard.external_copy("B", Some("com.example.notes"));

        assert_eq!(monitor.tick(), TickOutcome::Ingested);
        let contents: Vec<String> = history.snapshot().iter().map(|e| e.content().to_string()).collect();
        assert_eq!(contents, vec!["B", "A", "B"]);
    }

    #[test]
    fn test_start_without_runtime_fails_and_can_retry() {
        let (monitor, _, _) = setup();

        assert!(matches!(monitor.start(), Err(EngineError::Runtime(_))));
        assert!(!monitor.is_started());
    }

    #[tokio::test]
    async fn test_start_is_idempotent() {
        let (monitor, _, _) = setup();

        assert!(monitor.start().expect("first start"));
        assert!(!monitor.start().expect("second start"));
        assert!(monitor.is_started());
    }

    #[tokio::test]
    async fn test_poll_loop_picks_up_external_copy() {
        let (monitor, history, pasteboard) = setup();
        monitor.start().expect("start");

        pasteboard.external_copy("from the loop", None);
        tokio::time::sleep(POLL_INTERVAL * 3).await;

        assert_eq!(history.snapshot().first().map(|e| e.content().to_string()), Some("from the loop".to_string()));
    }
}
