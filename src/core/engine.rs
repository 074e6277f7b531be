//! Clipboard engine
//!
//! One explicitly constructed instance per process. Construction loads the
//! persisted history and takes the clipboard's current change token as the
//! baseline, so whatever is on the clipboard at start-up is not re-ingested.
//! There is no teardown; the poll loop lives until the runtime shuts down.

use std::sync::Arc;
use tracing::info;

use crate::core::clipboard::history::ClipboardHistory;
use crate::core::clipboard::monitor::ClipboardMonitor;
use crate::core::clipboard::state::{ClipboardState, SharedState};
use crate::core::clipboard::store::HistoryStore;
use crate::shared::emit::HistoryObservers;
use crate::shared::errors::EngineResult;
use crate::shared::events::HistoryChange;
use crate::shared::settings::{effective_history_limit, EngineSettings};
use crate::shared::types::{ClipboardEntry, ContentKind, EntryId};
use crate::system::pasteboard::Pasteboard;

pub struct ClipboardEngine {
    history: ClipboardHistory,
    monitor: ClipboardMonitor,
}

impl ClipboardEngine {
    pub fn new(pasteboard: Box<dyn Pasteboard>, store: Arc<dyn HistoryStore>, settings: &EngineSettings) -> Self {
        let mut entries = store.load();
        // A limit lowered since the last run takes effect immediately
        entries.truncate(effective_history_limit(settings.max_history_items));

        let last_seen_token = pasteboard.change_token();
        info!(entries = entries.len(), "Loaded clipboard history");

        let state = ClipboardState::new(SharedState {
            entries,
            last_seen_token,
            max_history_items: settings.max_history_items,
            pasteboard,
            store,
            observers: HistoryObservers::new(),
        });

        Self {
            history: ClipboardHistory::new(state.clone()),
            monitor: ClipboardMonitor::new(state),
        }
    }

    /// Begin polling. Safe to call more than once; later calls do nothing.
    pub fn start_monitoring(&self) -> EngineResult<bool> {
        self.monitor.start()
    }

    /// Current history, most recent first
    pub fn history(&self) -> Vec<ClipboardEntry> {
        self.history.snapshot()
    }

    pub fn entry(&self, id: EntryId) -> Option<ClipboardEntry> {
        self.history.entry(id)
    }

    pub fn entries_of_kind(&self, kind: ContentKind) -> Vec<ClipboardEntry> {
        self.history.entries_of_kind(kind)
    }

    pub fn subscribe<F>(&self, observer: F)
    where
        F: Fn(&HistoryChange, &[ClipboardEntry]) + Send + 'static,
    {
        self.history.subscribe(observer);
    }

    pub fn copy_to_clipboard(&self, entry: &ClipboardEntry) -> EngineResult<()> {
        self.history.copy_to_clipboard(entry)
    }

    pub fn delete_item(&self, entry: &ClipboardEntry) -> bool {
        self.history.delete_item(entry)
    }

    pub fn clear_history(&self) {
        self.history.clear_history();
    }

    pub fn set_max_history_items(&self, max_history_items: i64) {
        self.history.set_max_history_items(max_history_items);
    }

    pub fn history_manager(&self) -> &ClipboardHistory {
        &self.history
    }

    pub fn monitor(&self) -> &ClipboardMonitor {
        &self.monitor
    }
}
