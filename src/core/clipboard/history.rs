use tracing::{debug, info, warn};

use super::state::{ClipboardState, SharedState};
use crate::shared::errors::EngineResult;
use crate::shared::events::HistoryChange;
use crate::shared::settings::effective_history_limit;
use crate::shared::types::{ClipboardEntry, ContentKind, EntryId};

/// Clipboard history manager.
///
/// Owns the ordered, most-recent-first entry list. Every mutation persists the
/// full resulting list and then notifies observers, inside the serialized state.
#[derive(Clone)]
pub struct ClipboardHistory {
    state: ClipboardState,
}

impl ClipboardHistory {
    pub fn new(state: ClipboardState) -> Self {
        Self { state }
    }

    /// Add copied text to the front of the history.
    ///
    /// No-op when `content` is empty or equal to the current head. Returns
    /// whether an entry was added.
    pub fn ingest(&self, content: &str, source_hint: Option<String>) -> bool {
        let mut state = self.state.lock();
        ingest_locked(&mut state, content, source_hint)
    }

    /// Put an entry's content back on the system clipboard.
    ///
    /// The change-token baseline is moved past our own write before the lock is
    /// released, so the monitor never re-ingests it. History is not modified.
    pub fn copy_to_clipboard(&self, entry: &ClipboardEntry) -> EngineResult<()> {
        let mut state = self.state.lock();

        state.pasteboard.write_text(entry.content())?;
        state.last_seen_token = state.pasteboard.change_token();

        debug!(id = %entry.id(), token = state.last_seen_token.0, "Copied entry back to clipboard");
        Ok(())
    }

    /// Remove an entry by id. Returns whether it was present.
    pub fn delete_item(&self, entry: &ClipboardEntry) -> bool {
        self.delete_by_id(entry.id())
    }

    pub fn delete_by_id(&self, id: EntryId) -> bool {
        let mut state = self.state.lock();

        let Some(index) = state.entries.iter().position(|e| e.id() == id) else {
            debug!(%id, "Delete of absent entry ignored");
            return false;
        };

        state.entries.remove(index);
        persist(&state);
        state.observers.emit(&HistoryChange::Deleted(id), &state.entries);

        info!(%id, remaining = state.entries.len(), "Deleted history entry");
        true
    }

    /// Empty the history and remove the persisted slot
    pub fn clear_history(&self) {
        let mut state = self.state.lock();

        state.entries.clear();
        if let Err(e) = state.store.clear() {
            warn!(error = %e, "Failed to clear persisted history");
        }
        state.observers.emit(&HistoryChange::Cleared, &state.entries);

        info!("Cleared clipboard history");
    }

    /// Change the configured size limit. Applied on the next ingest.
    pub fn set_max_history_items(&self, max_history_items: i64) {
        let mut state = self.state.lock();
        state.max_history_items = max_history_items;
        debug!(limit = effective_history_limit(max_history_items), "History limit updated");
    }

    pub fn max_history_items(&self) -> usize {
        effective_history_limit(self.state.lock().max_history_items)
    }

    /// Copy of the current history, most recent first
    pub fn snapshot(&self) -> Vec<ClipboardEntry> {
        self.state.lock().entries.clone()
    }

    pub fn entry(&self, id: EntryId) -> Option<ClipboardEntry> {
        self.state.lock().entries.iter().find(|e| e.id() == id).cloned()
    }

    pub fn entries_of_kind(&self, kind: ContentKind) -> Vec<ClipboardEntry> {
        self.state
            .lock()
            .entries
            .iter()
            .filter(|e| e.kind() == kind)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Register an observer. It immediately receives a `Snapshot` of the
    /// current history, then every later change in mutation order.
    pub fn subscribe<F>(&self, observer: F)
    where
        F: Fn(&HistoryChange, &[ClipboardEntry]) + Send + 'static,
    {
        let mut state = self.state.lock();
        observer(&HistoryChange::Snapshot, &state.entries);
        state.observers.register(observer);
    }
}

/// Ingest inside an already-held serialized context. Shared with the monitor,
/// which must check the change token and ingest under the same lock.
pub(crate) fn ingest_locked(state: &mut SharedState, content: &str, source_hint: Option<String>) -> bool {
    if content.is_empty() {
        return false;
    }

    if state.entries.first().is_some_and(|head| head.content() == content) {
        debug!("Skipping duplicate of current head");
        return false;
    }

    let entry = ClipboardEntry::new(content.to_string(), source_hint);
    state.entries.insert(0, entry.clone());

    let limit = effective_history_limit(state.max_history_items);
    if state.entries.len() > limit {
        state.entries.truncate(limit);
    }

    persist(state);
    state.observers.emit(&HistoryChange::Ingested(entry.clone()), &state.entries);

    info!(
        id = %entry.id(),
        kind = ?entry.kind(),
        length = entry.length(),
        source = entry.source_hint().unwrap_or("unknown"),
        "Added clipboard entry"
    );
    true
}

/// Save the full list. Failures are logged and not retried.
fn persist(state: &SharedState) {
    if let Err(e) = state.store.save(&state.entries) {
        warn!(error = %e, "Failed to persist clipboard history");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clipboard::store::{HistoryStore, InMemoryStore};
    use crate::shared::emit::HistoryObservers;
    use crate::system::pasteboard::{ChangeToken, MemoryPasteboard};
    use std::sync::{Arc, Mutex};

    fn history_with(store: Arc<InMemoryStore>, pasteboard: MemoryPasteboard, limit: i64) -> ClipboardHistory {
        let state = ClipboardState::new(SharedState {
            entries: Vec::new(),
            last_seen_token: ChangeToken::default(),
            max_history_items: limit,
            pasteboard: Box::new(pasteboard),
            store,
            observers: HistoryObservers::new(),
        });
        ClipboardHistory::new(state)
    }

    fn new_history(limit: i64) -> (ClipboardHistory, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        let history = history_with(Arc::clone(&store), MemoryPasteboard::new(), limit);
        (history, store)
    }

    fn contents(history: &ClipboardHistory) -> Vec<String> {
        history.snapshot().iter().map(|e| e.content().to_string()).collect()
    }

    #[test]
    fn test_most_recent_first() {
        let (history, _) = new_history(50);

        history.ingest("a", None);
        history.ingest("b", None);

        assert_eq!(contents(&history), vec!["b", "a"]);
    }

    #[test]
    fn test_skip_duplicate_of_head() {
        let (history, _) = new_history(50);

        assert!(history.ingest("Same content", None));
        assert!(!history.ingest("Same content", None));

        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_older_duplicates_are_allowed() {
        let (history, _) = new_history(50);

        history.ingest("a", None);
        history.ingest("b", None);
        history.ingest("a", None);

        assert_eq!(contents(&history), vec!["a", "b", "a"]);
    }

    #[test]
    fn test_empty_content_is_ignored() {
        let (history, store) = new_history(50);

        assert!(!history.ingest("", None));

        assert!(history.is_empty());
        assert!(store.raw().is_none());
    }

    #[test]
    fn test_limit_drops_oldest() {
        let (history, _) = new_history(5);

        for i in 0..10 {
            history.ingest(&format!("Item {}", i), None);
        }

        assert_eq!(contents(&history), vec!["Item 9", "Item 8", "Item 7", "Item 6", "Item 5"]);
    }

    #[test]
    fn test_non_positive_limit_uses_default() {
        let (history, _) = new_history(0);

        for i in 0..55 {
            history.ingest(&format!("Item {}", i), None);
        }

        assert_eq!(history.len(), 50);
        assert_eq!(history.max_history_items(), 50);
    }

    #[test]
    fn test_lowered_limit_applies_on_next_ingest() {
        let (history, _) = new_history(10);
        for i in 0..10 {
            history.ingest(&format!("Item {}", i), None);
        }

        history.set_max_history_items(3);
        assert_eq!(history.len(), 10);

        history.ingest("Item 10", None);
        assert_eq!(contents(&history), vec!["Item 10", "Item 9", "Item 8"]);
    }

    #[test]
    fn test_every_ingest_persists_full_list() {
        let (history, store) = new_history(50);

        history.ingest("a", None);
        history.ingest("b", None);

        let persisted: Vec<String> = store.load().iter().map(|e| e.content().to_string()).collect();
        assert_eq!(persisted, vec!["b", "a"]);
    }

    #[test]
    fn test_delete_by_entry() {
        let (history, store) = new_history(50);
        history.ingest("a", None);
        history.ingest("b", None);

        let target = history.snapshot()[1].clone();
        assert!(history.delete_item(&target));

        assert_eq!(contents(&history), vec!["b"]);
        assert_eq!(store.load().len(), 1);
    }

    #[test]
    fn test_delete_absent_is_noop() {
        let (history, _) = new_history(50);
        history.ingest("a", None);

        let stranger = ClipboardEntry::new("a".to_string(), None);
        assert!(!history.delete_item(&stranger));

        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_clear_empties_history_and_store() {
        let (history, store) = new_history(50);
        history.ingest("Item 1", None);
        history.ingest("Item 2", None);

        history.clear_history();

        assert!(history.is_empty());
        assert!(store.raw().is_none());
    }

    #[test]
    fn test_copy_to_clipboard_writes_and_moves_baseline() {
        let pasteboard = MemoryPasteboard::new();
        let history = history_with(Arc::new(InMemoryStore::new()), pasteboard.clone(), 50);
        history.ingest("copy me", None);
        let entry = history.snapshot()[0].clone();

        history.copy_to_clipboard(&entry).expect("copy");

        assert_eq!(pasteboard.text().as_deref(), Some("copy me"));
        assert_eq!(history.state.lock().last_seen_token, pasteboard_token(&pasteboard));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_failed_copy_keeps_baseline() {
        let pasteboard = MemoryPasteboard::new();
        let history = history_with(Arc::new(InMemoryStore::new()), pasteboard.clone(), 50);
        history.ingest("copy me", None);
        let entry = history.snapshot()[0].clone();
        pasteboard.set_fail_writes(true);

        assert!(history.copy_to_clipboard(&entry).is_err());
        assert_eq!(history.state.lock().last_seen_token, ChangeToken::default());
    }

    #[test]
    fn test_entries_of_kind_and_lookup() {
        let (history, _) = new_history(50);
        history.ingest("https://example.com", None);
        history.ingest("fn main() { }", None);
        history.ingest("hello there", None);

        let urls = history.entries_of_kind(ContentKind::Url);
        assert_eq!(urls.len(), 1);
        assert_eq!(history.entry(urls[0].id()).map(|e| e.content().to_string()), Some("https://example.com".to_string()));
        assert_eq!(history.entries_of_kind(ContentKind::Code).len(), 1);
        assert!(history.entries_of_kind(ContentKind::Image).is_empty());
    }

    #[test]
    fn test_observers_get_snapshot_then_changes_in_order() {
        let (history, _) = new_history(50);
        history.ingest("before", None);

        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        history.subscribe(move |change, entries| {
            let label = match change {
                HistoryChange::Snapshot => "snapshot",
                HistoryChange::Ingested(_) => "ingested",
                HistoryChange::Deleted(_) => "deleted",
                HistoryChange::Cleared => "cleared",
            };
            sink.lock().unwrap().push((label, entries.len()));
        });

        history.ingest("after", None);
        history.ingest("after", None);
        let head = history.snapshot()[0].clone();
        history.delete_item(&head);
        history.clear_history();

        let log = log.lock().unwrap();
        assert_eq!(
            *log,
            vec![("snapshot", 1), ("ingested", 2), ("deleted", 1), ("cleared", 0)]
        );
    }

    fn pasteboard_token(pasteboard: &MemoryPasteboard) -> ChangeToken {
        use crate::system::pasteboard::Pasteboard;
        pasteboard.change_token()
    }
}
