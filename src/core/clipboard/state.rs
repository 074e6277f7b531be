use std::sync::{Arc, Mutex, MutexGuard};
use tracing::warn;

use crate::core::clipboard::store::HistoryStore;
use crate::shared::emit::HistoryObservers;
use crate::shared::types::ClipboardEntry;
use crate::system::pasteboard::{ChangeToken, Pasteboard};

/// Everything mutated by ingest, delete, clear and copy-back.
///
/// Held behind one mutex so the dedup check, truncation, persistence, observer
/// notification and change-token bookkeeping all happen atomically with respect
/// to each other.
pub struct SharedState {
    /// Most recent first
    pub entries: Vec<ClipboardEntry>,
    pub last_seen_token: ChangeToken,
    /// Raw configured limit; see `effective_history_limit`
    pub max_history_items: i64,
    pub pasteboard: Box<dyn Pasteboard>,
    pub store: Arc<dyn HistoryStore>,
    pub observers: HistoryObservers,
}

/// Thread-safe handle to the single serialized execution context
#[derive(Clone)]
pub struct ClipboardState {
    inner: Arc<Mutex<SharedState>>,
}

impl ClipboardState {
    pub fn new(state: SharedState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    /// Enter the serialized context (with mutex recovery)
    pub fn lock(&self) -> MutexGuard<'_, SharedState> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Clipboard state mutex poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }
}
