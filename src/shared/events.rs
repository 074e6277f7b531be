use crate::shared::types::{ClipboardEntry, EntryId};

/// What happened to the history. Delivered to observers together with the full
/// resulting sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryChange {
    /// Current state, sent once when an observer subscribes
    Snapshot,
    /// A new entry was prepended (older entries may have been truncated)
    Ingested(ClipboardEntry),
    /// The entry with this id was removed
    Deleted(EntryId),
    /// History was emptied
    Cleared,
}
