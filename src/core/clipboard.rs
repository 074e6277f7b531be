//! Clipboard history core
//!
//! - `monitor`: polls the change token and feeds new text into the history
//! - `history`: ordered, deduplicated, size-limited entries plus mutations
//! - `classifier`: text / url / code detection at ingest time
//! - `store`: durable single-slot persistence of the whole history

pub mod classifier;
pub mod history;
pub mod monitor;
pub mod state;
pub mod store;

pub use classifier::classify;
pub use history::ClipboardHistory;
pub use monitor::{ClipboardMonitor, TickOutcome, POLL_INTERVAL};
pub use store::{open_default_store, HistoryStore, InMemoryStore, RedbStore};
