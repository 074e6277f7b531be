//! Clipboard history engine
//!
//! Watches the system clipboard, keeps a bounded most-recent-first history of
//! copied text, classifies each entry as text, url or code, persists the
//! history across restarts and can copy any entry back without re-recording it.

pub mod core;
pub mod shared;
pub mod system;

pub use crate::core::clipboard::{ClipboardHistory, ClipboardMonitor, HistoryStore, InMemoryStore, RedbStore};
pub use crate::core::engine::ClipboardEngine;
pub use crate::core::features::highlighter::{highlight, HighlightedCode, Palette, TokenColor};
pub use crate::shared::events::HistoryChange;
pub use crate::shared::settings::EngineSettings;
pub use crate::shared::types::{ClipboardEntry, ContentKind, EntryId};
pub use crate::shared::{EngineError, EngineResult};
pub use crate::system::pasteboard::{MemoryPasteboard, Pasteboard};

use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

/// Run the engine headless until Ctrl-C.
pub async fn run() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cliptrail=info")))
        .init();

    let settings = EngineSettings::load().await.unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load settings, using defaults");
        EngineSettings::default()
    });

    let pasteboard = match crate::system::pasteboard::platform_pasteboard() {
        Ok(pasteboard) => pasteboard,
        Err(e) => {
            error!(error = %e, "Failed to access the system clipboard");
            return;
        }
    };

    let store = crate::core::clipboard::store::open_default_store();
    let engine = ClipboardEngine::new(pasteboard, store, &settings);

    // Content never reaches the log, only kinds and sizes
    engine.subscribe(|change, history| match change {
        HistoryChange::Snapshot => debug!(entries = history.len(), "History snapshot"),
        HistoryChange::Ingested(entry) => debug!(
            kind = entry.kind().label(),
            length = entry.length(),
            entries = history.len(),
            "History grew"
        ),
        HistoryChange::Deleted(_) | HistoryChange::Cleared => debug!(entries = history.len(), "History shrank"),
    });

    if let Err(e) = engine.start_monitoring() {
        error!(error = %e, "Failed to start clipboard monitoring");
        return;
    }

    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutting down"),
        Err(e) => error!(error = %e, "Failed to listen for Ctrl-C"),
    }
}
