use directories::ProjectDirs;
use redb::{Database, DatabaseError, ReadableTable, StorageError, TableDefinition, TableError};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::warn;

use crate::shared::errors::{EngineError, EngineResult};
use crate::shared::types::ClipboardEntry;

/// Name of the single slot holding the serialized history
pub const HISTORY_SLOT: &str = "savedClipboardHistory";

/// Redb table of named slots. Key: slot name, Value: JSON-encoded entry list
const SLOTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("clipboard_slots");

/// Durable storage for the ordered history list.
///
/// `save` overwrites the whole slot. `load` never fails: a missing, unreadable,
/// or undecodable slot is an empty history.
pub trait HistoryStore: Send + Sync {
    fn save(&self, entries: &[ClipboardEntry]) -> EngineResult<()>;
    fn load(&self) -> Vec<ClipboardEntry>;
    fn clear(&self) -> EngineResult<()>;
}

fn encode(entries: &[ClipboardEntry]) -> EngineResult<Vec<u8>> {
    Ok(serde_json::to_vec(entries)?)
}

fn decode(bytes: &[u8]) -> EngineResult<Vec<ClipboardEntry>> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Decode an optional slot, treating every failure as empty history
fn decode_or_empty(slot: EngineResult<Option<Vec<u8>>>) -> Vec<ClipboardEntry> {
    match slot.and_then(|bytes| bytes.as_deref().map(decode).transpose()) {
        Ok(Some(entries)) => entries,
        Ok(None) => Vec::new(),
        Err(e) => {
            warn!(error = %e, "Persisted history unreadable, starting empty");
            Vec::new()
        }
    }
}

/// Redb-backed store: one database file, one table, one slot
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    /// Open (or create) the database in the platform data directory
    pub fn open_default() -> EngineResult<Self> {
        let proj_dirs = ProjectDirs::from("com", "cliptrail", "cliptrail")
            .ok_or_else(|| EngineError::Config("Failed to get project directories".to_string()))?;

        let data_dir = proj_dirs.data_dir();
        std::fs::create_dir_all(data_dir)
            .map_err(|e| EngineError::Io(format!("Failed to create data directory: {}", e)))?;

        Self::open(&data_dir.join("history.redb"))
    }

    /// Open or create the database at `path`.
    ///
    /// A file that is not a readable redb database of the current format is
    /// moved aside to `<path>.corrupt` and replaced with an empty one. A file
    /// held open by another process is an error and is left in place.
    pub fn open(path: &Path) -> EngineResult<Self> {
        let db = match Database::create(path) {
            Ok(db) => db,
            Err(e) if is_unreadable(&e) => {
                let aside = corrupt_path(path);
                warn!(error = %e, moved_to = %aside.display(), "History database unreadable, starting a fresh one");

                std::fs::rename(path, &aside)
                    .map_err(|e| EngineError::Io(format!("Failed to move unreadable database aside: {}", e)))?;

                Database::create(path)
                    .map_err(|e| EngineError::Storage(format!("Failed to recreate database: {}", e)))?
            }
            Err(e) => return Err(EngineError::Storage(format!("Failed to open database: {}", e))),
        };

        Ok(Self { db: Arc::new(db) })
    }

    fn read_slot(&self) -> EngineResult<Option<Vec<u8>>> {
        let read_txn = self.db.begin_read()
            .map_err(|e| EngineError::Storage(format!("Failed to begin read: {}", e)))?;

        let table = match read_txn.open_table(SLOTS_TABLE) {
            Ok(table) => table,
            // Nothing was ever saved
            Err(TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(EngineError::Storage(format!("Failed to open table: {}", e))),
        };

        let value = table.get(HISTORY_SLOT)
            .map_err(|e| EngineError::Storage(format!("Failed to read slot: {}", e)))?;

        Ok(value.map(|guard| guard.value().to_vec()))
    }
}

/// Corrupt, truncated or written by an incompatible redb version
fn is_unreadable(err: &DatabaseError) -> bool {
    match err {
        DatabaseError::UpgradeRequired(_) => true,
        DatabaseError::Storage(StorageError::Corrupted(_)) => true,
        DatabaseError::Storage(StorageError::Io(io)) => {
            matches!(io.kind(), ErrorKind::InvalidData | ErrorKind::UnexpectedEof)
        }
        _ => false,
    }
}

fn corrupt_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".corrupt");
    PathBuf::from(name)
}

impl HistoryStore for RedbStore {
    fn save(&self, entries: &[ClipboardEntry]) -> EngineResult<()> {
        let bytes = encode(entries)?;

        let write_txn = self.db.begin_write()
            .map_err(|e| EngineError::Storage(format!("Failed to begin write: {}", e)))?;
        {
            let mut table = write_txn.open_table(SLOTS_TABLE)
                .map_err(|e| EngineError::Storage(format!("Failed to open table: {}", e)))?;

            table.insert(HISTORY_SLOT, bytes.as_slice())
                .map_err(|e| EngineError::Storage(format!("Failed to write slot: {}", e)))?;
        }
        write_txn.commit()
            .map_err(|e| EngineError::Storage(format!("Failed to commit: {}", e)))?;

        Ok(())
    }

    fn load(&self) -> Vec<ClipboardEntry> {
        decode_or_empty(self.read_slot())
    }

    fn clear(&self) -> EngineResult<()> {
        let write_txn = self.db.begin_write()
            .map_err(|e| EngineError::Storage(format!("Failed to begin write: {}", e)))?;
        {
            let mut table = write_txn.open_table(SLOTS_TABLE)
                .map_err(|e| EngineError::Storage(format!("Failed to open table: {}", e)))?;

            table.remove(HISTORY_SLOT)
                .map_err(|e| EngineError::Storage(format!("Failed to remove slot: {}", e)))?;
        }
        write_txn.commit()
            .map_err(|e| EngineError::Storage(format!("Failed to commit: {}", e)))?;

        Ok(())
    }
}

/// In-memory store holding the encoded slot. Used when the database cannot be
/// opened, and in tests.
#[derive(Default)]
pub struct InMemoryStore {
    slot: Mutex<Option<Vec<u8>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with raw slot bytes, valid or not
    pub fn with_raw(bytes: Vec<u8>) -> Self {
        Self {
            slot: Mutex::new(Some(bytes)),
        }
    }

    /// Current raw slot bytes, `None` once cleared or before the first save
    pub fn raw(&self) -> Option<Vec<u8>> {
        self.lock_slot().clone()
    }

    fn lock_slot(&self) -> std::sync::MutexGuard<'_, Option<Vec<u8>>> {
        match self.slot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("InMemoryStore mutex poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }
}

impl HistoryStore for InMemoryStore {
    fn save(&self, entries: &[ClipboardEntry]) -> EngineResult<()> {
        let bytes = encode(entries)?;
        *self.lock_slot() = Some(bytes);
        Ok(())
    }

    fn load(&self) -> Vec<ClipboardEntry> {
        decode_or_empty(Ok(self.lock_slot().clone()))
    }

    fn clear(&self) -> EngineResult<()> {
        *self.lock_slot() = None;
        Ok(())
    }
}

/// Open the default redb store, falling back to memory if it cannot be opened
pub fn open_default_store() -> Arc<dyn HistoryStore> {
    match RedbStore::open_default() {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!(error = %e, "Failed to open history database, using in-memory fallback");
            Arc::new(InMemoryStore::new())
        }
    }
}
