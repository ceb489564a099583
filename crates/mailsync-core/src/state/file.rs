// # File Store
//
// File-based implementation of LocalStore with crash recovery.
//
// ## Purpose
//
// Provides persistent local records across daemon restarts and crashes.
// Each entity kind lives in its own file (`mail_chimp_list.json`,
// `mail_chimp_member.json`).
//
// ## Crash Recovery
//
// - Atomic writes: Uses write-then-rename for atomicity
// - Corruption detection: Validates JSON on load
// - Automatic backup: Keeps .backup of last known good state
// - Recovery: Falls back to backup if corruption detected
// - Failed writes: The in-memory view only changes once the write lands
//
// ## File Format
//
// ```json
// {
//   "version": "1.0",
//   "records": {
//     "3f1c…": {
//       "member_id": "3f1c…",
//       "mail_chimp_id": "62eeb292278cc15f5817cb78f7790b08",
//       "list_id": "9a0b…",
//       "email_address": "a@b.com",
//       "status": "subscribed"
//     }
//   }
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use super::memory::{assign_local_id, in_scope};
use crate::entity::SyncEntity;
use crate::error::{Error, Result};
use crate::traits::LocalStore;

/// Store file format version
/// Used for future migration if format changes
const STORE_FILE_VERSION: &str = "1.0";

/// File-based store with crash recovery
///
/// Every mutation is written through to disk before it returns.
///
/// # Example
///
/// ```rust,no_run
/// use mailsync_core::{FileStore, LocalStore, MailChimpMember};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileStore::<MailChimpMember>::in_dir("/var/lib/mailsync").await?;
///     let members = store.list(Some("list-id")).await?;
///     println!("{} member(s)", members.len());
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct FileStore<E: SyncEntity> {
    path: PathBuf,
    state: Arc<RwLock<FileState<E>>>,
}

/// Internal state for file-based store
///
/// `records` always mirrors what was last written successfully; `dirty`
/// is only set when the file on disk could not be restored at load time.
#[derive(Debug)]
struct FileState<E> {
    records: HashMap<String, E>,
    dirty: bool,
}

/// Serializable store file format
#[derive(Debug, Deserialize)]
#[serde(bound = "E: SyncEntity")]
struct StoreFileFormat<E> {
    version: String,
    records: HashMap<String, E>,
}

/// Borrowed view of [`StoreFileFormat`] for writing
#[derive(Serialize)]
#[serde(bound = "E: SyncEntity")]
struct StoreFileRef<'a, E> {
    version: &'a str,
    records: &'a HashMap<String, E>,
}

impl<E: SyncEntity> FileStore<E> {
    /// Open the store for `E` inside `dir` (`{dir}/{table}.json`)
    pub async fn in_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        Self::new(dir.as_ref().join(format!("{}.json", E::TABLE))).await
    }

    /// Create or load a file store
    ///
    /// This will:
    /// 1. Try to load existing store file
    /// 2. If corruption detected, try to load from backup
    /// 3. If both fail, start with empty state
    /// 4. Create parent directories if needed
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).await.map_err(|e| {
                Error::config(format!(
                    "Failed to create store directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let (records, dirty) = Self::load_with_recovery(&path).await?;

        Ok(Self {
            path,
            state: Arc::new(RwLock::new(FileState { records, dirty })),
        })
    }

    /// Load records with automatic recovery
    ///
    /// Recovery strategy:
    /// 1. Try to load main store file
    /// 2. If it fails to parse, try loading backup
    /// 3. If backup also fails, start with empty state
    ///
    /// The flag is true when the recovered records could not be copied back
    /// over the corrupt file.
    async fn load_with_recovery(path: &Path) -> Result<(HashMap<String, E>, bool)> {
        match Self::load(path).await {
            Ok(records) => {
                tracing::debug!(
                    "Loaded {} {} record(s) from {}",
                    records.len(),
                    E::KIND,
                    path.display()
                );
                Ok((records, false))
            }
            Err(Error::Json(e)) => {
                tracing::warn!(
                    "Store file {} appears corrupted: {}. Attempting recovery from backup.",
                    path.display(),
                    e
                );

                let backup_path = Self::backup_path(path);
                if !backup_path.exists() {
                    tracing::warn!("No backup file found. Starting with empty store.");
                    return Ok((HashMap::new(), false));
                }

                match Self::load(&backup_path).await {
                    Ok(records) => {
                        tracing::info!("Recovered {} record(s) from backup", records.len());
                        let restored = fs::copy(&backup_path, path).await;
                        if let Err(restore_err) = &restored {
                            tracing::error!(
                                "Failed to restore store file from backup: {}",
                                restore_err
                            );
                        }
                        Ok((records, restored.is_err()))
                    }
                    Err(backup_err) => {
                        tracing::error!(
                            "Backup also corrupted: {}. Starting with empty store.",
                            backup_err
                        );
                        Ok((HashMap::new(), false))
                    }
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Load records from file
    async fn load(path: &Path) -> Result<HashMap<String, E>> {
        if !path.exists() {
            tracing::debug!("Store file does not exist: {}", path.display());
            return Ok(HashMap::new());
        }

        let content = fs::read_to_string(path).await.map_err(|e| {
            Error::store(format!("Failed to read store file {}: {}", path.display(), e))
        })?;

        let file: StoreFileFormat<E> = serde_json::from_str(&content)?;

        if file.version != STORE_FILE_VERSION {
            tracing::warn!(
                "Store file version mismatch: expected {}, got {}. Attempting to load anyway.",
                STORE_FILE_VERSION,
                file.version
            );
        }

        Ok(file.records)
    }

    /// Write `records` to file atomically
    ///
    /// Callers hold the state write lock, so writes never interleave.
    async fn write(&self, records: &HashMap<String, E>) -> Result<()> {
        let file = StoreFileRef {
            version: STORE_FILE_VERSION,
            records,
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| Error::store(format!("Failed to serialize records: {e}")))?;

        let temp_path = self.temp_path();
        {
            let mut temp = fs::File::create(&temp_path).await.map_err(|e| {
                Error::store(format!(
                    "Failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
            temp.write_all(json.as_bytes()).await.map_err(|e| {
                Error::store(format!(
                    "Failed to write temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
            temp.flush().await.map_err(|e| {
                Error::store(format!(
                    "Failed to flush temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        if self.path.exists()
            && let Err(e) = fs::copy(&self.path, Self::backup_path(&self.path)).await
        {
            tracing::warn!("Failed to create backup: {}", e);
        }

        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::store(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        tracing::trace!("Store written to file: {}", self.path.display());
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        temp.set_extension("tmp");
        temp
    }

    fn backup_path(path: &Path) -> PathBuf {
        let mut backup = path.to_path_buf();
        backup.set_extension("backup");
        backup
    }
}

#[async_trait]
impl<E: SyncEntity> LocalStore<E> for FileStore<E> {
    async fn find(&self, scope: Option<&str>, id: &str) -> Result<Option<E>> {
        let state = self.state.read().await;
        Ok(state.records.get(id).filter(|e| in_scope(*e, scope)).cloned())
    }

    async fn save(&self, mut entity: E) -> Result<E> {
        let id = assign_local_id(&mut entity);
        let mut state = self.state.write().await;

        // Visible only once it is on disk
        let mut next = state.records.clone();
        next.insert(id, entity.clone());
        self.write(&next).await?;

        state.records = next;
        state.dirty = false;
        Ok(entity)
    }

    async fn delete(&self, entity: &E) -> Result<()> {
        let Some(id) = entity.local_id() else {
            return Ok(());
        };
        let mut state = self.state.write().await;
        if !state.records.contains_key(id) {
            return Ok(());
        }

        let mut next = state.records.clone();
        next.remove(id);
        self.write(&next).await?;

        state.records = next;
        state.dirty = false;
        Ok(())
    }

    async fn list(&self, scope: Option<&str>) -> Result<Vec<E>> {
        let state = self.state.read().await;
        Ok(state
            .records
            .values()
            .filter(|e| in_scope(*e, scope))
            .cloned()
            .collect())
    }

    async fn flush(&self) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.dirty {
            return Ok(());
        }
        self.write(&state.records).await?;
        state.dirty = false;
        Ok(())
    }
}
